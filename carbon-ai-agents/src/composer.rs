//! Composing full answers from retrieved context and the hosted LLM.

use crate::error::GenerationError;
use crate::llm::{ChatMessage, ChatProvider, ChatRequest};
use crate::llm::groq::DEFAULT_TEMPERATURE;
use carbon_ai_retriever::{RetrievalSystem, ScoredChunk, format_context};

/// System prompt for knowledge-base question answering.
const QA_SYSTEM_PROMPT: &str = "You are an expert in carbon accounting, emissions tracking, and environmental regulations. \
Use the provided context to answer the question. \
If you don't know the answer based on the context, just say that you don't know, don't try to make up an answer. \
Always cite the relevant regulations or standards when applicable.";

/// A generated answer together with the chunks it was grounded on.
#[derive(Debug)]
pub struct ComposedAnswer {
    pub answer: String,
    pub sources: Vec<ScoredChunk>,
}

/// Builds a context-grounded prompt for a question and runs it through the
/// hosted LLM.
///
/// One blocking round trip per call. Retrieval failures and LLM failures both
/// surface as [`GenerationError`]; neither is retried.
pub struct AnswerComposer<'a> {
    retrieval: &'a RetrievalSystem,
    llm: &'a dyn ChatProvider,
}

impl<'a> AnswerComposer<'a> {
    pub fn new(retrieval: &'a RetrievalSystem, llm: &'a dyn ChatProvider) -> Self {
        Self { retrieval, llm }
    }

    /// Answer a question using the configured default top-k chunks as
    /// context. Returns the generated text and the chunks used.
    pub async fn answer(&self, question: &str) -> Result<ComposedAnswer, GenerationError> {
        let sources = self.retrieval.search_default(question).await?;
        let context = format_context(&sources, self.retrieval.config().max_context_len);

        let request = ChatRequest::new(vec![
            ChatMessage::system(QA_SYSTEM_PROMPT),
            ChatMessage::user(build_qa_prompt(&context, question)),
        ])
        .with_temperature(DEFAULT_TEMPERATURE);

        tracing::info!(
            "Generating answer via {} using {} source chunks",
            self.llm.name(),
            sources.len()
        );
        let answer = self.llm.chat(request).await?;

        Ok(ComposedAnswer { answer, sources })
    }
}

/// Render the user-visible half of the QA prompt.
fn build_qa_prompt(context: &str, question: &str) -> String {
    format!("Context: {context}\n\nQuestion: {question}\n\nAnswer:")
}
