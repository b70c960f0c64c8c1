//! The retrieval system facade.
//!
//! [`RetrievalSystem`] bundles the persisted index, the embedding provider,
//! and the configuration into one explicitly constructed value. Callers build
//! it once and pass it where it is needed; there is no process-wide shared
//! instance and no hidden lifecycle. The embedding model itself is still
//! cached process-wide by the embed crate, so constructing the system twice
//! does not reload model weights.

use crate::config::RetrievalConfig;
use crate::error::{IndexBuildError, SearchError};
use crate::retrieval::index_builder::{build_index, load_or_build_index};
use crate::retrieval::knowledge_index::{IndexStats, KnowledgeIndex};
use crate::retrieval::search::{Retriever, ScoredChunk};
use carbon_ai_embed::EmbeddingProvider;
use std::sync::Arc;

/// Entry point for every retrieval operation.
pub struct RetrievalSystem {
    config: RetrievalConfig,
    retriever: Retriever,
}

impl RetrievalSystem {
    /// Open the persisted index if it exists, otherwise build it from the
    /// knowledge base.
    pub async fn open_or_build(
        config: RetrievalConfig,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, IndexBuildError> {
        let index = load_or_build_index(&config, provider.clone()).await?;
        Ok(Self {
            retriever: Retriever::new(index, provider),
            config,
        })
    }

    /// Rebuild the index from scratch, replacing any existing contents.
    pub async fn rebuild(
        config: RetrievalConfig,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, IndexBuildError> {
        let index = build_index(&config, provider.clone()).await?;
        Ok(Self {
            retriever: Retriever::new(index, provider),
            config,
        })
    }

    /// The configuration this system was constructed with.
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// The underlying index, for diagnostics.
    pub fn index(&self) -> &KnowledgeIndex {
        self.retriever.index()
    }

    /// Index statistics.
    pub async fn stats(&self) -> Result<IndexStats, SearchError> {
        Ok(self.index().stats().await?)
    }

    /// Top-`k` chunks most similar to `query`.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>, SearchError> {
        self.retriever.search(query, k).await
    }

    /// Top chunks for `query` using the configured default `top_k`.
    pub async fn search_default(&self, query: &str) -> Result<Vec<ScoredChunk>, SearchError> {
        self.search(query, self.config.top_k).await
    }

    /// Retrieve context for a seed query and format it as a single string
    /// for prompt injection.
    ///
    /// Chunks are numbered `[Source N]:` in similarity order and accumulated
    /// until the configured maximum context length would be exceeded. An
    /// empty string means nothing relevant was found.
    pub async fn context_for(&self, seed_query: &str) -> Result<String, SearchError> {
        let results = self.search_default(seed_query).await?;
        Ok(format_context(&results, self.config.max_context_len))
    }
}

/// Format scored chunks into a bounded context string.
///
/// Chunks are numbered `[Source N]:` in the given order; chunks that would
/// push the total past `max_len` are dropped.
pub fn format_context(results: &[ScoredChunk], max_len: usize) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut current_len = 0;

    for (i, result) in results.iter().enumerate() {
        let part = format!("[Source {}]: {}\n", i + 1, result.content);
        if current_len + part.len() > max_len {
            break;
        }
        current_len += part.len();
        parts.push(part);
    }

    parts.join("\n")
}
