//! Chat-completion client abstraction for the hosted LLM.

pub mod groq;

use crate::error::GenerationError;
use async_trait::async_trait;
use serde::Serialize;

pub use groq::GroqClient;

/// One message in a chat-completion conversation.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A chat-completion request.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Trait for hosted chat-completion providers.
///
/// One blocking round trip per call; no streaming, no retries.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// The provider name (e.g. "groq")
    fn name(&self) -> &str;

    /// Run a chat completion and return the generated text
    async fn chat(&self, request: ChatRequest) -> Result<String, GenerationError>;
}
