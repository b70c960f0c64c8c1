//! Groq chat-completion client.
//!
//! Groq exposes an OpenAI-compatible API, so the request body and response
//! shape follow the standard `/chat/completions` contract. The API key comes
//! from the `GROQ_API_KEY` environment variable, resolved at call time: a
//! missing key surfaces as [`GenerationError::MissingApiKey`] on the first
//! generation, not at startup.

use super::{ChatProvider, ChatRequest};
use crate::error::GenerationError;
use async_trait::async_trait;
use serde_json::{Value, json};

/// Default Groq API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// The hosted model used for answer generation.
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Sampling temperature for answer generation.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

#[derive(Clone)]
pub struct GroqClient {
    base_url: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl GroqClient {
    /// Create a client for the default endpoint and model. The endpoint can
    /// be overridden through the `GROQ_BASE_URL` environment variable.
    pub fn new() -> Self {
        let base_url =
            std::env::var("GROQ_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            client: reqwest::Client::new(),
        }
    }

    /// Override the model name (builder style)
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the API key instead of reading the environment (builder
    /// style). An empty key is treated as missing.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// The model this client generates with.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn resolve_api_key(&self) -> Result<String, GenerationError> {
        let key = match &self.api_key {
            Some(key) => key.clone(),
            None => std::env::var("GROQ_API_KEY").unwrap_or_default(),
        };
        if key.is_empty() {
            return Err(GenerationError::MissingApiKey);
        }
        Ok(key)
    }
}

impl Default for GroqClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatProvider for GroqClient {
    fn name(&self) -> &str {
        "groq"
    }

    async fn chat(&self, request: ChatRequest) -> Result<String, GenerationError> {
        let api_key = self.resolve_api_key()?;

        let url = format!("{}/chat/completions", self.base_url);
        let mut body = json!({
            "model": self.model,
            "messages": request.messages,
            "stream": false,
        });
        if let Some(obj) = body.as_object_mut() {
            if let Some(t) = request.temperature {
                obj.insert("temperature".to_string(), json!(t));
            }
            if let Some(t) = request.max_tokens {
                obj.insert("max_tokens".to_string(), json!(t));
            }
        }

        tracing::debug!("Sending chat completion to {} ({})", url, self.model);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api { status, message });
        }

        let payload: Value = response.json().await?;
        extract_content(&payload)
    }
}

/// Pull the generated text out of an OpenAI-style chat-completion response.
fn extract_content(payload: &Value) -> Result<String, GenerationError> {
    payload["choices"]
        .get(0)
        .and_then(|choice| choice["message"]["content"].as_str())
        .map(str::to_string)
        .ok_or_else(|| GenerationError::MalformedResponse {
            message: "no choices[0].message.content in response".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatMessage;

    #[tokio::test]
    async fn test_missing_api_key_is_a_generation_error() {
        // An explicitly empty key never falls back to the environment, so
        // the test cannot accidentally hit the network.
        let client = GroqClient::new().with_api_key("");
        let request = ChatRequest::new(vec![ChatMessage::user("What is Scope 1?")]);

        let err = client.chat(request).await.unwrap_err();
        assert!(matches!(err, GenerationError::MissingApiKey));
    }

    #[test]
    fn test_extract_content_from_completion() {
        let payload = serde_json::json!({
            "choices": [{
                "message": {"role": "assistant", "content": "Scope 1 covers direct emissions."},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 8}
        });

        let content = extract_content(&payload).unwrap();
        assert_eq!(content, "Scope 1 covers direct emissions.");
    }

    #[test]
    fn test_extract_content_rejects_empty_choices() {
        let payload = serde_json::json!({"choices": []});
        let err = extract_content(&payload).unwrap_err();
        assert!(matches!(err, GenerationError::MalformedResponse { .. }));
    }

    #[test]
    fn test_default_client_configuration() {
        let client = GroqClient::new().with_model("llama-3.1-8b-instant");
        assert_eq!(client.name(), "groq");
        assert_eq!(client.model(), "llama-3.1-8b-instant");
    }
}
