//! Error types for answer generation.

use carbon_ai_retriever::SearchError;

/// Failure while generating an answer through the hosted LLM.
///
/// Covers the whole round trip: missing credentials, transport failures,
/// non-success API statuses (auth errors and rate limits included), and
/// responses that do not contain a completion. Nothing is retried; the error
/// propagates to the caller.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The GROQ_API_KEY environment variable is not set. Detected at the
    /// first LLM call, not at startup.
    #[error("GROQ_API_KEY environment variable is not set")]
    MissingApiKey,

    /// The HTTP request itself failed (connection, DNS, timeout)
    #[error("LLM request failed: {source}")]
    Transport {
        #[from]
        source: reqwest::Error,
    },

    /// The API returned a non-success status
    #[error("LLM API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body did not contain a completion
    #[error("malformed LLM response: {message}")]
    MalformedResponse { message: String },

    /// Retrieval failed while assembling the prompt context
    #[error("retrieval failed: {source}")]
    Retrieval {
        #[from]
        source: SearchError,
    },
}
