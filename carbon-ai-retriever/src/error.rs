//! Error types for the retrieval pathway.
//!
//! Each stage of the pathway has its own error enum so callers can tell a
//! missing knowledge base apart from a broken index or a malformed query.
//! Nothing here is retried internally; every error propagates to the caller.

use carbon_ai_embed::EmbedError;
use std::path::PathBuf;

/// Failure to load the knowledge-base documents from disk.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The configured knowledge-base directory does not exist
    #[error("knowledge base directory not found: {path}")]
    DirectoryMissing { path: PathBuf },

    /// The directory exists but holds no non-empty text documents
    #[error("knowledge base directory contains no non-empty text documents: {path}")]
    EmptyKnowledgeBase { path: PathBuf },

    /// A document could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure while building or persisting the vector index.
///
/// A failure mid-build discards all work for that run; the caller re-runs
/// setup. When the knowledge base itself cannot be loaded the inner
/// [`LoadError`] is surfaced transparently, so the empty-directory case is
/// still recognizable as a load failure.
#[derive(Debug, thiserror::Error)]
pub enum IndexBuildError {
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The embedding model failed to load or to embed a batch
    #[error("embedding model failure during index build: {0}")]
    Embedding(#[from] EmbedError),

    /// SQLite storage failure
    #[error("index storage failure: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Failure while answering a similarity query.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The query string was empty or whitespace
    #[error("query is empty")]
    EmptyQuery,

    /// No persisted index exists, or it holds no embedded chunks
    #[error("vector index has not been built; run setup first")]
    IndexNotBuilt,

    /// The index was built with a different embedding model than the one in
    /// use; nearest-neighbor results would be meaningless
    #[error("index was built with embedding model '{indexed}' but queries use '{current}'; rebuild the index")]
    ModelMismatch { indexed: String, current: String },

    /// The embedding model failed to embed the query
    #[error("embedding model failure during search: {0}")]
    Embedding(#[from] EmbedError),

    /// SQLite storage failure
    #[error("index storage failure: {0}")]
    Storage(#[from] sqlx::Error),
}
