pub mod text;

// Re-export the main chunking types for external use
pub use text::{
    DEFAULT_CHUNK_OVERLAP, DEFAULT_MAX_CHUNK_LEN, DEFAULT_TEXT_DELIMITERS, DocumentChunk,
    TextSplitter,
};
