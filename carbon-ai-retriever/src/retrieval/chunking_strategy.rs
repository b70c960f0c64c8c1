use carbon_ai_context::{DEFAULT_TEXT_DELIMITERS, DocumentChunk, TextSplitter};

/// Configuration for chunking knowledge-base documents
#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    /// Maximum size of each chunk in characters
    pub max_chunk_len: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_len: carbon_ai_context::DEFAULT_MAX_CHUNK_LEN,
            chunk_overlap: carbon_ai_context::DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl ChunkingConfig {
    pub fn new(max_chunk_len: usize, chunk_overlap: usize) -> Self {
        Self {
            max_chunk_len,
            chunk_overlap,
        }
    }
}

/// Strategy for chunking documents - delegates entirely to carbon-ai-context
#[derive(Debug, Clone)]
pub struct ChunkingStrategy {
    config: ChunkingConfig,
}

impl ChunkingStrategy {
    /// Create a new chunking strategy with the given configuration
    pub fn new(config: ChunkingConfig) -> Self {
        Self { config }
    }

    /// Chunk a document's content using carbon-ai-context
    pub fn chunk_content(&self, source: &str, content: &str) -> Vec<DocumentChunk> {
        let splitter = TextSplitter::new(
            source,
            DEFAULT_TEXT_DELIMITERS,
            self.config.max_chunk_len,
            self.config.chunk_overlap,
        );

        let chunks = splitter.split(content);

        tracing::debug!(
            "Chunked {} into {} chunks (max size: {}, overlap: {})",
            source,
            chunks.len(),
            self.config.max_chunk_len,
            self.config.chunk_overlap
        );

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunking_strategy() {
        let strategy = ChunkingStrategy::new(ChunkingConfig::new(200, 40));
        let content = (0..40)
            .map(|_| "Direct emissions come from owned sources. ")
            .collect::<String>();

        let chunks = strategy.chunk_content("ghg_protocol_scopes.txt", &content);

        assert!(chunks.len() > 1);
        assert_eq!(chunks[0].source, "ghg_protocol_scopes.txt");
        for chunk in &chunks {
            assert!(chunk.text.len() <= 200);
        }
    }

    #[test]
    fn test_chunking_is_deterministic() {
        let strategy = ChunkingStrategy::new(ChunkingConfig::default());
        let content = (0..30)
            .map(|i| format!("Regulation paragraph {i}.\n\n"))
            .collect::<String>();

        let a = strategy.chunk_content("carbon_regulations.txt", &content);
        let b = strategy.chunk_content("carbon_regulations.txt", &content);
        assert_eq!(a, b);
    }
}
