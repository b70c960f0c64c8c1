//! Nearest-neighbor search over the stored chunk embeddings.

use crate::error::SearchError;
use crate::retrieval::knowledge_index::{ChunkRecord, KnowledgeIndex};
use carbon_ai_embed::EmbeddingProvider;
use serde::Serialize;
use std::sync::Arc;

/// One query result: a chunk and its similarity to the query.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk {
    /// The chunk text
    pub content: String,
    /// Source document the chunk came from
    pub source: String,
    /// Chunk position within its document
    pub sequence: usize,
    /// Cosine similarity to the query, higher is more similar
    pub score: f32,
}

/// Embeds queries and scans the index for the nearest chunks.
///
/// The scan is a brute-force cosine similarity pass over every stored
/// embedding. The knowledge base is a handful of documents, so a linear scan
/// is both exact and fast enough; there is no approximate index structure.
#[derive(Clone)]
pub struct Retriever {
    index: KnowledgeIndex,
    provider: Arc<dyn EmbeddingProvider>,
}

impl Retriever {
    pub fn new(index: KnowledgeIndex, provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { index, provider }
    }

    /// The index this retriever searches.
    pub fn index(&self) -> &KnowledgeIndex {
        &self.index
    }

    /// Return the top `k` chunks most similar to `query`, ordered by
    /// non-increasing similarity. Returns fewer than `k` results when the
    /// index holds fewer chunks.
    ///
    /// Results are deterministic for a fixed index and query: embedding
    /// generation is deterministic given the model weights, and ties are
    /// broken by insertion order.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>, SearchError> {
        if query.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        // The stored model identity must match the query-time model; anything
        // else requires a rebuild.
        let indexed_model = self
            .index
            .embedding_model()
            .await?
            .ok_or(SearchError::IndexNotBuilt)?;
        if indexed_model.model_name != self.provider.model_name()
            || indexed_model.dimension != self.provider.embedding_dimension()
        {
            return Err(SearchError::ModelMismatch {
                indexed: indexed_model.model_name,
                current: self.provider.model_name().to_string(),
            });
        }

        let query_embedding = self.provider.embed_text(query).await?;

        let chunks = self.index.all_embedded_chunks().await?;
        if chunks.is_empty() {
            return Err(SearchError::IndexNotBuilt);
        }

        let mut scored: Vec<(f32, ChunkRecord)> = chunks
            .into_iter()
            .filter_map(|chunk| {
                let embedding = chunk.embedding.as_ref()?;
                let score = cosine_similarity(&query_embedding, embedding);
                Some((score, chunk))
            })
            .collect();

        // Sort by similarity descending; sort_by is stable, so equal scores
        // keep insertion order.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        tracing::debug!(
            "Query returned {} results (top score {:.3})",
            scored.len(),
            scored.first().map(|(s, _)| *s).unwrap_or(0.0)
        );

        Ok(scored
            .into_iter()
            .map(|(score, chunk)| ScoredChunk {
                content: chunk.content,
                source: chunk.source,
                sequence: chunk.sequence,
                score,
            })
            .collect())
    }
}

/// Calculate cosine similarity between two f16 embedding vectors
fn cosine_similarity(a: &[half::f16], b: &[half::f16]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| f32::from(*x) * f32::from(*y))
        .sum();

    let norm_a: f32 = a.iter().map(|x| f32::from(*x).powi(2)).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| f32::from(*x).powi(2)).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetrievalConfig;
    use crate::retrieval::index_builder::build_index;
    use carbon_ai_embed::HashEmbeddingProvider;
    use half::f16;
    use tempfile::tempdir;

    fn test_provider() -> Arc<dyn EmbeddingProvider> {
        Arc::new(HashEmbeddingProvider::new(64))
    }

    async fn build_test_index(files: &[(&str, &str)]) -> (tempfile::TempDir, Retriever) {
        let dir = tempdir().unwrap();
        for (name, content) in files {
            std::fs::write(dir.path().join(name), content).unwrap();
        }
        let config = RetrievalConfig::new(dir.path());
        let provider = test_provider();
        let index = build_index(&config, provider.clone()).await.unwrap();
        (dir, Retriever::new(index, provider))
    }

    #[test]
    fn test_cosine_similarity() {
        let a: Vec<f16> = [1.0f32, 0.0, 0.0].iter().map(|&x| f16::from_f32(x)).collect();
        let b: Vec<f16> = [1.0f32, 0.0, 0.0].iter().map(|&x| f16::from_f32(x)).collect();
        let c: Vec<f16> = [0.0f32, 1.0, 0.0].iter().map(|&x| f16::from_f32(x)).collect();

        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-3);
        assert!(cosine_similarity(&a, &c).abs() < 1e-3);
        assert_eq!(cosine_similarity(&a, &[]), 0.0);
    }

    #[tokio::test]
    async fn test_empty_query_is_rejected() {
        let (_dir, retriever) =
            build_test_index(&[("scopes.txt", "Scope 1 covers direct emissions.")]).await;

        let err = retriever.search("   ", 4).await.unwrap_err();
        assert!(matches!(err, SearchError::EmptyQuery));
    }

    #[tokio::test]
    async fn test_unbuilt_index_is_rejected() {
        let index = KnowledgeIndex::open_memory().await.unwrap();
        let retriever = Retriever::new(index, test_provider());

        let err = retriever.search("scope 1", 4).await.unwrap_err();
        assert!(matches!(err, SearchError::IndexNotBuilt));
    }

    #[tokio::test]
    async fn test_model_mismatch_is_rejected() {
        let (_dir, retriever) =
            build_test_index(&[("scopes.txt", "Scope 1 covers direct emissions.")]).await;

        // Same index, different query-time model dimension.
        let mismatched = Retriever::new(
            retriever.index().clone(),
            Arc::new(HashEmbeddingProvider::new(32)),
        );
        let err = mismatched.search("scope 1", 4).await.unwrap_err();
        assert!(matches!(err, SearchError::ModelMismatch { .. }));
    }

    #[tokio::test]
    async fn test_results_are_bounded_and_sorted() {
        let long_doc = (0..50)
            .map(|i| format!("Paragraph {i} about reduction strategies and energy audits.\n\n"))
            .collect::<String>();
        let (_dir, retriever) = build_test_index(&[
            ("strategies.txt", long_doc.as_str()),
            ("scopes.txt", "Scope 1 covers direct emissions from owned sources."),
        ])
        .await;

        let results = retriever.search("energy audits", 3).await.unwrap();
        assert!(results.len() <= 3);
        assert!(!results.is_empty());
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[tokio::test]
    async fn test_fewer_chunks_than_k_returns_all() {
        let (_dir, retriever) =
            build_test_index(&[("scopes.txt", "Scope 1 covers direct emissions.")]).await;

        let results = retriever.search("emissions", 10).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_scope_two_scenario() {
        // Knowledge base of one file kept as a single chunk; the query must
        // return it as the sole result.
        let (_dir, retriever) = build_test_index(&[(
            "scopes.txt",
            "Scope 1 covers direct emissions. Scope 2 covers purchased electricity.",
        )])
        .await;

        let results = retriever.search("What is Scope 2?", 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].content,
            "Scope 1 covers direct emissions. Scope 2 covers purchased electricity."
        );
        assert_eq!(results[0].source, "scopes.txt");
    }

    #[tokio::test]
    async fn test_persisted_index_round_trip() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("markets.txt"),
            (0..40)
                .map(|i| format!("Carbon credit registries entry {i} verify offsets. "))
                .collect::<String>(),
        )
        .unwrap();

        let config = RetrievalConfig::new(dir.path());
        let provider = test_provider();
        let index = build_index(&config, provider.clone()).await.unwrap();
        let before = Retriever::new(index, provider.clone())
            .search("offset registries", 5)
            .await
            .unwrap();

        // Reopen from disk and repeat the query.
        let reopened = KnowledgeIndex::open(dir.path()).await.unwrap();
        let after = Retriever::new(reopened, provider)
            .search("offset registries", 5)
            .await
            .unwrap();

        assert_eq!(before.len(), after.len());
        for (b, a) in before.iter().zip(after.iter()) {
            assert_eq!(b.content, a.content);
            assert_eq!(b.source, a.source);
            assert!((b.score - a.score).abs() < 1e-6);
        }
    }
}
