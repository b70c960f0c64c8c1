//! Wholesale construction of the vector index.
//!
//! The build is a single pass: load every knowledge-base document, chunk each
//! one, embed every chunk, and write documents + chunks + model identity into
//! a fresh index. There is no incremental update and no partial-build
//! recovery; a failure discards the run and the caller re-runs setup.
//!
//! ## Pipeline Flow
//!
//! ```text
//! knowledge_base/*.txt → loader → ChunkingStrategy → EmbeddingProvider → KnowledgeIndex
//! ```
//!
//! Document loading happens before the database file is created, so a missing
//! or empty knowledge base fails without leaving an index file behind.

use crate::config::RetrievalConfig;
use crate::error::IndexBuildError;
use crate::retrieval::chunking_strategy::{ChunkingConfig, ChunkingStrategy};
use crate::retrieval::knowledge_index::{
    ChunkRecord, DocumentRecord, EmbeddingModelMetadata, KnowledgeIndex,
};
use crate::retrieval::loader::load_knowledge_base;
use carbon_ai_embed::EmbeddingProvider;
use std::sync::Arc;

/// Build the index from scratch, replacing any existing contents.
pub async fn build_index(
    config: &RetrievalConfig,
    provider: Arc<dyn EmbeddingProvider>,
) -> Result<KnowledgeIndex, IndexBuildError> {
    // Load first: an unusable knowledge base must fail before the database
    // file is created.
    let documents = load_knowledge_base(&config.knowledge_base_path).await?;

    let strategy = ChunkingStrategy::new(ChunkingConfig::new(
        config.max_chunk_len,
        config.chunk_overlap,
    ));

    let mut records: Vec<ChunkRecord> = Vec::new();
    for document in &documents {
        for chunk in strategy.chunk_content(&document.source, &document.content) {
            records.push(ChunkRecord {
                id: None,
                doc_hash: document.hash,
                source: chunk.source,
                sequence: chunk.sequence,
                start_offset: chunk.offset,
                content: chunk.text,
                embedding: None,
            });
        }
    }

    tracing::info!(
        "Embedding {} chunks from {} documents",
        records.len(),
        documents.len()
    );
    let texts: Vec<String> = records.iter().map(|r| r.content.clone()).collect();
    let embeddings = provider.embed_texts(&texts).await?;
    for (record, embedding) in records.iter_mut().zip(embeddings.embeddings) {
        record.embedding = Some(embedding);
    }

    let index = KnowledgeIndex::open(&config.knowledge_base_path).await?;
    index.clear().await?;

    let model = EmbeddingModelMetadata::new(
        provider.model_name().to_string(),
        provider.provider_name().to_string(),
        provider.embedding_dimension(),
    )
    .with_normalized(config.embed.normalize);
    index.register_embedding_model(&model).await?;

    for document in &documents {
        index
            .upsert_document(&DocumentRecord {
                source: document.source.clone(),
                size: document.content.len(),
                hash: document.hash,
                modified_at: document.modified_at,
            })
            .await?;
    }
    index.upsert_chunks(&records).await?;

    let stats = index.stats().await?;
    tracing::info!(
        "Index built: {} documents, {} chunks, {} embeddings",
        stats.documents_count,
        stats.chunks_count,
        stats.embeddings_count
    );

    Ok(index)
}

/// Open the persisted index if one exists, otherwise build it.
pub async fn load_or_build_index(
    config: &RetrievalConfig,
    provider: Arc<dyn EmbeddingProvider>,
) -> Result<KnowledgeIndex, IndexBuildError> {
    if KnowledgeIndex::exists(&config.knowledge_base_path) {
        tracing::info!(
            "Opening existing index in {}",
            config.knowledge_base_path.display()
        );
        Ok(KnowledgeIndex::open(&config.knowledge_base_path).await?)
    } else {
        tracing::info!("No existing index found, building a new one");
        build_index(config, provider).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;
    use carbon_ai_embed::HashEmbeddingProvider;
    use tempfile::tempdir;

    fn test_provider() -> Arc<dyn EmbeddingProvider> {
        Arc::new(HashEmbeddingProvider::new(64))
    }

    #[tokio::test]
    async fn test_build_produces_at_least_one_chunk_per_document() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("ghg_protocol_scopes.txt"),
            "Scope 1 covers direct emissions. Scope 2 covers purchased electricity.",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("carbon_offset_markets.txt"),
            (0..60)
                .map(|_| "Offset credits are verified and retired on registries. ")
                .collect::<String>(),
        )
        .unwrap();

        let config = RetrievalConfig::new(dir.path());
        let index = build_index(&config, test_provider()).await.unwrap();

        let stats = index.stats().await.unwrap();
        assert_eq!(stats.documents_count, 2);
        assert!(stats.chunks_count >= stats.documents_count);
        assert_eq!(stats.embeddings_count, stats.chunks_count);

        let model = index.embedding_model().await.unwrap().unwrap();
        assert_eq!(model.model_name, "hashed-bag-of-words");
        assert_eq!(model.dimension, 64);
        assert!(model.normalized);
    }

    #[tokio::test]
    async fn test_empty_knowledge_base_fails_without_writing_index() {
        let dir = tempdir().unwrap();
        let config = RetrievalConfig::new(dir.path());

        let err = build_index(&config, test_provider()).await.unwrap_err();
        assert!(matches!(
            err,
            IndexBuildError::Load(LoadError::EmptyKnowledgeBase { .. })
        ));
        assert!(!KnowledgeIndex::exists(dir.path()));
    }

    #[tokio::test]
    async fn test_missing_directory_fails_without_writing_index() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let config = RetrievalConfig::new(&missing);

        let err = build_index(&config, test_provider()).await.unwrap_err();
        assert!(matches!(
            err,
            IndexBuildError::Load(LoadError::DirectoryMissing { .. })
        ));
        assert!(!KnowledgeIndex::exists(&missing));
    }

    #[tokio::test]
    async fn test_load_or_build_reuses_existing_index() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("strategies.txt"),
            "Switch to renewable electricity to cut Scope 2 emissions.",
        )
        .unwrap();

        let config = RetrievalConfig::new(dir.path());
        let built = build_index(&config, test_provider()).await.unwrap();
        let built_stats = built.stats().await.unwrap();

        // Remove the source document: a reopened index must not rebuild.
        std::fs::remove_file(dir.path().join("strategies.txt")).unwrap();

        let reopened = load_or_build_index(&config, test_provider()).await.unwrap();
        let reopened_stats = reopened.stats().await.unwrap();
        assert_eq!(reopened_stats.chunks_count, built_stats.chunks_count);
        assert_eq!(reopened_stats.documents_count, built_stats.documents_count);
    }

    #[tokio::test]
    async fn test_rebuild_replaces_previous_contents() {
        let dir = tempdir().unwrap();
        let doc = dir.path().join("regulations.txt");
        std::fs::write(&doc, "The EU ETS caps emissions from power generation.").unwrap();

        let config = RetrievalConfig::new(dir.path());
        build_index(&config, test_provider()).await.unwrap();

        std::fs::write(&doc, "CBAM prices embedded carbon in imports.").unwrap();
        let rebuilt = build_index(&config, test_provider()).await.unwrap();

        let chunks = rebuilt.all_embedded_chunks().await.unwrap();
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].content.contains("CBAM"));
    }
}
