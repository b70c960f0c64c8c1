//! SQLite storage for documents, chunks, and their embeddings.
//!
//! This is the on-disk vector index: a single SQLite file living inside the
//! knowledge-base directory. It stores the loaded documents, the chunks cut
//! from them, one embedding blob per chunk, and the identity of the embedding
//! model the vectors were produced with.
//!
//! ## Database Schema
//!
//! ```sql
//! -- Documents table: tracks knowledge-base files by content hash
//! CREATE TABLE documents (
//!     hash BLOB PRIMARY KEY,           -- blake3 hash (32 bytes)
//!     source TEXT UNIQUE,              -- file name
//!     size INTEGER,                    -- document size in bytes
//!     modified_at TIMESTAMP,           -- last modification time
//!     indexed_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
//! );
//!
//! -- Chunks table: stores text chunks with embeddings
//! CREATE TABLE chunks (
//!     id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     doc_hash BLOB REFERENCES documents(hash),
//!     source TEXT,                     -- denormalized for display
//!     sequence INTEGER,                -- chunk position within the document
//!     start_offset INTEGER,            -- byte offset in the document
//!     content TEXT,                    -- chunk text
//!     embedding BLOB,                  -- f16 embedding vector
//!     created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
//! );
//!
//! -- Embedding model table: identity of the model the index was built with
//! CREATE TABLE embedding_models (
//!     model_id TEXT PRIMARY KEY,
//!     model_name TEXT,
//!     provider TEXT,
//!     dimension INTEGER,
//!     normalized BOOLEAN,
//!     created_at INTEGER
//! );
//! ```
//!
//! The index is rebuilt wholesale: [`KnowledgeIndex::clear`] drops every row
//! before a rebuild inserts the new set. There is no incremental update and
//! no staleness tracking.

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Row, SqlitePool};
use std::path::{Path, PathBuf};

/// File name of the index database inside the knowledge-base directory.
pub const INDEX_DB_FILE: &str = ".carbon-ai.db";

/// Reference to a document stored in the index database.
#[derive(Debug, Clone)]
pub struct DocumentRecord {
    /// The document's file name
    pub source: String,
    /// Document size in bytes
    pub size: usize,
    /// The blake3 hash of the document bytes
    pub hash: [u8; 32],
    /// Last modification time of the file (Unix timestamp)
    pub modified_at: i64,
}

/// Reference to a text chunk stored in the index database.
///
/// Chunks are the searchable units: each carries its text, its position
/// within the parent document, and the embedding vector computed at build
/// time (f16 for compact storage).
#[derive(Debug, Clone)]
pub struct ChunkRecord {
    pub id: Option<i64>,
    pub doc_hash: [u8; 32],
    pub source: String,
    pub sequence: usize,
    pub start_offset: usize,
    pub content: String,
    pub embedding: Option<Vec<half::f16>>,
}

/// Identity of the embedding model an index was built with.
///
/// Stored alongside the vectors so a model swap without a rebuild is detected
/// at query time instead of silently producing meaningless neighbors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingModelMetadata {
    pub model_name: String,
    pub provider: String,
    pub dimension: usize,
    pub normalized: bool,
}

impl EmbeddingModelMetadata {
    pub fn new(model_name: String, provider: String, dimension: usize) -> Self {
        Self {
            model_name,
            provider,
            dimension,
            normalized: false,
        }
    }

    pub fn with_normalized(mut self, normalized: bool) -> Self {
        self.normalized = normalized;
        self
    }

    /// Create a unique identifier for this model configuration
    pub fn model_id(&self) -> String {
        let normalized_part = if self.normalized { "norm" } else { "raw" };
        format!(
            "{}:{}:{}:{}",
            self.provider, self.model_name, self.dimension, normalized_part
        )
    }
}

/// Counts describing the index contents.
#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    pub documents_count: usize,
    pub chunks_count: usize,
    pub embeddings_count: usize,
}

/// SQLite-based document and chunk index.
#[derive(Clone, Debug)]
pub struct KnowledgeIndex {
    pool: SqlitePool,
}

impl KnowledgeIndex {
    /// Path of the index database for a knowledge-base directory.
    pub fn db_path(knowledge_base: &Path) -> PathBuf {
        knowledge_base.join(INDEX_DB_FILE)
    }

    /// Whether a persisted index exists for the knowledge-base directory.
    pub fn exists(knowledge_base: &Path) -> bool {
        Self::db_path(knowledge_base).is_file()
    }

    /// Opens the index with persistent SQLite storage, creating the database
    /// file if missing.
    pub async fn open(knowledge_base: &Path) -> Result<Self, sqlx::Error> {
        let pool = SqlitePool::connect_with(
            SqliteConnectOptions::new()
                .filename(Self::db_path(knowledge_base))
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
                .busy_timeout(std::time::Duration::from_secs(5))
                .foreign_keys(true)
                .create_if_missing(true)
                .auto_vacuum(sqlx::sqlite::SqliteAutoVacuum::Full)
                .page_size(1 << 16)
                .optimize_on_close(true, 1 << 10),
        )
        .await?;
        Self::new_with_pool(pool).await
    }

    /// Opens the index with in-memory SQLite storage for testing.
    pub async fn open_memory() -> Result<Self, sqlx::Error> {
        let pool = SqlitePool::connect("sqlite::memory:").await?;
        Self::new_with_pool(pool).await
    }

    async fn new_with_pool(pool: SqlitePool) -> Result<Self, sqlx::Error> {
        Self::create_tables(&pool).await?;
        Ok(Self { pool })
    }

    async fn create_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                hash BLOB PRIMARY KEY,
                source TEXT UNIQUE NOT NULL,
                size INTEGER NOT NULL,
                modified_at TIMESTAMP NOT NULL,
                indexed_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS chunks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                doc_hash BLOB NOT NULL,
                source TEXT NOT NULL,
                sequence INTEGER NOT NULL,
                start_offset INTEGER NOT NULL,
                content TEXT NOT NULL,
                embedding BLOB,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                CONSTRAINT unique_chunk UNIQUE(doc_hash, sequence),
                FOREIGN KEY (doc_hash) REFERENCES documents(hash) ON DELETE CASCADE
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS embedding_models (
                model_id TEXT PRIMARY KEY,
                model_name TEXT NOT NULL,
                provider TEXT NOT NULL,
                dimension INTEGER NOT NULL,
                normalized BOOLEAN NOT NULL DEFAULT FALSE,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_chunks_doc_hash ON chunks(doc_hash)")
            .execute(pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_chunks_source ON chunks(source)")
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Delete all index contents ahead of a wholesale rebuild.
    pub async fn clear(&self) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM chunks").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM documents").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM embedding_models")
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Inserts or updates a document record.
    pub async fn upsert_document(&self, document: &DocumentRecord) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO documents (hash, source, size, modified_at, indexed_at)
            VALUES (?1, ?2, ?3, datetime(?4, 'unixepoch'), datetime('now'))
            ON CONFLICT(hash) DO UPDATE SET
                source = excluded.source,
                size = excluded.size,
                modified_at = excluded.modified_at,
                indexed_at = datetime('now')
            "#,
        )
        .bind(&document.hash[..])
        .bind(&document.source)
        .bind(document.size as i64)
        .bind(document.modified_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Inserts or updates multiple text chunks with embeddings in one
    /// transaction.
    pub async fn upsert_chunks(&self, chunks: &[ChunkRecord]) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        for chunk in chunks {
            let embedding_bytes = chunk
                .embedding
                .as_ref()
                .map(|e| bytemuck::cast_slice::<half::f16, u8>(e));

            sqlx::query(
                r#"
                INSERT INTO chunks (doc_hash, source, sequence, start_offset, content, embedding)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(doc_hash, sequence) DO UPDATE SET
                    source = excluded.source,
                    start_offset = excluded.start_offset,
                    content = excluded.content,
                    embedding = excluded.embedding
                "#,
            )
            .bind(&chunk.doc_hash[..])
            .bind(&chunk.source)
            .bind(chunk.sequence as i64)
            .bind(chunk.start_offset as i64)
            .bind(&chunk.content)
            .bind(embedding_bytes)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Get all chunks that carry an embedding, in insertion order.
    pub async fn all_embedded_chunks(&self) -> Result<Vec<ChunkRecord>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT id, doc_hash, source, sequence, start_offset, content, embedding
             FROM chunks WHERE embedding IS NOT NULL ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(chunk_from_row).collect())
    }

    /// Get the chunks of one document, ordered by sequence.
    pub async fn chunks_for_document(
        &self,
        doc_hash: &[u8; 32],
    ) -> Result<Vec<ChunkRecord>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT id, doc_hash, source, sequence, start_offset, content, embedding
             FROM chunks WHERE doc_hash = ?1 ORDER BY sequence",
        )
        .bind(&doc_hash[..])
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(chunk_from_row).collect())
    }

    /// Record the embedding model this index was built with. The index holds
    /// exactly one model row; a rebuild replaces it.
    pub async fn register_embedding_model(
        &self,
        model: &EmbeddingModelMetadata,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO embedding_models
            (model_id, model_name, provider, dimension, normalized, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(model_id) DO UPDATE SET
                model_name = excluded.model_name,
                provider = excluded.provider,
                dimension = excluded.dimension,
                normalized = excluded.normalized
            "#,
        )
        .bind(model.model_id())
        .bind(&model.model_name)
        .bind(&model.provider)
        .bind(model.dimension as i64)
        .bind(model.normalized)
        .bind(chrono::Utc::now().timestamp())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// The embedding model recorded for this index, if any.
    pub async fn embedding_model(&self) -> Result<Option<EmbeddingModelMetadata>, sqlx::Error> {
        let row = sqlx::query(
            "SELECT model_name, provider, dimension, normalized
             FROM embedding_models ORDER BY created_at DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| EmbeddingModelMetadata {
            model_name: row.get("model_name"),
            provider: row.get("provider"),
            dimension: row.get::<i64, _>("dimension") as usize,
            normalized: row.get("normalized"),
        }))
    }

    /// Get statistics about the index
    pub async fn stats(&self) -> Result<IndexStats, sqlx::Error> {
        let documents_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
            .fetch_one(&self.pool)
            .await?;

        let chunks_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks")
            .fetch_one(&self.pool)
            .await?;

        let embeddings_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM chunks WHERE embedding IS NOT NULL")
                .fetch_one(&self.pool)
                .await?;

        Ok(IndexStats {
            documents_count: documents_count as usize,
            chunks_count: chunks_count as usize,
            embeddings_count: embeddings_count as usize,
        })
    }

    /// Get the underlying SQLite connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn chunk_from_row(row: &sqlx::sqlite::SqliteRow) -> ChunkRecord {
    let id: i64 = row.get("id");
    let doc_hash_bytes: Vec<u8> = row.get("doc_hash");
    let source: String = row.get("source");
    let sequence: i64 = row.get("sequence");
    let start_offset: i64 = row.get("start_offset");
    let content: String = row.get("content");
    let embedding_bytes: Option<Vec<u8>> = row.get("embedding");

    let mut doc_hash = [0u8; 32];
    doc_hash.copy_from_slice(&doc_hash_bytes[..32]);

    let embedding =
        embedding_bytes.map(|bytes| bytemuck::cast_slice::<u8, half::f16>(&bytes).to_vec());

    ChunkRecord {
        id: Some(id),
        doc_hash,
        source,
        sequence: sequence as usize,
        start_offset: start_offset as usize,
        content,
        embedding,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_document() -> DocumentRecord {
        DocumentRecord {
            source: "ghg_protocol_scopes.txt".to_string(),
            size: 48,
            hash: [1; 32],
            modified_at: 1640995200,
        }
    }

    #[tokio::test]
    async fn test_document_and_chunk_roundtrip() {
        let index = KnowledgeIndex::open_memory().await.unwrap();
        index.upsert_document(&sample_document()).await.unwrap();

        let chunks = vec![
            ChunkRecord {
                id: None,
                doc_hash: [1; 32],
                source: "ghg_protocol_scopes.txt".to_string(),
                sequence: 0,
                start_offset: 0,
                content: "Scope 1 covers direct emissions.".to_string(),
                embedding: Some(vec![
                    half::f16::from_f32(0.1),
                    half::f16::from_f32(0.2),
                    half::f16::from_f32(0.3),
                ]),
            },
            ChunkRecord {
                id: None,
                doc_hash: [1; 32],
                source: "ghg_protocol_scopes.txt".to_string(),
                sequence: 1,
                start_offset: 24,
                content: "Scope 2 covers purchased electricity.".to_string(),
                embedding: Some(vec![
                    half::f16::from_f32(0.4),
                    half::f16::from_f32(0.5),
                    half::f16::from_f32(0.6),
                ]),
            },
        ];
        index.upsert_chunks(&chunks).await.unwrap();

        let fetched = index.chunks_for_document(&[1; 32]).await.unwrap();
        assert_eq!(fetched.len(), 2);
        assert_eq!(fetched[0].content, "Scope 1 covers direct emissions.");
        assert_eq!(fetched[1].sequence, 1);
        assert_eq!(
            fetched[0].embedding.as_ref().unwrap(),
            &vec![
                half::f16::from_f32(0.1),
                half::f16::from_f32(0.2),
                half::f16::from_f32(0.3)
            ]
        );

        let stats = index.stats().await.unwrap();
        assert_eq!(stats.documents_count, 1);
        assert_eq!(stats.chunks_count, 2);
        assert_eq!(stats.embeddings_count, 2);
    }

    #[tokio::test]
    async fn test_clear_empties_everything() {
        let index = KnowledgeIndex::open_memory().await.unwrap();
        index.upsert_document(&sample_document()).await.unwrap();
        index
            .upsert_chunks(&[ChunkRecord {
                id: None,
                doc_hash: [1; 32],
                source: "ghg_protocol_scopes.txt".to_string(),
                sequence: 0,
                start_offset: 0,
                content: "Scope 1 covers direct emissions.".to_string(),
                embedding: None,
            }])
            .await
            .unwrap();

        index.clear().await.unwrap();

        let stats = index.stats().await.unwrap();
        assert_eq!(stats.documents_count, 0);
        assert_eq!(stats.chunks_count, 0);
    }

    #[tokio::test]
    async fn test_embedding_model_registration() {
        let index = KnowledgeIndex::open_memory().await.unwrap();

        assert!(index.embedding_model().await.unwrap().is_none());

        let model = EmbeddingModelMetadata::new(
            "all-MiniLM-L6-v2".to_string(),
            "fastembed".to_string(),
            384,
        )
        .with_normalized(true);
        index.register_embedding_model(&model).await.unwrap();

        let stored = index.embedding_model().await.unwrap().unwrap();
        assert_eq!(stored, model);
        assert_eq!(stored.model_id(), "fastembed:all-MiniLM-L6-v2:384:norm");
    }

    #[tokio::test]
    async fn test_all_embedded_chunks_skips_missing_embeddings() {
        let index = KnowledgeIndex::open_memory().await.unwrap();
        index.upsert_document(&sample_document()).await.unwrap();
        index
            .upsert_chunks(&[
                ChunkRecord {
                    id: None,
                    doc_hash: [1; 32],
                    source: "ghg_protocol_scopes.txt".to_string(),
                    sequence: 0,
                    start_offset: 0,
                    content: "embedded".to_string(),
                    embedding: Some(vec![half::f16::from_f32(1.0)]),
                },
                ChunkRecord {
                    id: None,
                    doc_hash: [1; 32],
                    source: "ghg_protocol_scopes.txt".to_string(),
                    sequence: 1,
                    start_offset: 8,
                    content: "not embedded".to_string(),
                    embedding: None,
                },
            ])
            .await
            .unwrap();

        let embedded = index.all_embedded_chunks().await.unwrap();
        assert_eq!(embedded.len(), 1);
        assert_eq!(embedded[0].content, "embedded");
    }
}
