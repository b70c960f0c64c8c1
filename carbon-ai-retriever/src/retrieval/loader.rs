//! Loading knowledge-base documents from disk.

use crate::error::LoadError;
use std::path::Path;

/// Files larger than this are skipped; the knowledge base consists of short
/// reference texts, anything bigger is assumed to be misplaced.
const MAX_DOCUMENT_BYTES: u64 = 1 << 20;

/// A knowledge-base document as read from disk.
#[derive(Debug, Clone)]
pub struct KnowledgeDocument {
    /// The document's file name, used as its source identifier
    pub source: String,
    /// The document text
    pub content: String,
    /// The blake3 hash of the raw file bytes
    pub hash: [u8; 32],
    /// Last modification time of the file (Unix timestamp)
    pub modified_at: i64,
}

/// Load every text document from the knowledge-base directory.
///
/// Reads all `*.txt` files, sorted by file name so the resulting document
/// order (and therefore the index build) is deterministic. Non-text entries,
/// empty files, and oversized files are skipped with a log line.
///
/// Fails with [`LoadError::DirectoryMissing`] when the directory does not
/// exist and [`LoadError::EmptyKnowledgeBase`] when nothing loadable is
/// found. No retry; the caller re-runs setup after fixing the directory.
pub async fn load_knowledge_base(dir: &Path) -> Result<Vec<KnowledgeDocument>, LoadError> {
    if !dir.is_dir() {
        return Err(LoadError::DirectoryMissing {
            path: dir.to_path_buf(),
        });
    }

    let mut entries = Vec::new();
    let mut read_dir = tokio::fs::read_dir(dir).await.map_err(|source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    while let Some(entry) = read_dir.next_entry().await.map_err(|source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    })? {
        entries.push(entry.path());
    }
    entries.sort();

    let mut documents = Vec::new();
    for path in entries {
        if path.extension().and_then(|e| e.to_str()) != Some("txt") {
            tracing::debug!("Skipping non-text entry {}", path.display());
            continue;
        }

        let metadata = tokio::fs::metadata(&path).await.map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        if metadata.len() > MAX_DOCUMENT_BYTES {
            tracing::warn!(
                "Skipping {} ({} bytes exceeds the {} byte document limit)",
                path.display(),
                metadata.len(),
                MAX_DOCUMENT_BYTES
            );
            continue;
        }

        let bytes = tokio::fs::read(&path).await.map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        let hash = *blake3::hash(&bytes).as_bytes();
        let content = String::from_utf8_lossy(&bytes).into_owned();
        if content.trim().is_empty() {
            tracing::debug!("Skipping empty document {}", path.display());
            continue;
        }

        let modified_at = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);

        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());

        tracing::debug!("Loaded {} ({} bytes)", source, bytes.len());
        documents.push(KnowledgeDocument {
            source,
            content,
            hash,
            modified_at,
        });
    }

    if documents.is_empty() {
        return Err(LoadError::EmptyKnowledgeBase {
            path: dir.to_path_buf(),
        });
    }

    tracing::info!(
        "Loaded {} knowledge base documents from {}",
        documents.len(),
        dir.display()
    );
    Ok(documents)
}
