mod file;
mod memory;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

pub use file::JsonFileCache;
pub use memory::MemoryCache;

use crate::{CorrectionResult, Result};

/// Write-through store of one [`CorrectionResult`] per block index.
pub trait EditCache {
    fn get(&self, block_index: usize) -> Option<&CorrectionResult>;

    /// Stores `result`, replacing any previous result for the same block.
    /// Durable by the time it returns.
    fn put(&mut self, result: CorrectionResult) -> Result<()>;

    fn flush_metadata(&mut self, total_eligible: usize) -> Result<()>;

    fn clear(&mut self) -> Result<()>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CacheMetadata {
    pub document_identity: String,
    pub model_identity: String,
    pub total_eligible_blocks: usize,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

impl CacheMetadata {
    pub fn new(document_identity: impl Into<String>, model_identity: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            document_identity: document_identity.into(),
            model_identity: model_identity.into(),
            total_eligible_blocks: 0,
            created_at: now,
            last_updated_at: now,
        }
    }

    pub fn matches(&self, document_identity: &str, model_identity: &str) -> bool {
        self.document_identity == document_identity && self.model_identity == model_identity
    }
}

/// On-disk shape. Block indices become string keys in JSON.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CacheFile {
    pub metadata: CacheMetadata,
    #[serde(default)]
    pub results: BTreeMap<usize, CorrectionResult>,
}

impl CacheFile {
    pub fn new(metadata: CacheMetadata) -> Self {
        Self {
            metadata,
            results: BTreeMap::new(),
        }
    }

    /// `None` when the file is missing or unreadable; never fails.
    pub fn read(path: &Path) -> Option<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cache_unreadable");
                return None;
            }
        };

        match serde_json::from_str::<Self>(&content) {
            Ok(mut file) => {
                file.results.retain(|key, result| {
                    let consistent = *key == result.block_index;
                    if !consistent {
                        tracing::warn!(key, block_index = result.block_index, "cache_entry_dropped");
                    }
                    consistent
                });
                Some(file)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cache_corrupted");
                None
            }
        }
    }
}

/// `<dir>/<document file name>.cache.json`, where `dir` defaults to the
/// document's own directory.
pub fn cache_path_for(document: &Path, cache_dir: Option<&Path>) -> PathBuf {
    let file_name = document
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let dir = cache_dir
        .or_else(|| document.parent())
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    dir.join(format!("{file_name}.cache.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_path_sits_next_to_document() {
        assert_eq!(
            cache_path_for(Path::new("/docs/tafsir.docx"), None),
            PathBuf::from("/docs/tafsir.docx.cache.json")
        );
        assert_eq!(
            cache_path_for(Path::new("tafsir.docx"), None),
            PathBuf::from("./tafsir.docx.cache.json")
        );
        assert_eq!(
            cache_path_for(Path::new("/docs/tafsir.docx"), Some(Path::new("/var/cache"))),
            PathBuf::from("/var/cache/tafsir.docx.cache.json")
        );
    }

    #[test]
    fn results_use_string_keys_on_disk() {
        let mut file = CacheFile::new(CacheMetadata::new("doc", "gpt-4o-mini"));
        file.results.insert(
            12,
            CorrectionResult::from_outcome(12, "текст", crate::CorrectionOutcome::Unchanged),
        );

        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["results"]["12"]["block_index"], 12);
        assert_eq!(json["metadata"]["model_identity"], "gpt-4o-mini");
    }
}
