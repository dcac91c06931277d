use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tempfile::NamedTempFile;

use super::{CacheFile, CacheMetadata, EditCache};
use crate::{CorrectionResult, Error, Result};

/// JSON checkpoint file, rewritten atomically on every `put`.
///
/// Opening never fails: a missing, corrupted or foreign file (other document
/// or model) yields an empty cache.
#[derive(Debug)]
pub struct JsonFileCache {
    path: PathBuf,
    state: CacheFile,
}

impl JsonFileCache {
    pub fn open(
        path: impl Into<PathBuf>,
        document_identity: &str,
        model_identity: &str,
    ) -> Self {
        let path = path.into();
        let fresh = || CacheFile::new(CacheMetadata::new(document_identity, model_identity));

        let state = match CacheFile::read(&path) {
            Some(file) if file.metadata.matches(document_identity, model_identity) => {
                tracing::info!(
                    path = %path.display(),
                    entries = file.results.len(),
                    "cache_loaded"
                );
                file
            }
            Some(file) => {
                tracing::warn!(
                    path = %path.display(),
                    cached_document = %file.metadata.document_identity,
                    cached_model = %file.metadata.model_identity,
                    "cache_identity_mismatch"
                );
                fresh()
            }
            None => fresh(),
        };

        Self { path, state }
    }

    /// Deletes the cache file. Returns whether there was one.
    pub fn remove(path: &Path) -> Result<bool> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::cache(path, e)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metadata(&self) -> &CacheMetadata {
        &self.state.metadata
    }

    pub fn results(&self) -> &BTreeMap<usize, CorrectionResult> {
        &self.state.results
    }

    fn persist(&mut self) -> Result<()> {
        self.state.metadata.last_updated_at = Utc::now();
        let content = serde_json::to_string_pretty(&self.state)?;
        atomic_write(&self.path, &content).map_err(|e| Error::cache(&self.path, e))
    }
}

impl EditCache for JsonFileCache {
    fn get(&self, block_index: usize) -> Option<&CorrectionResult> {
        self.state.results.get(&block_index)
    }

    fn put(&mut self, result: CorrectionResult) -> Result<()> {
        self.state.results.insert(result.block_index, result);
        self.persist()
    }

    fn flush_metadata(&mut self, total_eligible: usize) -> Result<()> {
        self.state.metadata.total_eligible_blocks = total_eligible;
        self.persist()
    }

    fn clear(&mut self) -> Result<()> {
        self.state.results.clear();
        self.state.metadata.total_eligible_blocks = 0;
        if Self::remove(&self.path)? {
            tracing::info!(path = %self.path.display(), "cache_cleared");
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.state.results.len()
    }
}

fn atomic_write(target: &Path, content: &str) -> std::io::Result<()> {
    let parent = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut temp = NamedTempFile::new_in(parent)?;
    temp.as_file_mut().write_all(content.as_bytes())?;
    temp.as_file_mut().sync_all()?;
    temp.persist(target)?;
    Ok(())
}
