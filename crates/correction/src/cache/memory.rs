use std::collections::BTreeMap;

use super::EditCache;
use crate::{CorrectionResult, Result};

/// Cache that lives for one run only.
#[derive(Debug, Default)]
pub struct MemoryCache {
    results: BTreeMap<usize, CorrectionResult>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results(results: impl IntoIterator<Item = CorrectionResult>) -> Self {
        Self {
            results: results
                .into_iter()
                .map(|result| (result.block_index, result))
                .collect(),
        }
    }

    pub fn results(&self) -> &BTreeMap<usize, CorrectionResult> {
        &self.results
    }
}

impl EditCache for MemoryCache {
    fn get(&self, block_index: usize) -> Option<&CorrectionResult> {
        self.results.get(&block_index)
    }

    fn put(&mut self, result: CorrectionResult) -> Result<()> {
        self.results.insert(result.block_index, result);
        Ok(())
    }

    fn flush_metadata(&mut self, _total_eligible: usize) -> Result<()> {
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.results.clear();
        Ok(())
    }

    fn len(&self) -> usize {
        self.results.len()
    }
}
