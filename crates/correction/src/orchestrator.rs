use tafsir_classifier::{BlockType, EligibleBlock};
use tokio_util::sync::CancellationToken;

use crate::{CorrectionGateway, CorrectionResult, EditCache, Result};

/// Where a block stands within the current run.
#[derive(Debug, Clone, Copy)]
pub enum BlockState<'a> {
    /// A matching result was already cached; the gateway is not called.
    Cached(&'a CorrectionResult),
    InFlight,
    Done(&'a CorrectionResult),
    Failed(&'a CorrectionResult),
}

#[derive(Debug, Clone, Copy)]
pub struct Progress<'a> {
    /// 1-based position in the queue.
    pub position: usize,
    pub total: usize,
    pub block_index: usize,
    pub block_type: BlockType,
    pub state: BlockState<'a>,
}

impl<'a> Progress<'a> {
    fn new(position: usize, total: usize, block: &EligibleBlock<'_>, state: BlockState<'a>) -> Self {
        Self {
            position,
            total,
            block_index: block.index(),
            block_type: block.block_type(),
            state,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct RunSummary {
    pub processed: usize,
    pub changed: usize,
    /// Blocks the service explicitly declared correct.
    pub unchanged: usize,
    pub cached: usize,
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, result: &CorrectionResult, cached: bool) {
        self.processed += 1;
        if cached {
            self.cached += 1;
        }
        if result.changed {
            self.changed += 1;
        }
        if result.unchanged_by_gateway {
            self.unchanged += 1;
        }
        if result.is_failed() {
            self.failed += 1;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum RunStatus {
    Completed,
    /// Cancelled between blocks; the cache holds everything done so far.
    Interrupted,
    /// A block failed; it is cached as failed and nothing after it ran.
    Halted { block_index: usize },
}

#[derive(Debug, Clone)]
pub struct RunReport {
    /// One result per processed block, in block-index order.
    pub results: Vec<CorrectionResult>,
    pub summary: RunSummary,
    pub status: RunStatus,
}

/// Drives eligible blocks through cache and gateway, one at a time and in
/// order. Each fresh result is written to the cache before the next block
/// starts, so a run can be resumed after any interruption.
pub struct Orchestrator<G, C> {
    gateway: G,
    cache: C,
    max_blocks: Option<usize>,
    cancellation: CancellationToken,
}

impl<G: CorrectionGateway, C: EditCache> Orchestrator<G, C> {
    pub fn new(gateway: G, cache: C) -> Self {
        Self {
            gateway,
            cache,
            max_blocks: None,
            cancellation: CancellationToken::new(),
        }
    }

    /// Only the first `max_blocks` eligible blocks are considered.
    pub fn with_max_blocks(mut self, max_blocks: Option<usize>) -> Self {
        self.max_blocks = max_blocks;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn into_parts(self) -> (G, C) {
        (self.gateway, self.cache)
    }

    /// Cache write failures abort the run. Gateway failures do not: they
    /// halt the queue and are reported through [`RunStatus::Halted`].
    pub fn run<F>(&mut self, blocks: &[EligibleBlock<'_>], mut on_progress: F) -> Result<RunReport>
    where
        F: FnMut(Progress<'_>),
    {
        let total_eligible = blocks.len();
        let queue = &blocks[..self.max_blocks.unwrap_or(total_eligible).min(total_eligible)];
        let total = queue.len();

        let mut results = Vec::with_capacity(total);
        let mut summary = RunSummary::default();
        let mut status = RunStatus::Completed;

        tracing::info!(total, total_eligible, cached = self.cache.len(), "correction_started");

        for (offset, block) in queue.iter().enumerate() {
            if self.cancellation.is_cancelled() {
                tracing::info!(next_block = block.index(), "correction_interrupted");
                status = RunStatus::Interrupted;
                break;
            }

            let position = offset + 1;

            if let Some(cached) = self.reusable(block) {
                on_progress(Progress::new(position, total, block, BlockState::Cached(&cached)));
                summary.record(&cached, true);
                results.push(cached);
                continue;
            }

            on_progress(Progress::new(position, total, block, BlockState::InFlight));
            let outcome = self.gateway.correct(block.text());
            let result = CorrectionResult::from_outcome(block.index(), block.text(), outcome);
            self.cache.put(result.clone())?;

            summary.record(&result, false);
            if result.is_failed() {
                on_progress(Progress::new(position, total, block, BlockState::Failed(&result)));
                tracing::error!(
                    block_index = block.index(),
                    remaining = total - offset - 1,
                    "correction_halted"
                );
                status = RunStatus::Halted {
                    block_index: block.index(),
                };
                results.push(result);
                break;
            }

            on_progress(Progress::new(position, total, block, BlockState::Done(&result)));
            results.push(result);
        }

        self.cache.flush_metadata(total_eligible)?;

        tracing::info!(
            processed = summary.processed,
            changed = summary.changed,
            unchanged = summary.unchanged,
            cached = summary.cached,
            status = ?status,
            "correction_finished"
        );

        Ok(RunReport {
            results,
            summary,
            status,
        })
    }

    /// A cached result is reused only when it succeeded and was computed
    /// from the same text.
    fn reusable(&self, block: &EligibleBlock<'_>) -> Option<CorrectionResult> {
        let cached = self.cache.get(block.index())?;
        if cached.original_text != block.text() {
            tracing::warn!(block_index = block.index(), "stale_cache_entry");
            return None;
        }
        if cached.is_failed() {
            tracing::info!(block_index = block.index(), "retrying_failed_block");
            return None;
        }
        Some(cached.clone())
    }
}
