mod block;
mod rules;
mod stats;

pub use block::{Block, BlockType, EligibleBlock, classify_document, classify_paragraph, scripture_blocks};
pub use rules::{Reason, Signals, classify};
pub use stats::DocumentStats;
