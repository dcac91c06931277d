use std::collections::BTreeMap;

use strum::IntoEnumIterator;

use crate::{Block, BlockType};

/// Aggregate view over a classified document, as reported by `classify`.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DocumentStats {
    pub total_blocks: usize,
    pub empty_blocks: usize,
    pub by_type: BTreeMap<BlockType, usize>,
    pub eligible_blocks: usize,
    pub eligible_words: usize,
    pub total_chars: usize,
}

impl DocumentStats {
    pub fn of(blocks: &[Block]) -> Self {
        let mut by_type: BTreeMap<BlockType, usize> =
            BlockType::iter().map(|block_type| (block_type, 0)).collect();
        let mut stats = Self {
            total_blocks: blocks.len(),
            ..Default::default()
        };

        for block in blocks {
            *by_type.entry(block.block_type).or_default() += 1;
            stats.total_chars += block.char_count;
            if block.block_type == BlockType::Empty {
                stats.empty_blocks += 1;
            }
            if block.eligible_for_correction() {
                stats.eligible_blocks += 1;
                stats.eligible_words += block.word_count;
            }
        }

        stats.by_type = by_type;
        stats
    }

    pub fn count(&self, block_type: BlockType) -> usize {
        self.by_type.get(&block_type).copied().unwrap_or_default()
    }
}
