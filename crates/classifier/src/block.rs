use tafsir_document::{FontDescriptor, Paragraph, describe_font};
use tafsir_script::ScriptProfile;

use crate::{Reason, Signals, classify};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumIter,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockType {
    Scripture,
    Translation,
    Commentary,
    Explanation,
    Header,
    Reference,
    Empty,
    Unknown,
}

impl BlockType {
    pub fn is_eligible(self) -> bool {
        matches!(self, Self::Translation | Self::Commentary | Self::Explanation)
    }
}

/// A classified paragraph. Built once per document load and never mutated.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Block {
    pub index: usize,
    pub block_type: BlockType,
    pub reason: Reason,
    pub text: String,
    pub script_ratio: f64,
    pub font: Option<FontDescriptor>,
    pub has_arabic: bool,
    pub has_cyrillic: bool,
    pub word_count: usize,
    pub char_count: usize,
}

impl Block {
    pub fn eligible_for_correction(&self) -> bool {
        self.block_type.is_eligible()
    }

    pub fn as_eligible(&self) -> Option<EligibleBlock<'_>> {
        self.eligible_for_correction().then_some(EligibleBlock(self))
    }
}

/// A block that may be sent for correction. Only obtainable through
/// [`Block::as_eligible`], so scripture can never reach a correction call.
#[derive(Debug, Clone, Copy)]
pub struct EligibleBlock<'a>(&'a Block);

impl<'a> EligibleBlock<'a> {
    pub fn index(&self) -> usize {
        self.0.index
    }

    pub fn text(&self) -> &'a str {
        &self.0.text
    }

    pub fn block_type(&self) -> BlockType {
        self.0.block_type
    }

    pub fn block(&self) -> &'a Block {
        self.0
    }
}

pub fn classify_paragraph(paragraph: &Paragraph) -> Block {
    let font = describe_font(&paragraph.runs);
    let profile = ScriptProfile::of(&paragraph.text);
    let signals = Signals::with_profile(
        &paragraph.text,
        paragraph.style_name.as_deref(),
        &font,
        &profile,
    );
    let (block_type, reason) = classify(&signals);

    tracing::debug!(
        index = paragraph.index,
        block_type = %block_type,
        reason = %reason,
        script_ratio = profile.ratio,
        "block_classified"
    );

    Block {
        index: paragraph.index,
        block_type,
        reason,
        text: paragraph.text.clone(),
        script_ratio: profile.ratio,
        font: (!font.is_empty()).then_some(font),
        has_arabic: profile.has_arabic(),
        has_cyrillic: profile.has_cyrillic(),
        word_count: profile.word_count,
        char_count: profile.char_count,
    }
}

pub fn classify_document(paragraphs: &[Paragraph]) -> Vec<Block> {
    paragraphs.iter().map(classify_paragraph).collect()
}

/// Blocks handed to the renderer for decorative formatting.
pub fn scripture_blocks(blocks: &[Block]) -> impl Iterator<Item = &Block> {
    blocks
        .iter()
        .filter(|block| block.block_type == BlockType::Scripture)
}
