use std::convert::Infallible;
use std::path::{Path, PathBuf};

use tafsir_word_diff::{DiffRenderer, StyledRun};

/// First `max_chars` characters on one line, with an ellipsis when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut cut: String = flat.chars().take(max_chars).collect();
    cut.push('…');
    cut
}

/// `<dir>/<stem>_edits.json` next to the input document.
pub fn default_edits_path(document: &Path) -> PathBuf {
    let stem = document
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    document.with_file_name(format!("{stem}_edits.json"))
}

#[derive(Debug, serde::Serialize)]
struct RenderedBlock {
    block_index: usize,
    runs: Vec<StyledRun>,
}

/// Styled runs for every changed paragraph, written for a document writer
/// to apply: deleted runs struck through, inserted runs highlighted.
#[derive(Debug, serde::Serialize)]
pub struct EditsFile {
    source: String,
    model: String,
    /// Paragraphs a writer may decorate but must never alter.
    scripture_blocks: Vec<usize>,
    blocks: Vec<RenderedBlock>,
}

impl EditsFile {
    pub fn new(source: String, model: String, scripture_blocks: Vec<usize>) -> Self {
        Self {
            source,
            model,
            scripture_blocks,
            blocks: Vec::new(),
        }
    }

    pub fn write(&self, path: &Path) -> crate::error::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| crate::error::Error::Output {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl DiffRenderer for EditsFile {
    type Error = Infallible;

    fn render_block(&mut self, block_index: usize, runs: &[StyledRun]) -> Result<(), Self::Error> {
        self.blocks.push(RenderedBlock {
            block_index,
            runs: runs.to_vec(),
        });
        Ok(())
    }
}
