use std::collections::BTreeMap;
use std::convert::Infallible;

use crate::diff::needs_separator;
use crate::{DiffKind, DiffOperation};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display, serde::Serialize, serde::Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RunStyle {
    #[default]
    Normal,
    /// Struck through in red.
    Deleted,
    /// Highlighted.
    Inserted,
}

impl From<DiffKind> for RunStyle {
    fn from(kind: DiffKind) -> Self {
        match kind {
            DiffKind::Equal => Self::Normal,
            DiffKind::Delete => Self::Deleted,
            DiffKind::Insert => Self::Inserted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StyledRun {
    pub text: String,
    pub style: RunStyle,
}

/// Turns an edit script into the runs that replace a paragraph's content.
/// Separators are emitted as their own `Normal` runs.
pub fn render_runs(operations: &[DiffOperation]) -> Vec<StyledRun> {
    let mut runs = Vec::with_capacity(operations.len() * 2);
    let mut previous = None;
    for op in operations.iter().filter(|op| !op.tokens.is_empty()) {
        if needs_separator(previous, op.kind) {
            runs.push(StyledRun {
                text: " ".to_string(),
                style: RunStyle::Normal,
            });
        }
        runs.push(StyledRun {
            text: op.text(),
            style: op.kind.into(),
        });
        previous = Some(op.kind);
    }
    runs
}

/// Consumer of rendered diffs, one call per changed block in index order.
///
/// Implementations write the runs into whatever owns the paragraph, e.g. a
/// word-processor document or a terminal.
pub trait DiffRenderer {
    type Error;

    fn render_block(&mut self, block_index: usize, runs: &[StyledRun]) -> Result<(), Self::Error>;
}

/// Plain-text rendering: `[-deleted-]{+inserted+}`.
pub fn markup(runs: &[StyledRun]) -> String {
    runs.iter()
        .map(|run| match run.style {
            RunStyle::Normal => run.text.clone(),
            RunStyle::Deleted => format!("[-{}-]", run.text),
            RunStyle::Inserted => format!("{{+{}+}}", run.text),
        })
        .collect()
}

/// Collects the markup of every rendered block.
#[derive(Debug, Default)]
pub struct MarkupRenderer {
    rendered: BTreeMap<usize, String>,
}

impl MarkupRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, block_index: usize) -> Option<&str> {
        self.rendered.get(&block_index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rendered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rendered.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.rendered
            .iter()
            .map(|(index, text)| (*index, text.as_str()))
    }
}

impl DiffRenderer for MarkupRenderer {
    type Error = Infallible;

    fn render_block(&mut self, block_index: usize, runs: &[StyledRun]) -> Result<(), Self::Error> {
        self.rendered.insert(block_index, markup(runs));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff;

    #[test]
    fn replacement_renders_without_gap() {
        let runs = render_runs(&diff("Во истину Аллаh велик.", "Воистину Аллаh велик."));
        assert_eq!(
            runs.iter().map(|run| run.style).collect::<Vec<_>>(),
            vec![
                RunStyle::Deleted,
                RunStyle::Inserted,
                RunStyle::Normal,
                RunStyle::Normal
            ]
        );
        assert_eq!(markup(&runs), "[-Во истину-]{+Воистину+} Аллаh велик.");
    }

    #[test]
    fn unchanged_text_is_a_single_normal_run() {
        let runs = render_runs(&diff("Хвала Аллаху", "Хвала Аллаху"));
        assert_eq!(
            runs,
            vec![StyledRun {
                text: "Хвала Аллаху".to_string(),
                style: RunStyle::Normal
            }]
        );
    }

    #[test]
    fn markup_renderer_keys_by_block() {
        let mut renderer = MarkupRenderer::new();
        let runs = render_runs(&diff("Хвала Господу", "Хвала Аллаху"));
        renderer.render_block(6, &runs).unwrap();

        assert_eq!(renderer.len(), 1);
        assert_eq!(renderer.get(6), Some("Хвала [-Господу-]{+Аллаху+}"));
        assert_eq!(renderer.get(5), None);
    }
}
