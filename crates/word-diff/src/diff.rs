use similar::{Algorithm, DiffTag, capture_diff_slices};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, serde::Serialize, serde::Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiffKind {
    Equal,
    Delete,
    Insert,
}

/// One span of a word-level comparison. Never empty when produced by [`diff`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DiffOperation {
    pub kind: DiffKind,
    pub tokens: Vec<String>,
}

impl DiffOperation {
    pub fn text(&self) -> String {
        self.tokens.join(" ")
    }
}

/// Whitespace tokenization. Punctuation stays attached to its word.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Minimal ordered edit script from `original` to `corrected`.
///
/// A replaced run comes out as a `Delete` span immediately followed by an
/// `Insert` span; deletions always precede insertions at the same position.
pub fn diff(original: &str, corrected: &str) -> Vec<DiffOperation> {
    let old = tokenize(original);
    let new = tokenize(corrected);

    let mut spans = SpanBuilder::default();
    for op in capture_diff_slices(Algorithm::Myers, &old, &new) {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        match tag {
            DiffTag::Equal => spans.equal(&old[old_range]),
            DiffTag::Delete => spans.delete(&old[old_range]),
            DiffTag::Insert => spans.insert(&new[new_range]),
            DiffTag::Replace => {
                spans.delete(&old[old_range]);
                spans.insert(&new[new_range]);
            }
        }
    }
    spans.finish()
}

/// Joins spans for display: one space between tokens and between spans,
/// none between a deletion and the insertion that replaces it.
pub fn join_spans(operations: &[DiffOperation]) -> String {
    let mut joined = String::new();
    let mut previous = None;
    for op in operations.iter().filter(|op| !op.tokens.is_empty()) {
        if needs_separator(previous, op.kind) {
            joined.push(' ');
        }
        joined.push_str(&op.text());
        previous = Some(op.kind);
    }
    joined
}

pub(crate) fn needs_separator(previous: Option<DiffKind>, next: DiffKind) -> bool {
    match previous {
        None => false,
        Some(DiffKind::Delete) => next != DiffKind::Insert,
        Some(_) => true,
    }
}

/// Buffers changed tokens between equal runs so adjacent changes collapse
/// into at most one delete span followed by one insert span.
#[derive(Default)]
struct SpanBuilder {
    operations: Vec<DiffOperation>,
    deleted: Vec<String>,
    inserted: Vec<String>,
}

impl SpanBuilder {
    fn equal(&mut self, tokens: &[&str]) {
        self.flush_changes();
        if tokens.is_empty() {
            return;
        }
        match self.operations.last_mut() {
            Some(last) if last.kind == DiffKind::Equal => {
                last.tokens.extend(tokens.iter().map(|t| t.to_string()));
            }
            _ => self.push(DiffKind::Equal, tokens.iter().map(|t| t.to_string()).collect()),
        }
    }

    fn delete(&mut self, tokens: &[&str]) {
        self.deleted.extend(tokens.iter().map(|t| t.to_string()));
    }

    fn insert(&mut self, tokens: &[&str]) {
        self.inserted.extend(tokens.iter().map(|t| t.to_string()));
    }

    fn flush_changes(&mut self) {
        let deleted = std::mem::take(&mut self.deleted);
        let inserted = std::mem::take(&mut self.inserted);
        self.push(DiffKind::Delete, deleted);
        self.push(DiffKind::Insert, inserted);
    }

    fn push(&mut self, kind: DiffKind, tokens: Vec<String>) {
        if !tokens.is_empty() {
            self.operations.push(DiffOperation { kind, tokens });
        }
    }

    fn finish(mut self) -> Vec<DiffOperation> {
        self.flush_changes();
        self.operations
    }
}
