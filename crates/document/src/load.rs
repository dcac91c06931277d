use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::{Error, Paragraph, Result, load_docx};

/// Loads the paragraph stream of a `.docx` document or of a `.json` paragraph dump.
pub fn load_paragraphs(path: &Path) -> Result<Vec<Paragraph>> {
    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("docx") => load_docx(path),
        Some("json") => load_json(path),
        _ => Err(Error::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Paragraphs are re-indexed by position so the stream is always dense and ordered.
pub fn load_json(path: &Path) -> Result<Vec<Paragraph>> {
    let reader = BufReader::new(File::open(path)?);
    let mut paragraphs: Vec<Paragraph> = serde_json::from_reader(reader)?;
    for (index, paragraph) in paragraphs.iter_mut().enumerate() {
        if paragraph.index != index {
            tracing::warn!(
                expected = index,
                found = paragraph.index,
                "paragraph_index_reassigned"
            );
            paragraph.index = index;
        }
    }
    Ok(paragraphs)
}

/// Identity recorded in checkpoint metadata: the canonical path when it can
/// be resolved, the path as given otherwise.
pub fn document_identity(path: &Path) -> String {
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}
