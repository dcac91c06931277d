use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("file not found: {0}")]
    NotFound(PathBuf),
    #[error("unsupported document format: {0} (expected .docx or .json)")]
    UnsupportedFormat(PathBuf),
    #[error("document part missing: {0}")]
    MissingPart(&'static str),
    #[error("invalid color value: {0}")]
    InvalidColor(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),
}
