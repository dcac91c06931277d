use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to write cache {path}: {source}")]
    Cache {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Config(#[from] envy::Error),
    #[error("{0} is not set")]
    MissingConfig(&'static str),
}

impl Error {
    pub(crate) fn cache(path: impl Into<PathBuf>, source: impl Into<std::io::Error>) -> Self {
        Self::Cache {
            path: path.into(),
            source: source.into(),
        }
    }
}
