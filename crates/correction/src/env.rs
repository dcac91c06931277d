use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::{Error, Result, RetryPolicy};

const PREFIX: &str = "TAFSIR_";

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_retry_attempts() -> usize {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    1000
}

fn default_retry_max_delay_ms() -> u64 {
    30_000
}

/// Process configuration, read once at startup and passed down explicitly.
#[derive(Debug, Clone, Deserialize)]
pub struct CorrectionEnv {
    #[serde(default, deserialize_with = "filter_empty")]
    pub corrector_command: Option<String>,
    #[serde(default)]
    pub corrector_args: Vec<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: usize,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
    #[serde(default, deserialize_with = "filter_empty_path")]
    pub cache_dir: Option<PathBuf>,
}

impl CorrectionEnv {
    /// Reads `TAFSIR_*` variables, after loading `.env` from the working
    /// directory when one exists.
    pub fn load() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "dotenv_loaded");
        }
        Ok(envy::prefixed(PREFIX).from_env::<Self>()?)
    }

    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::prefixed(PREFIX).from_iter::<_, Self>(vars)?)
    }

    pub fn corrector_command(&self) -> Result<&str> {
        self.corrector_command
            .as_deref()
            .ok_or(Error::MissingConfig("TAFSIR_CORRECTOR_COMMAND"))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry_attempts.max(1),
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
            max_delay: Duration::from_millis(self.retry_max_delay_ms),
            jitter: true,
        }
    }
}

fn filter_empty<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

fn filter_empty_path<'de, D>(deserializer: D) -> std::result::Result<Option<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(filter_empty(deserializer)?.map(PathBuf::from))
}
