mod apply;
mod cache;
mod command;
mod env;
mod error;
mod gateway;
mod orchestrator;
mod prompt;
mod result;

pub use apply::apply_results;
pub use cache::{CacheFile, CacheMetadata, EditCache, JsonFileCache, MemoryCache, cache_path_for};
pub use command::CommandCorrector;
pub use env::CorrectionEnv;
pub use error::*;
pub use gateway::*;
pub use orchestrator::*;
pub use prompt::*;
pub use result::CorrectionResult;
