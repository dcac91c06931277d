use std::path::PathBuf;
use std::process::ExitCode;

use tafsir_correction::{CacheFile, CorrectionEnv, JsonFileCache, cache_path_for};

use crate::error::Result;

#[derive(clap::Subcommand)]
pub enum Action {
    /// Summarize the checkpoint of a document
    Show { file: PathBuf },
    /// Delete the checkpoint of a document
    Clear { file: PathBuf },
}

pub fn run(action: Action) -> Result<ExitCode> {
    let env = CorrectionEnv::load()?;

    match action {
        Action::Show { file } => {
            let path = cache_path_for(&file, env.cache_dir.as_deref());
            let Some(cache) = CacheFile::read(&path) else {
                println!("No cache at {}", path.display());
                return Ok(ExitCode::SUCCESS);
            };

            let results = cache.results.values();
            let failed = results.clone().filter(|r| r.is_failed()).count();
            let changed = results.clone().filter(|r| r.changed).count();
            let unchanged = results.filter(|r| r.unchanged_by_gateway).count();
            let metadata = &cache.metadata;

            println!("Cache:    {}", path.display());
            println!("Document: {}", metadata.document_identity);
            println!("Model:    {}", metadata.model_identity);
            println!("Created:  {}", metadata.created_at.to_rfc3339());
            println!("Updated:  {}", metadata.last_updated_at.to_rfc3339());
            println!(
                "Results:  {} of {} eligible blocks ({changed} changed, {unchanged} unchanged, {failed} failed)",
                cache.results.len(),
                metadata.total_eligible_blocks
            );
        }
        Action::Clear { file } => {
            let path = cache_path_for(&file, env.cache_dir.as_deref());
            if JsonFileCache::remove(&path)? {
                println!("Cache cleared: {}", path.display());
            } else {
                println!("No cache at {}", path.display());
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
