use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use tafsir_classifier::{Block, classify_document, scripture_blocks};
use tafsir_correction::{
    BlockState, CommandCorrector, CorrectionEnv, EditCache, JsonFileCache, MemoryCache,
    Orchestrator, Progress, RetryingGateway, RunReport, RunStatus, apply_results, cache_path_for,
};
use tafsir_document::{document_identity, load_paragraphs};
use tafsir_word_diff::MarkupRenderer;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::output::{EditsFile, default_edits_path, preview};

const SAMPLE_CHANGES: usize = 3;

#[derive(clap::Args)]
pub struct Args {
    /// A .docx document or a .json paragraph dump
    pub file: PathBuf,
    /// Show what would change without writing the edits file
    #[arg(long)]
    pub dry_run: bool,
    /// Process only the first N eligible blocks
    #[arg(long)]
    pub max_blocks: Option<usize>,
    /// Keep results in memory only
    #[arg(long)]
    pub no_cache: bool,
    /// Delete the checkpoint before starting
    #[arg(long)]
    pub clear_cache: bool,
    /// Where to write the rendered edits (default: <stem>_edits.json)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub async fn run(args: Args) -> Result<ExitCode> {
    let env = CorrectionEnv::load()?;
    let corrector = CommandCorrector::from_env(&env)?;
    let gateway = RetryingGateway::new(corrector, env.retry_policy());

    let paragraphs = load_paragraphs(&args.file)?;
    let blocks = classify_document(&paragraphs);
    let scripture: Vec<usize> = scripture_blocks(&blocks).map(|block| block.index).collect();

    let cache_path = cache_path_for(&args.file, env.cache_dir.as_deref());
    if args.clear_cache && JsonFileCache::remove(&cache_path)? {
        println!("Cache cleared: {}", cache_path.display());
    }

    println!("Input:  {}", args.file.display());
    println!("Model:  {}", env.model);
    if args.no_cache {
        println!("Cache:  disabled");
    } else {
        println!("Cache:  {}", cache_path.display());
    }
    if args.dry_run {
        println!("Mode:   dry run (no edits file is written)");
    }
    println!();

    let cancellation = CancellationToken::new();
    tokio::spawn({
        let cancellation = cancellation.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("Interrupted, finishing the current block...");
                cancellation.cancel();
            }
        }
    });

    let max_blocks = args.max_blocks;
    let report = if args.no_cache {
        let cache = MemoryCache::new();
        tokio::task::spawn_blocking(move || {
            correct(gateway, cache, blocks, max_blocks, cancellation)
        })
        .await??
    } else {
        let cache = JsonFileCache::open(&cache_path, &document_identity(&args.file), &env.model);
        tokio::task::spawn_blocking(move || {
            correct(gateway, cache, blocks, max_blocks, cancellation)
        })
        .await??
    };

    let summary = report.summary;
    println!();
    println!(
        "Processed: {}, Changed: {}, Unchanged: {}, From cache: {}",
        summary.processed, summary.changed, summary.unchanged, summary.cached
    );

    if !args.dry_run && summary.changed > 0 {
        let path = args
            .output
            .clone()
            .unwrap_or_else(|| default_edits_path(&args.file));
        let mut edits = EditsFile::new(
            args.file.display().to_string(),
            env.model.clone(),
            scripture,
        );
        let Ok(applied) = apply_results(&mut edits, &report.results);
        edits.write(&path)?;
        tracing::info!(path = %path.display(), applied, "edits_written");
        println!("Wrote {applied} paragraphs with visual diff to {}", path.display());
    }

    print_samples(&report);

    Ok(finish(&report.status))
}

fn finish(status: &RunStatus) -> ExitCode {
    match *status {
        RunStatus::Completed => ExitCode::SUCCESS,
        RunStatus::Interrupted => {
            tracing::info!("run_interrupted");
            println!("Interrupted. Run the same command again to resume.");
            ExitCode::SUCCESS
        }
        RunStatus::Halted { block_index } => {
            tracing::warn!(block_index, "run_halted");
            eprintln!(
                "Stopped at block #{block_index} after repeated failures. \
                 Run the same command again to resume."
            );
            ExitCode::FAILURE
        }
    }
}

fn correct<C: EditCache>(
    gateway: RetryingGateway<CommandCorrector>,
    cache: C,
    blocks: Vec<Block>,
    max_blocks: Option<usize>,
    cancellation: CancellationToken,
) -> tafsir_correction::Result<RunReport> {
    let eligible: Vec<_> = blocks.iter().filter_map(Block::as_eligible).collect();
    println!("Found {} blocks for correction", eligible.len());

    Orchestrator::new(gateway, cache)
        .with_max_blocks(max_blocks)
        .with_cancellation(cancellation)
        .run(&eligible, print_progress)
}

fn print_progress(progress: Progress<'_>) {
    let prefix = format!(
        "  [{}/{}] Processing {} block #{}",
        progress.position, progress.total, progress.block_type, progress.block_index
    );
    match progress.state {
        BlockState::Cached(_) => println!("{prefix}... cached"),
        BlockState::InFlight => {
            print!("{prefix}... ");
            let _ = std::io::stdout().flush();
        }
        BlockState::Done(result) if result.changed => println!("CHANGED"),
        BlockState::Done(result) if result.unchanged_by_gateway => println!("unchanged"),
        BlockState::Done(_) => println!("no changes"),
        BlockState::Failed(result) => {
            println!("ERROR: {}", result.failure.as_deref().unwrap_or("unknown"))
        }
    }
}

fn print_samples(report: &RunReport) {
    let mut markup = MarkupRenderer::new();
    let Ok(changed) = apply_results(&mut markup, &report.results);
    if changed == 0 {
        return;
    }

    println!();
    println!("Sample changes:");
    for (block_index, text) in markup.iter().take(SAMPLE_CHANGES) {
        println!("  #{block_index}: {}", preview(text, 200));
    }
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;

    #[test]
    #[traced_test]
    fn halted_run_fails_and_is_logged() {
        assert_eq!(finish(&RunStatus::Halted { block_index: 7 }), ExitCode::FAILURE);
        assert!(logs_contain("run_halted"));
        assert!(logs_contain("block_index=7"));
    }

    #[test]
    #[traced_test]
    fn interrupted_run_succeeds_and_is_logged() {
        assert_eq!(finish(&RunStatus::Interrupted), ExitCode::SUCCESS);
        assert!(logs_contain("run_interrupted"));
    }

    #[test]
    #[traced_test]
    fn completed_run_succeeds_quietly() {
        assert_eq!(finish(&RunStatus::Completed), ExitCode::SUCCESS);
        assert!(!logs_contain("run_halted"));
    }
}
