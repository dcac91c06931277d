use std::path::PathBuf;
use std::process::ExitCode;

use tafsir_classifier::{Block, BlockType, DocumentStats, classify_document};
use tafsir_document::load_paragraphs;

use crate::error::Result;
use crate::output::preview;

#[derive(clap::Args)]
pub struct Args {
    /// A .docx document or a .json paragraph dump
    pub file: PathBuf,
    /// Print blocks and statistics as JSON
    #[arg(long)]
    pub json: bool,
    /// Rows shown in the table
    #[arg(long, default_value_t = 50)]
    pub limit: usize,
}

#[derive(serde::Serialize)]
struct ClassificationReport<'a> {
    blocks: &'a [Block],
    stats: &'a DocumentStats,
}

pub fn run(args: Args) -> Result<ExitCode> {
    let paragraphs = load_paragraphs(&args.file)?;
    let blocks = classify_document(&paragraphs);
    let stats = DocumentStats::of(&blocks);

    if args.json {
        let report = ClassificationReport {
            blocks: &blocks,
            stats: &stats,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(ExitCode::SUCCESS);
    }

    print_table(&blocks, args.limit);
    print_summary(&args.file, &stats);
    Ok(ExitCode::SUCCESS)
}

fn print_table(blocks: &[Block], limit: usize) {
    let visible: Vec<&Block> = blocks
        .iter()
        .filter(|block| block.block_type != BlockType::Empty)
        .collect();

    println!("{:>5}  {:<11}  {:<23}  {:>5}  TEXT", "#", "TYPE", "REASON", "AR%");
    for block in visible.iter().take(limit) {
        println!(
            "{:>5}  {:<11}  {:<23}  {:>5.1}  {}",
            block.index,
            block.block_type.to_string(),
            block.reason.to_string(),
            block.script_ratio * 100.0,
            preview(&block.text, 60)
        );
    }
    if visible.len() > limit {
        println!("  ... {} more", visible.len() - limit);
    }
}

fn print_summary(file: &std::path::Path, stats: &DocumentStats) {
    println!();
    println!("Blocks: {} ({} empty)", stats.total_blocks, stats.empty_blocks);
    for (block_type, count) in stats.by_type.iter().filter(|(_, count)| **count > 0) {
        println!("  {:<11} {count}", block_type.to_string());
    }
    println!();
    println!(
        "Protected: {} scripture blocks",
        stats.count(BlockType::Scripture)
    );
    println!(
        "Eligible for correction: {} blocks, {} words",
        stats.eligible_blocks, stats.eligible_words
    );
    println!();
    println!("To correct: tafsir edit {}", file.display());
}
