mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tafsir",
    version,
    about = "Classify and proof-read bilingual (Arabic/Russian) tafsir documents"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify every paragraph and report what may be corrected
    Classify(commands::classify::Args),
    /// Correct eligible paragraphs and render the changes as a word diff
    Edit(commands::edit::Args),
    /// Inspect or remove the checkpoint of a document
    Cache {
        #[command(subcommand)]
        action: commands::cache::Action,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Classify(args) => commands::classify::run(args),
        Command::Edit(args) => commands::edit::run(args).await,
        Command::Cache { action } => commands::cache::run(action),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
