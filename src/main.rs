// src/main.rs

mod cli;
mod error;
mod extractor;
mod model;
mod repository;
mod writer;

#[cfg(test)]
mod test_support;

use clap::Parser;
use cli::Args;
use error::Result;
use extractor::Extractor;
use indicatif::ProgressBar;
use model::ExtractionSummary;
use repository::GitHistory;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);
    let start_time = Instant::now();

    match run(&args) {
        Ok(summary) => {
            println!(
                "Scan finished in {:.2?}. {} of {} commits matched, {} files extracted.",
                start_time.elapsed(),
                summary.commits_matched,
                summary.commits_scanned,
                summary.files_written
            );
            if summary.root_commits_skipped > 0 || summary.binary_skipped > 0 {
                println!(
                    "Skipped {} root commits and {} binary files.",
                    summary.root_commits_skipped, summary.binary_skipped
                );
            }
        }
        Err(e) => {
            eprintln!("Error extracting commits: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(args: &Args) -> Result<ExtractionSummary> {
    let config = args.resolve()?;
    let history = GitHistory::resolve(&config.repo, &config.clone_dir)?;

    let bar = ProgressBar::new_spinner();
    bar.enable_steady_tick(Duration::from_millis(120));

    Extractor::new(&history, config.keywords, config.extensions, config.layout)
        .with_options(config.options)
        .with_progress(bar)
        .run()
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();
}
