// src/main.rs
mod crawler;
mod extractors;
mod report;
mod storage;
mod utils;

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};

use crawler::client::{HttpSource, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use crawler::Crawler;
use extractors::{ExtractorConfig, OpportunityExtractor};
use report::{AnalysisReport, CrawlSummary};
use storage::StorageManager;
use utils::AppError;

/// Command Line Interface for the opportunity crawler
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl every URL in a list and export the opportunities found
    Crawl {
        /// File with one URL per line
        #[arg(short, long, default_value = "urls.txt")]
        urls: PathBuf,

        /// Output directory for results
        #[arg(short, long, default_value = "./output")]
        output_dir: PathBuf,

        /// Pause between pages, in milliseconds
        #[arg(long, default_value_t = 1000)]
        delay_ms: u64,

        /// Per-request timeout, in seconds
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout_secs: u64,

        /// User-Agent header sent with every request
        #[arg(long, default_value = DEFAULT_USER_AGENT)]
        user_agent: String,

        /// JSON file overriding extractor selectors and limits
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Debug mode - save raw and annotated HTML for every page
        #[arg(short, long)]
        debug: bool,
    },

    /// Print an analysis report for a results file
    Analyze {
        /// Results CSV (defaults to the newest one in the output directory)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Output directory searched for results
        #[arg(short, long, default_value = "./output")]
        output_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::debug!("Starting with args: {:?}", args);

    match args.command {
        Command::Crawl { urls, output_dir, delay_ms, timeout_secs, user_agent, config, debug } => {
            run_crawl(&urls, &output_dir, delay_ms, timeout_secs, &user_agent, config.as_deref(), debug).await
        }
        Command::Analyze { file, output_dir } => run_analyze(file, &output_dir),
    }
}

async fn run_crawl(
    urls_path: &Path,
    output_dir: &Path,
    delay_ms: u64,
    timeout_secs: u64,
    user_agent: &str,
    config_path: Option<&Path>,
    debug: bool,
) -> Result<(), AppError> {
    let urls = storage::load_urls(urls_path)?;
    if urls.is_empty() {
        return Err(AppError::Config(format!("No URLs found in {}", urls_path.display())));
    }

    let extractor = match config_path {
        Some(path) => OpportunityExtractor::with_config(load_extractor_config(path)?),
        None => OpportunityExtractor::new(),
    };
    tracing::debug!("Extractor config: {:?}", extractor.config());

    let storage = StorageManager::new(output_dir)?;
    let source = HttpSource::new(user_agent, Duration::from_secs(timeout_secs))?;

    let mut crawler = Crawler::new(source, extractor, Duration::from_millis(delay_ms));
    if debug {
        crawler = crawler.with_debug_dir(storage.base_dir().join("debug"));
    }

    tracing::info!("Starting to crawl {} websites for opportunities...", urls.len());
    let rows = crawler.crawl(&urls).await;

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
    let summary = CrawlSummary::from_rows(&rows, urls.len());

    match storage.save_results(&rows, &timestamp) {
        Ok(path) => tracing::info!("Crawl complete! {} rows saved to {}", rows.len(), path.display()),
        Err(e) => tracing::error!("Error saving CSV file: {}", e),
    }
    if let Err(e) = storage.save_run_metadata(&summary, &timestamp) {
        tracing::error!("Failed to save run metadata: {}", e);
    }

    summary.log();

    let failures = rows.iter().filter(|r| r.is_error()).count();
    if failures == urls.len() {
        return Err(AppError::Processing(format!("All {} pages failed to load", failures)));
    }
    Ok(())
}

fn run_analyze(file: Option<PathBuf>, output_dir: &Path) -> Result<(), AppError> {
    let path = match file {
        Some(path) => path,
        None => StorageManager::new(output_dir)?.latest_results_file()?,
    };
    tracing::info!("Analyzing results from {}", path.display());

    let rows = storage::load_results(&path)?;
    let generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let report = AnalysisReport::new(&rows, &path.display().to_string(), &generated_at);

    println!("{}", report.render());
    Ok(())
}

fn load_extractor_config(path: &Path) -> Result<ExtractorConfig, AppError> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| AppError::Config(format!("Invalid extractor config {}: {}", path.display(), e)))
}
