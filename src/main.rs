//! Rank-Scout main entry point
//!
//! This is the command-line interface for the Rank-Scout keyword rank tracker.

use anyhow::{bail, Context};
use clap::Parser;
use rank_scout::config::{load_config_with_hash, Config, FetchMode};
use rank_scout::fetch::build_fetch_client;
use rank_scout::output::{load_statistics, print_statistics, status_line};
use rank_scout::storage::{self, ResultStore, SqliteStore};
use rank_scout::{RankService, SubmissionStatus};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Rank-Scout: keyword rank tracking for marketplace listings
///
/// Rank-Scout finds where a product, or any of its variants, ranks in the
/// search results for a keyword, and records whether the slot was organic or
/// sponsored.
#[derive(Parser, Debug)]
#[command(name = "rank-scout")]
#[command(version)]
#[command(about = "Keyword rank tracker for marketplace listings", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// ASIN to track (pair each with --keyword)
    #[arg(long = "track", value_name = "ASIN")]
    track: Vec<String>,

    /// Search keyword for the matching --track
    #[arg(long = "keyword", value_name = "KEYWORD")]
    keyword: Vec<String>,

    /// File of `ASIN,keyword` lines to track
    #[arg(long, value_name = "FILE")]
    batch: Option<PathBuf>,

    /// Print the stored result for an ASIN and exit
    #[arg(long, value_name = "ASIN", conflicts_with_all = ["stats", "dry_run"])]
    result: Option<String>,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "result"])]
    stats: bool,

    /// Validate config and submissions without fetching anything
    #[arg(long, conflicts_with_all = ["stats", "result"])]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

/// One requested (ASIN, keyword) pair
#[derive(Debug, Clone, PartialEq, Eq)]
struct Submission {
    asin: String,
    keyword: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .inspect_err(|e| tracing::error!("Failed to load configuration: {}", e))?;
    tracing::info!(%hash, "Configuration loaded");

    if cli.stats {
        handle_stats(&config)?;
    } else if let Some(asin) = &cli.result {
        handle_result(&config, asin)?;
    } else {
        let submissions = collect_submissions(&cli)?;
        if cli.dry_run {
            handle_dry_run(&config, &submissions);
        } else {
            handle_track(&config, submissions).await?;
        }
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("rank_scout=info,warn"),
            1 => EnvFilter::new("rank_scout=debug,info"),
            2 => EnvFilter::new("rank_scout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Gathers submissions from `--track/--keyword` pairs and the batch file
fn collect_submissions(cli: &Cli) -> anyhow::Result<Vec<Submission>> {
    if cli.track.len() != cli.keyword.len() {
        bail!(
            "every --track needs a matching --keyword (got {} ASINs, {} keywords)",
            cli.track.len(),
            cli.keyword.len()
        );
    }

    let mut submissions: Vec<Submission> = cli
        .track
        .iter()
        .zip(&cli.keyword)
        .map(|(asin, keyword)| Submission {
            asin: asin.clone(),
            keyword: keyword.clone(),
        })
        .collect();

    if let Some(path) = &cli.batch {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading batch file {}", path.display()))?;
        let batch = parse_batch(&content)
            .with_context(|| format!("parsing batch file {}", path.display()))?;
        submissions.extend(batch);
    }

    Ok(submissions)
}

/// Parses `ASIN,keyword` lines; blank lines and `#` comments are skipped
fn parse_batch(content: &str) -> anyhow::Result<Vec<Submission>> {
    let mut submissions = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((asin, keyword)) = line.split_once(',') else {
            bail!("line {}: expected `ASIN,keyword`, got {:?}", index + 1, line);
        };

        submissions.push(Submission {
            asin: asin.trim().to_string(),
            keyword: keyword.trim().to_string(),
        });
    }

    Ok(submissions)
}

fn open_store(config: &Config) -> Result<SqliteStore, Box<dyn std::error::Error>> {
    Ok(storage::open_store(Path::new(&config.output.database_path))?)
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("Database: {}\n", config.output.database_path);

    let store = open_store(config)?;
    let stats = load_statistics(&store)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --result mode: prints the stored result for one ASIN
fn handle_result(config: &Config, asin: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(config)?;
    let asin = rank_scout::Asin::parse(asin)?;

    match store.get(&asin)? {
        Some(result) => println!("{}", status_line(&SubmissionStatus::Completed { result })?),
        None => println!("No result stored for {}", asin),
    }

    Ok(())
}

/// Handles the --dry-run mode: shows what would be tracked
fn handle_dry_run(config: &Config, submissions: &[Submission]) {
    println!("=== Rank-Scout Dry Run ===\n");

    println!("Queue:");
    println!("  Workers: {}", config.queue.worker_count);
    println!("  Requests per minute: {}", config.queue.requests_per_minute);
    println!("  Stop policy: {:?}", config.queue.stop_policy);

    println!("\nSearch:");
    println!("  Marketplace: {}", config.search.marketplace_url);
    println!(
        "  Page delay: {}-{}ms",
        config.search.min_page_delay_ms, config.search.max_page_delay_ms
    );

    println!("\nFetch:");
    match (config.fetch.mode, &config.fetch.proxy) {
        (FetchMode::Proxy, Some(proxy)) => {
            println!("  Mode: proxy ({})", proxy.endpoint);
            println!("  API key variable: {}", proxy.api_key_env);
        }
        _ => println!("  Mode: direct ({})", config.fetch.user_agent),
    }
    println!("  Max retries: {}", config.fetch.max_retries);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\nSubmissions ({}):", submissions.len());
    let mut valid = 0;
    for submission in submissions {
        match rank_scout::Task::parse(&submission.asin, &submission.keyword) {
            Ok(task) => {
                valid += 1;
                println!("  - {} \"{}\"", task.asin(), task.keyword());
            }
            Err(e) => println!("  ✗ {} \"{}\": {}", submission.asin, submission.keyword, e),
        }
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would track {} of {} submissions", valid, submissions.len());
}

/// Handles the main tracking run
async fn handle_track(
    config: &Config,
    submissions: Vec<Submission>,
) -> Result<(), Box<dyn std::error::Error>> {
    if submissions.is_empty() {
        return Err("nothing to track: pass --track/--keyword pairs or --batch".into());
    }

    let fetch = build_fetch_client(&config.fetch)?;
    let store: Arc<dyn ResultStore> = Arc::new(open_store(config)?);
    let service = RankService::from_config(config, fetch, store);

    let mut accepted = Vec::new();
    for submission in &submissions {
        match service.track(&submission.asin, &submission.keyword) {
            Ok(status) => accepted.push(status),
            Err(e) => tracing::error!(
                "Rejected {} \"{}\": {}",
                submission.asin,
                submission.keyword,
                e
            ),
        }
    }

    tracing::info!(
        submitted = submissions.len(),
        accepted = accepted.len(),
        queued = service.queue().len(),
        "Submissions received"
    );

    if !service.queue().is_empty() {
        service.start(config.queue.worker_count)?;

        tokio::select! {
            _ = service.wait_drained() => tracing::info!("All tasks processed"),
            _ = tokio::signal::ctrl_c() => tracing::warn!("Interrupted, stopping workers"),
        }

        service.stop().await?;
    }

    for status in accepted {
        let current = service
            .status(status.identifier())?
            .unwrap_or(status);
        println!("{}", status_line(&current)?);
    }

    Ok(())
}
