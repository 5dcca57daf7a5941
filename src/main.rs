//! Ripple-Search main entry point
//!
//! This is the command-line interface for the Ripple-Search engine.

use anyhow::{bail, Context};
use clap::{ArgGroup, Parser};
use ripple_search::config::{load_config_with_hash, Config};
use ripple_search::jobs::ScheduleType;
use ripple_search::output::{print_index_stats, print_jobs, print_results, print_weights};
use ripple_search::SearchEngine;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Ripple-Search: a small polite web search engine
///
/// Ripple-Search crawls websites while respecting robots.txt, indexes the
/// pages it finds, and answers ranked full-text queries. Crawl jobs can be
/// scheduled to refresh the index in the background.
#[derive(Parser, Debug)]
#[command(name = "ripple-search")]
#[command(version)]
#[command(about = "A small polite web search engine", long_about = None)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .args(["crawl", "search", "suggest", "popular", "stats", "optimize", "jobs", "add_job", "remove_job", "run_job", "serve", "weights"]),
))]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Crawl and index the given URLs
    #[arg(long, requires = "urls")]
    crawl: bool,

    /// Search the index
    #[arg(long, value_name = "QUERY")]
    search: Option<String>,

    /// Suggest completions for a partial query
    #[arg(long, value_name = "PREFIX")]
    suggest: Option<String>,

    /// Show the most common title terms
    #[arg(long)]
    popular: bool,

    /// Show index statistics
    #[arg(long)]
    stats: bool,

    /// Compact the index
    #[arg(long)]
    optimize: bool,

    /// List crawl jobs
    #[arg(long)]
    jobs: bool,

    /// Add a crawl job for the given URLs
    #[arg(long, value_name = "NAME", requires = "urls")]
    add_job: Option<String>,

    /// Schedule type for --add-job: daily, weekly, hourly or manual
    #[arg(long, value_name = "TYPE", default_value = "daily")]
    schedule: ScheduleType,

    /// Time of day (HH:MM) for daily and weekly jobs
    #[arg(long, value_name = "HH:MM", default_value = "02:00")]
    at: String,

    /// Remove a crawl job
    #[arg(long, value_name = "ID")]
    remove_job: Option<u64>,

    /// Run a crawl job now and wait for it
    #[arg(long, value_name = "ID")]
    run_job: Option<u64>,

    /// Run the job scheduler until Ctrl-C
    #[arg(long)]
    serve: bool,

    /// Print the ranking weights
    #[arg(long)]
    weights: bool,

    /// Override a ranking weight for this invocation (KEY=VALUE, repeatable)
    #[arg(long = "weight", value_name = "KEY=VALUE", value_parser = parse_weight)]
    weight_overrides: Vec<(String, f64)>,

    /// Page cap for --crawl and --add-job
    #[arg(long)]
    max_pages: Option<usize>,

    /// Depth cap for --crawl and --add-job
    #[arg(long)]
    max_depth: Option<u32>,

    /// Number of results for --search, --suggest and --popular
    #[arg(long)]
    limit: Option<usize>,

    /// Return raw relevance order for --search
    #[arg(long)]
    no_ranking: bool,

    /// Show score breakdowns for --search
    #[arg(long)]
    explain: bool,

    /// Seed URLs for --crawl and --add-job
    #[arg(value_name = "URL")]
    urls: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load(&cli)?;
    let engine = SearchEngine::new(config).context("Failed to initialize search engine")?;

    if !cli.weight_overrides.is_empty() {
        let overrides: HashMap<String, f64> = cli.weight_overrides.iter().cloned().collect();
        engine.update_ranking_weights(&overrides)?;
    }

    let max_pages = cli.max_pages.unwrap_or(engine.config().crawler.max_pages);
    let max_depth = cli.max_depth.unwrap_or(engine.config().crawler.max_depth);
    let limit = cli.limit.unwrap_or(engine.config().search.default_limit);

    if cli.crawl {
        if !engine.crawl_and_index(&cli.urls, max_pages, max_depth).await {
            bail!("Crawl finished without indexing any pages");
        }
        print_index_stats(&engine.get_index_stats());
    } else if let Some(query) = &cli.search {
        let results = engine.search_with(query, limit, !cli.no_ranking);
        print_results(query, &results, cli.explain);
    } else if let Some(prefix) = &cli.suggest {
        for suggestion in engine.suggestions(prefix, limit) {
            println!("{}", suggestion);
        }
    } else if cli.popular {
        for term in engine.popular_queries(limit) {
            println!("{}", term);
        }
    } else if cli.stats {
        print_index_stats(&engine.get_index_stats());
    } else if cli.optimize {
        engine.optimize_index().await?;
        println!("Index optimized");
        print_index_stats(&engine.get_index_stats());
    } else if cli.jobs {
        print_jobs(&engine.get_crawl_jobs());
    } else if let Some(name) = &cli.add_job {
        let id = engine.add_crawl_job(
            name,
            cli.urls.clone(),
            cli.schedule,
            &cli.at,
            max_pages,
            max_depth,
        )?;
        println!("Added crawl job {}", id);
    } else if let Some(id) = cli.remove_job {
        if !engine.remove_crawl_job(id)? {
            bail!("No crawl job with ID {}", id);
        }
        println!("Removed crawl job {}", id);
    } else if let Some(id) = cli.run_job {
        match engine.scheduler().execute_job(id).await {
            Some(status) => println!("Crawl job {} finished: {}", id, status),
            None => bail!("No crawl job with ID {}", id),
        }
    } else if cli.serve {
        serve(&engine).await?;
    } else if cli.weights {
        print_weights(&engine.get_ranking_weights());
    }

    Ok(())
}

/// Loads the configuration file, or defaults when none is given
fn load(cli: &Cli) -> anyhow::Result<Config> {
    let Some(path) = &cli.config else {
        tracing::info!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}

/// Runs the scheduler until Ctrl-C, then shuts down gracefully
async fn serve(engine: &SearchEngine) -> anyhow::Result<()> {
    engine.start_scheduler();
    println!(
        "Scheduler running with {} jobs. Press Ctrl-C to stop.",
        engine.get_crawl_jobs().len()
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    tracing::info!("Shutdown requested");
    engine.shutdown().await;
    Ok(())
}

/// Parses a `KEY=VALUE` weight override
fn parse_weight(raw: &str) -> Result<(String, f64), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid weight value '{}': {}", value, e))?;
    Ok((key.trim().to_string(), value))
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("ripple_search=info,warn"),
            1 => EnvFilter::new("ripple_search=debug,info"),
            2 => EnvFilter::new("ripple_search=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
