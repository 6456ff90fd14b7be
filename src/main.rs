//! Contact-Sweep main entry point
//!
//! This is the command-line interface for the Contact-Sweep contact harvester.

use clap::Parser;
use contact_sweep::config::{collect_seeds, load_config_with_hash, Config};
use contact_sweep::crawler::run_sweep;
use contact_sweep::output::{print_summary, RunSummary, SinkOutcome};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Contact-Sweep: a proximity-based contact harvester
///
/// Contact-Sweep drains a self-growing set of web pages reached from seed
/// URLs, extracts phone numbers, emails and names that appear together, and
/// writes a cleaned, deduplicated CSV of contacts.
#[derive(Parser, Debug)]
#[command(name = "contact-sweep")]
#[command(version)]
#[command(about = "A proximity-based contact harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Additional seed file (one URL per line); may be repeated
    #[arg(long = "seeds", value_name = "FILE")]
    seed_files: Vec<PathBuf>,

    /// Write the CSV here instead of the dated path under results-dir
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the seeds without fetching anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let seeds = collect_seeds(&config, &cli.seed_files)?;
    tracing::info!("Total seed URLs: {}", seeds.len());

    if cli.dry_run {
        handle_dry_run(&config, &seeds);
    } else {
        handle_sweep(config, seeds, cli.output).await?;
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
            0 => EnvFilter::new("contact_sweep=info,warn"),
            1 => EnvFilter::new("contact_sweep=debug,info"),
            2 => EnvFilter::new("contact_sweep=trace,debug"),
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

/// Handles the --dry-run mode: shows the resolved configuration and seeds
fn handle_dry_run(config: &Config, seeds: &[String]) {
    println!("=== Contact-Sweep Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Workers: {}", config.crawler.worker_capacity());
    println!("  Task timeout: {}s", config.crawler.task_timeout);
    println!("  Progress interval: {}", config.crawler.progress_interval);
    println!("  Max block chars: {}", config.crawler.max_block_chars);

    println!("\nFetcher:");
    println!("  Request timeout: {}s", config.fetcher.request_timeout);
    println!(
        "  Retries: {} ({}ms apart)",
        config.fetcher.max_retries, config.fetcher.retry_delay
    );
    println!("  Respect robots.txt: {}", config.fetcher.respect_robots);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nCleaning:");
    println!("  Phone region: {}", config.cleaning.region);

    println!("\nOutput:");
    println!("  Results dir: {}", config.output.results_dir);
    println!("  Label: {}", config.output.label);

    println!("\nExcluded Hosts ({}):", config.seeds.exclude.len());
    for pattern in &config.seeds.exclude {
        println!("  - {}", pattern);
    }

    println!("\nSeeds ({}):", seeds.len());
    for seed in seeds {
        println!("  * {}", seed);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would start sweeping with {} seed URLs", seeds.len());
}

/// Handles the main sweep operation
async fn handle_sweep(
    config: Config,
    seeds: Vec<String>,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let outcome = match run_sweep(config, &seeds, output.as_deref()).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Sweep failed: {}", e);
            return Err(e.into());
        }
    };

    println!();
    print_summary(&RunSummary::from_report(&outcome.report));

    match &outcome.sink {
        SinkOutcome::Written { path, rows } => {
            println!("\n✓ {} contacts written to: {}", rows, path.display());
        }
        SinkOutcome::NoData => println!("\nNo contact information found; no CSV written"),
    }

    Ok(())
}
