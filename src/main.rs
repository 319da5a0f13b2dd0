//! Gossamer main entry point
//!
//! This is the command-line interface for the Gossamer focused crawler.

use clap::Parser;
use gossamer::config::load_config;
use gossamer::crawler::run_job;
use gossamer::storage::{SqliteStorage, Storage};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

/// Gossamer: a focused web crawler
///
/// Gossamer crawls the sites a job's allow list confines it to, keeps
/// snapshots of the pages it fetches, and records every dead link and
/// downloadable file it finds along the way.
#[derive(Parser, Debug)]
#[command(name = "gossamer")]
#[command(version = "0.1.0")]
#[command(about = "A focused web crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with_all = ["list_jobs", "list_dead_links", "list_file_links"])]
    dry_run: bool,

    /// List recorded jobs and exit
    #[arg(long, conflicts_with_all = ["dry_run", "list_dead_links", "list_file_links"])]
    list_jobs: bool,

    /// List recorded dead links and exit
    #[arg(long, conflicts_with_all = ["dry_run", "list_jobs", "list_file_links"])]
    list_dead_links: bool,

    /// List recorded file links and exit
    #[arg(long, conflicts_with_all = ["dry_run", "list_jobs", "list_dead_links"])]
    list_file_links: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.list_jobs {
        handle_list_jobs(&config)?;
    } else if cli.list_dead_links {
        handle_list_dead_links(&config)?;
    } else if cli.list_file_links {
        handle_list_file_links(&config)?;
    } else {
        handle_crawl(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("gossamer=info,warn"),
            1 => EnvFilter::new("gossamer=debug,info"),
            2 => EnvFilter::new("gossamer=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &gossamer::config::Config) {
    println!("=== Gossamer Dry Run ===\n");

    println!("Service:");
    println!("  Database: {}", config.service.database_path);
    println!("  User agent: {}", config.service.user_agent);

    println!("\nJobs ({}):", config.jobs.len());
    for job in &config.jobs {
        println!("  - {}", job.name);
        println!("    Allowed domains: {}", job.allowed_domains.join(", "));
        if !job.denied_domains.is_empty() {
            println!("    Denied domains: {}", job.denied_domains.join(", "));
        }
        for seed in &job.seed_urls {
            println!("    * {}", seed);
        }
        println!("    Revisiting: {}", job.revisiting);
        println!("    Crawl delay: {}ms", job.crawl_delay_ms);
        if job.max_pages > 0 {
            println!("    Page budget: {}", job.max_pages);
        } else {
            println!("    Page budget: unlimited");
        }
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would start {} crawl job(s)", config.jobs.len());
}

fn open_storage(config: &gossamer::config::Config) -> anyhow::Result<SqliteStorage> {
    Ok(SqliteStorage::new(Path::new(
        &config.service.database_path,
    ))?)
}

/// Handles the --list-jobs mode
fn handle_list_jobs(config: &gossamer::config::Config) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let jobs = storage.list_jobs()?;

    println!("Jobs ({}):", jobs.len());
    for job in jobs {
        println!(
            "  {} [{}] pages={} started={} finished={}",
            job.unique_name,
            job.status,
            job.crawled_pages,
            job.started_at.as_deref().unwrap_or("-"),
            job.finished_at.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

/// Handles the --list-dead-links mode
fn handle_list_dead_links(config: &gossamer::config::Config) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let links = storage.list_dead_links()?;

    println!("Dead links ({}):", links.len());
    for link in links {
        println!("  {} (last crawled {})", link.url, link.last_crawled_at);
    }
    Ok(())
}

/// Handles the --list-file-links mode
fn handle_list_file_links(config: &gossamer::config::Config) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let links = storage.list_file_links()?;

    println!("File links ({}):", links.len());
    for link in links {
        println!("  {} [{}]", link.url, link.extension);
    }
    Ok(())
}

/// Handles the main crawl operation: one task per configured job
async fn handle_crawl(config: gossamer::config::Config) -> anyhow::Result<()> {
    let storage = Arc::new(Mutex::new(open_storage(&config)?));

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, finishing current cycles");
            let _ = shutdown_tx.send(true);
        }
    });

    tracing::info!("Starting {} crawl job(s)", config.jobs.len());

    let mut handles = Vec::new();
    for spec in config.jobs {
        let storage = storage.clone();
        let user_agent = config.service.user_agent.clone();
        let shutdown = shutdown_rx.clone();
        handles.push(tokio::spawn(async move {
            run_job(&spec, &user_agent, storage, shutdown).await
        }));
    }

    let mut failures = 0;
    for handle in handles {
        match handle.await? {
            Ok(outcome) => {
                println!(
                    "{}: {} page(s) crawled, {} dead link(s), {} URL(s) left in frontier",
                    outcome.unique_name,
                    outcome.crawled_pages,
                    outcome.dead_links.len(),
                    outcome.frontier_remaining.len(),
                );
            }
            Err(e) => {
                tracing::error!("Crawl job failed: {}", e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} crawl job(s) failed", failures);
    }
    Ok(())
}
