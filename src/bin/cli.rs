//! presswatch CLI
//!
//! Runs watch cycles from an external trigger (cron or by hand). One `cycle`
//! invocation schedules the frontpage crawls and the staleness sweep, then
//! drains the queue with the in-process burst worker.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use presswatch::{
    config::Config,
    context::JobContext,
    error::Result,
    pipeline, queue,
    queue::MemoryQueue,
    services::WebhookNotifier,
    storage::{LocalStore, RevisionStore},
    utils::http,
};

/// presswatch - Newspaper Headline Watcher
#[derive(Parser, Debug)]
#[command(
    name = "presswatch",
    version,
    about = "Watches newspaper frontpages for significant headline changes"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "presswatch.toml")]
    config: PathBuf,

    /// Directory holding persisted revision state
    #[arg(short, long, default_value = "state")]
    state_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one watch cycle: crawl all sites, sweep stale revisions
    Cycle,

    /// Validate the configuration file
    Validate,

    /// Show stored state info
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);

    match cli.command {
        Command::Cycle => {
            config.validate()?;
            if config.sites.is_empty() {
                log::warn!("no sites configured, nothing to watch");
                return Ok(());
            }

            let config = Arc::new(config);
            let store = Arc::new(LocalStore::open(&cli.state_dir).await?);
            let queue_handle = Arc::new(MemoryQueue::new());
            let notifier = Arc::new(WebhookNotifier::new(http::create_client(&config.crawler)?));

            let ctx = JobContext::new(
                Arc::clone(&config),
                queue_handle.clone(),
                store.clone(),
                store.clone(),
                notifier,
            )?;

            pipeline::run_cycle(&ctx).await?;
            let stats = queue::run_burst(&ctx, &queue_handle).await;

            log::info!(
                "cycle complete: {} jobs executed, {} failed, {} articles tracked",
                stats.executed,
                stats.failed,
                store.revision_count().await?
            );
        }

        Command::Validate => {
            log::info!("Validating configuration from {}", cli.config.display());

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!(
                "✓ Config OK ({} sites, {} with notification credentials)",
                config.sites.len(),
                config
                    .sites
                    .iter()
                    .filter(|s| s.notify_credentials().is_some())
                    .count()
            );
        }

        Command::Info => {
            log::info!("State directory: {}", cli.state_dir.display());
            let store = LocalStore::open(&cli.state_dir).await?;
            log::info!("Tracked articles: {}", store.revision_count().await?);
            log::info!("Configured sites: {}", config.sites.len());
        }
    }

    Ok(())
}
