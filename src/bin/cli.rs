//! Ticket Blaster CLI
//!
//! Local execution entry point. For AWS Lambda, use `blaster-lambda`.

use std::collections::HashMap;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ticket_blaster::{
    error::{AppError, Result},
    models::{Config, SeatSnapshot},
    notify::ConsoleNotifier,
    pipeline,
    services::{EventScraper, SeatScraper},
    storage::{LocalStore, TicketStore},
};

/// Ticket Blaster - theater ticket availability watcher
#[derive(Parser, Debug)]
#[command(name = "blaster", version, about = "Ticket site watcher")]
struct Cli {
    /// Path to storage directory containing config and data files
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sync stored events with the site listing
    Sync,

    /// Scrape activated events and report seat changes
    Watch,

    /// Print the daily status digest
    Status,

    /// Activate an event for watching
    Activate {
        /// Event name exactly as stored
        name: String,

        /// Watch only these dates (comma separated, e.g. 24/05/2023,26/05/2023)
        #[arg(long, value_delimiter = ',')]
        dates: Vec<String>,
    },

    /// Stop watching an event
    Deactivate {
        /// Event name exactly as stored
        name: String,
    },

    /// Validate the configuration file
    Validate,

    /// Show stored events and snapshot state
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

    log::info!("Ticket Blaster starting...");

    let config_path = cli.storage_dir.join("config.toml");
    let config = Config::load_or_default(&config_path);

    let store = LocalStore::new(&cli.storage_dir);
    let notifier = ConsoleNotifier::new();

    match cli.command {
        Command::Sync => {
            let outcome = pipeline::run_event_sync(&config, &store).await?;
            log::info!(
                "Sync complete: {} discovered, {} created, {} deleted",
                outcome.discovered,
                outcome.created,
                outcome.deleted
            );
        }

        Command::Watch => {
            let outcome = pipeline::run_seat_watch(&config, &store, &notifier).await?;
            if outcome.failures > 0 {
                log::warn!("{} event pages could not be fetched", outcome.failures);
            }
            log::info!(
                "Watch complete: {}/{} events scraped, {} changed",
                outcome.scraped,
                outcome.watched,
                outcome.changed
            );
        }

        Command::Status => {
            let count = pipeline::run_daily_status(&store, &notifier).await?;
            log::info!("Status digest sent for {count} events");
        }

        Command::Activate { name, dates } => {
            let mut events = store.list_events().await?;
            match events.iter_mut().find(|e| e.name == name) {
                Some(event) => {
                    event.activated = true;
                    event.included_dates = normalize_dates(&dates);
                    event.updated_at = chrono::Utc::now();
                    store.put_events(&[event.clone()]).await?;

                    if event.included_dates.is_empty() {
                        log::info!("Activated '{name}' for all dates");
                    } else {
                        log::info!(
                            "Activated '{name}' for dates: {}",
                            event.included_dates.join(", ")
                        );
                    }
                }
                None => {
                    log::error!("Event '{name}' not found. Run 'sync' first.");
                    return Err(AppError::config("Event not found"));
                }
            }
        }

        Command::Deactivate { name } => {
            let mut events = store.list_events().await?;
            match events.iter_mut().find(|e| e.name == name) {
                Some(event) => {
                    event.activated = false;
                    event.updated_at = chrono::Utc::now();
                    store.put_events(&[event.clone()]).await?;
                    log::info!("Deactivated '{name}'");
                }
                None => {
                    log::error!("Event '{name}' not found. Run 'sync' first.");
                    return Err(AppError::config("Event not found"));
                }
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {e}");
                return Err(e);
            }

            // Selectors that pass validate() can still be malformed,
            // constructing the scrapers proves they parse.
            EventScraper::new(&config)?;
            SeatScraper::new(&config)?;

            log::info!("✓ Config OK (selectors parse, site URL valid)");
        }

        Command::Info => {
            log::info!("Storage directory: {}", cli.storage_dir.display());

            let events = store.list_events().await?;
            if events.is_empty() {
                log::info!("No events stored yet. Run 'sync' first.");
            } else {
                let names: Vec<String> = events.iter().map(|e| e.name.clone()).collect();
                let snapshots = store.load_snapshots(&names).await?;
                let by_event: HashMap<&str, &SeatSnapshot> =
                    snapshots.iter().map(|s| (s.event.as_str(), s)).collect();

                for event in &events {
                    let state = if event.activated {
                        "activated"
                    } else {
                        "deactivated"
                    };
                    let snapshot = by_event
                        .get(event.name.as_str())
                        .map(|s| format!("{} slots at {}", s.items.len(), s.created_at))
                        .unwrap_or_else(|| "no snapshot".to_string());
                    log::info!("{} [{state}] - {snapshot}", event.name);
                    if !event.included_dates.is_empty() {
                        log::info!("  watching dates: {}", event.included_dates.join(", "));
                    }
                }
            }
        }
    }

    log::info!("Done!");

    Ok(())
}

/// Strip whitespace from user-provided dates so they compare equal to
/// scraped ones, which are stored without any.
fn normalize_dates(dates: &[String]) -> Vec<String> {
    dates
        .iter()
        .map(|d| d.chars().filter(|c| !c.is_whitespace()).collect::<String>())
        .filter(|d| !d.is_empty())
        .collect()
}
