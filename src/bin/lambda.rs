//! AWS Lambda entry point for Ticket Blaster
//!
//! Deploy with `cargo lambda build --release`. One binary serves all
//! three scheduled jobs; the BLASTER_JOB environment variable selects
//! which one runs: `event-sync`, `seat-watch` (default), or
//! `daily-status`.

use lambda_runtime::{Error as LambdaError, LambdaEvent, service_fn};
use serde_json::Value;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ticket_blaster::error::{AppError, Result as AppResult};
use ticket_blaster::models::Config;
use ticket_blaster::notify::SnsNotifier;
use ticket_blaster::pipeline;
use ticket_blaster::storage::DynamoStore;

/// Main entry point for the AWS Lambda function.
#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Ticket Blaster Lambda starting...");
    lambda_runtime::run(service_fn(handler)).await
}

/// Handler for AWS Lambda events.
async fn handler(event: LambdaEvent<Value>) -> Result<Value, LambdaError> {
    info!("Received event: {:?}", event.payload);

    let job = std::env::var("BLASTER_JOB").unwrap_or_else(|_| "seat-watch".to_string());

    match run_job(&job).await {
        Ok(summary) => {
            info!("Job '{job}' finished: {summary}");
            Ok(serde_json::json!({
                "status": "success",
                "job": job,
                "summary": summary,
            }))
        }
        Err(e) => {
            error!("Job '{job}' failed: {e}");
            Ok(serde_json::json!({
                "status": "error",
                "job": job,
                "message": e.to_string(),
            }))
        }
    }
}

async fn run_job(job: &str) -> AppResult<String> {
    let config = Config::default();
    let store = DynamoStore::from_env().await?;

    match job {
        "event-sync" => {
            let outcome = pipeline::run_event_sync(&config, &store).await?;
            Ok(format!(
                "{} discovered, {} created, {} deleted",
                outcome.discovered, outcome.created, outcome.deleted
            ))
        }
        "seat-watch" => {
            let notifier = SnsNotifier::from_env().await?;
            let outcome = pipeline::run_seat_watch(&config, &store, &notifier).await?;
            Ok(format!(
                "{}/{} events scraped, {} changed, notified: {}",
                outcome.scraped, outcome.watched, outcome.changed, outcome.notified
            ))
        }
        "daily-status" => {
            let notifier = SnsNotifier::from_env().await?;
            let count = pipeline::run_daily_status(&store, &notifier).await?;
            Ok(format!("{count} events in digest"))
        }
        other => Err(AppError::config(format!("unknown job '{other}'"))),
    }
}
