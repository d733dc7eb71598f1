// src/pipeline/seats.rs

//! Seat watching pipeline.
//!
//! Scrapes every activated event, compares the fresh listing against
//! the stored snapshot, and publishes one notification covering all
//! events that changed. Fresh snapshots are always saved so the next
//! run compares against what was seen this time.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use log::{info, warn};

use crate::error::Result;
use crate::models::{Config, EventRecord, SeatSnapshot, TicketItem};
use crate::notify::{CHANGE_SUBJECT, Notifier, compose_change_message};
use crate::pipeline::diff::{ChangeDetector, ChangeReport};
use crate::services::SeatScraper;
use crate::storage::TicketStore;
use crate::utils::http::create_client;

/// Summary of a seat watch run.
#[derive(Debug, Clone, Default)]
pub struct WatchOutcome {
    /// Activated events selected for scraping
    pub watched: usize,
    /// Events scraped successfully
    pub scraped: usize,
    /// Events skipped because their page could not be fetched
    pub failures: usize,
    /// Events with at least one reported change
    pub changed: usize,
    /// Whether a notification went out
    pub notified: bool,
}

/// Run the seat watching pipeline.
pub async fn run_seat_watch(
    config: &Config,
    store: &dyn TicketStore,
    notifier: &dyn Notifier,
) -> Result<WatchOutcome> {
    let targets: Vec<EventRecord> = store
        .list_events()
        .await?
        .into_iter()
        .filter(|e| e.activated)
        .collect();

    if targets.is_empty() {
        info!("no activated events, nothing to watch");
        return Ok(WatchOutcome::default());
    }

    info!(
        "watching [{}] events: {:?}",
        targets.len(),
        targets.iter().map(|e| &e.name).collect::<Vec<_>>()
    );

    let client = create_client(&config.scraper)?;
    let scraper = SeatScraper::new(config)?;
    let delay = Duration::from_millis(config.scraper.request_delay_ms);
    let concurrency = config.scraper.max_concurrent.max(1);

    // One timestamp for the whole run, so every snapshot of this
    // scrape carries the same creation time.
    let now = Utc::now();

    let mut outcome = WatchOutcome {
        watched: targets.len(),
        ..WatchOutcome::default()
    };

    let scraper_ref = &scraper;
    let client_ref = &client;
    let mut pages = stream::iter(targets)
        .map(|event| async move {
            let result = scraper_ref.fetch(client_ref, &event.link).await;
            (event, result)
        })
        .buffered(concurrency);

    let mut snapshots = Vec::new();
    while let Some((event, result)) = pages.next().await {
        match result {
            Ok(items) => {
                let kept = keep_included_dates(&event, items);
                snapshots.push(SeatSnapshot::new(&event.name, kept, now));
            }
            Err(error) => {
                outcome.failures += 1;
                warn!(
                    "failed to fetch seats for {} ({}): {error}",
                    event.name, event.link
                );
            }
        }

        if delay.as_millis() > 0 {
            tokio::time::sleep(delay).await;
        }
    }
    outcome.scraped = snapshots.len();

    let names: Vec<String> = snapshots.iter().map(|s| s.event.clone()).collect();
    let previous = store.load_snapshots(&names).await?;

    let detector = ChangeDetector::with_threshold(config.watch.free_seats_threshold);
    let changed = collect_changes(&detector, &previous, &snapshots);
    outcome.changed = changed.len();

    if !changed.is_empty() {
        for (event, report) in &changed {
            info!(
                "changes for {event}: {} added, {} missing, {} changed",
                report.add.len(),
                report.miss.len(),
                report.diff.len()
            );
        }
        notifier
            .publish(CHANGE_SUBJECT, &compose_change_message(&changed))
            .await?;
        outcome.notified = true;
    }

    store.save_snapshots(&snapshots).await?;
    info!("saved [{}] seat snapshots", snapshots.len());

    Ok(outcome)
}

/// Drop slots outside the event's date allowlist. An empty allowlist
/// keeps everything.
fn keep_included_dates(event: &EventRecord, items: Vec<TicketItem>) -> Vec<TicketItem> {
    items
        .into_iter()
        .filter(|item| event.date_included(&item.date))
        .collect()
}

/// Compare fresh snapshots against stored ones and keep the reports
/// worth notifying about.
///
/// Events without a stored snapshot produce no report; their first
/// snapshot becomes the baseline for the next run. Report order
/// follows the order of `current`.
fn collect_changes(
    detector: &ChangeDetector,
    previous: &[SeatSnapshot],
    current: &[SeatSnapshot],
) -> Vec<(String, ChangeReport)> {
    let previous_by_event: HashMap<&str, &SeatSnapshot> =
        previous.iter().map(|s| (s.event.as_str(), s)).collect();

    current
        .iter()
        .filter_map(|snapshot| {
            let prev = previous_by_event.get(snapshot.event.as_str())?;
            let report = detector.detect(&prev.items, &snapshot.items);
            report
                .has_changes()
                .then(|| (snapshot.event.clone(), report))
        })
        .collect()
}
