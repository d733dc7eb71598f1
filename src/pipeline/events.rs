// src/pipeline/events.rs

//! Event synchronization pipeline.
//!
//! Scrapes the listing page and reconciles it with the stored event
//! set: events that appeared are created (deactivated, so nobody gets
//! notified about an event they never asked for), events that left
//! the listing are deleted.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use log::info;

use crate::error::Result;
use crate::models::{Config, EventRecord};
use crate::services::{DiscoveredEvent, EventScraper};
use crate::storage::TicketStore;
use crate::utils::http::create_client;

/// Summary of an event sync run.
#[derive(Debug, Clone, Default)]
pub struct SyncOutcome {
    pub discovered: usize,
    pub created: usize,
    pub deleted: usize,
}

/// Changes needed to bring the stored event set in line with the
/// current listing.
struct ReconcilePlan {
    to_create: Vec<EventRecord>,
    to_delete: Vec<String>,
}

/// Run the event synchronization pipeline.
pub async fn run_event_sync(config: &Config, store: &dyn TicketStore) -> Result<SyncOutcome> {
    let client = create_client(&config.scraper)?;
    let scraper = EventScraper::new(config)?;

    let discovered = scraper.fetch(&client).await?;
    info!(
        "found [{}] events on the listing page: {:?}",
        discovered.len(),
        discovered.iter().map(|e| &e.title).collect::<Vec<_>>()
    );

    let stored = store.list_events().await?;
    info!("currently stored [{}] events", stored.len());

    let plan = reconcile(&discovered, &stored, Utc::now());

    if !plan.to_create.is_empty() {
        info!(
            "creating [{}] events: {:?}",
            plan.to_create.len(),
            plan.to_create.iter().map(|e| &e.name).collect::<Vec<_>>()
        );
        store.put_events(&plan.to_create).await?;
    }

    if !plan.to_delete.is_empty() {
        info!(
            "deleting [{}] events: {:?}",
            plan.to_delete.len(),
            plan.to_delete
        );
        // TODO: also delete the seat snapshots of removed events,
        // they currently linger in storage until manually cleaned.
        store.delete_events(&plan.to_delete).await?;
    }

    Ok(SyncOutcome {
        discovered: discovered.len(),
        created: plan.to_create.len(),
        deleted: plan.to_delete.len(),
    })
}

/// Compare the scraped listing against the stored events.
///
/// New events start deactivated with both timestamps set to `now`.
/// A title listed twice on the page counts once.
fn reconcile(
    discovered: &[DiscoveredEvent],
    stored: &[EventRecord],
    now: DateTime<Utc>,
) -> ReconcilePlan {
    let known: HashSet<&str> = stored.iter().map(|e| e.name.as_str()).collect();
    let seen: HashSet<&str> = discovered.iter().map(|e| e.title.as_str()).collect();

    let mut planned: HashSet<&str> = HashSet::new();
    let to_create = discovered
        .iter()
        .filter(|e| !known.contains(e.title.as_str()) && planned.insert(e.title.as_str()))
        .map(|e| EventRecord::new(&e.title, &e.link, now))
        .collect();

    let to_delete = stored
        .iter()
        .filter(|e| !seen.contains(e.name.as_str()))
        .map(|e| e.name.clone())
        .collect();

    ReconcilePlan {
        to_create,
        to_delete,
    }
}
