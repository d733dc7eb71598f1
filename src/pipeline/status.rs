// src/pipeline/status.rs

//! Daily status pipeline.
//!
//! Publishes a digest of every stored event and which ones are
//! activated. Sent even when the store is empty so a silent scraper
//! is distinguishable from a broken one.

use log::info;

use crate::error::Result;
use crate::notify::{Notifier, STATUS_SUBJECT, compose_daily_status};
use crate::storage::TicketStore;

/// Run the daily status pipeline. Returns the number of stored events.
pub async fn run_daily_status(
    store: &dyn TicketStore,
    notifier: &dyn Notifier,
) -> Result<usize> {
    let events = store.list_events().await?;
    info!(
        "currently stored [{}] events: {:?}",
        events.len(),
        events.iter().map(|e| &e.name).collect::<Vec<_>>()
    );

    let message = compose_daily_status(&events);
    notifier.publish(STATUS_SUBJECT, &message).await?;

    Ok(events.len())
}
