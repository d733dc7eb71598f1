//! Storage abstractions for events and seat snapshots.
//!
//! One trait, two backends:
//! - `LocalStore` keeps two JSON files under a root directory for
//!   development and the CLI.
//! - `DynamoStore` keeps everything in a single DynamoDB table for
//!   the deployed watcher (behind the `aws` feature).

pub mod local;

#[cfg(feature = "aws")]
pub mod dynamo;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{EventRecord, SeatSnapshot};

pub use local::LocalStore;

#[cfg(feature = "aws")]
pub use dynamo::DynamoStore;

/// Trait for event and snapshot storage backends.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Load every stored event.
    async fn list_events(&self) -> Result<Vec<EventRecord>>;

    /// Insert or replace events, keyed by event name.
    async fn put_events(&self, events: &[EventRecord]) -> Result<()>;

    /// Delete the events with the given names.
    async fn delete_events(&self, names: &[String]) -> Result<()>;

    /// Load stored seat snapshots for the given event names.
    ///
    /// Events that have never been snapshotted are simply absent from
    /// the result; that is a cold start, not an error.
    async fn load_snapshots(&self, events: &[String]) -> Result<Vec<SeatSnapshot>>;

    /// Insert or replace seat snapshots, keyed by event name.
    async fn save_snapshots(&self, snapshots: &[SeatSnapshot]) -> Result<()>;
}
