//! Notification dispatch for detected changes and status digests.
//!
//! Message bodies are composed here so every backend delivers the
//! same text; backends only differ in where it goes.

mod console;
mod message;

#[cfg(feature = "aws")]
mod sns;

use async_trait::async_trait;

use crate::error::Result;

pub use console::ConsoleNotifier;
pub use message::{compose_change_message, compose_daily_status};

#[cfg(feature = "aws")]
pub use sns::SnsNotifier;

/// Subject line for change notifications.
pub const CHANGE_SUBJECT: &str = "[Ticket Blaster] Change detected";

/// Subject line for the daily status digest.
pub const STATUS_SUBJECT: &str = "[Ticket Blaster] Daily status";

/// Trait for notification delivery backends.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one message under the given subject.
    async fn publish(&self, subject: &str, message: &str) -> Result<()>;
}
