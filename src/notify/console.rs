//! Console notification backend for local runs.

use async_trait::async_trait;
use log::info;

use crate::error::Result;
use crate::notify::Notifier;

/// Notifier that prints messages to stdout instead of delivering them.
#[derive(Debug, Clone, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn publish(&self, subject: &str, message: &str) -> Result<()> {
        info!("publishing notification: {subject}");
        println!("{subject}");
        println!("{}", "-".repeat(subject.len()));
        println!("{message}");
        Ok(())
    }
}
