//! Local filesystem storage implementation.
//!
//! Keeps events and seat snapshots as two JSON files for development
//! and CLI runs. Production deployments should use DynamoStore.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── events.json    # Tracked events
//! └── seats.json     # Last seat snapshot per event
//! ```

use std::collections::HashSet;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{EventRecord, SeatSnapshot};
use crate::storage::TicketStore;

const EVENTS_FILE: &str = "events.json";
const SEATS_FILE: &str = "seats.json";

/// Local filesystem storage backend.
#[derive(Clone)]
pub struct LocalStore {
    root_dir: PathBuf,
}

impl LocalStore {
    /// Create a new LocalStore rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if the file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read JSON data.
    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn read_events(&self) -> Result<Vec<EventRecord>> {
        Ok(self.read_json(EVENTS_FILE).await?.unwrap_or_default())
    }

    async fn read_snapshots(&self) -> Result<Vec<SeatSnapshot>> {
        Ok(self.read_json(SEATS_FILE).await?.unwrap_or_default())
    }
}

#[async_trait]
impl TicketStore for LocalStore {
    async fn list_events(&self) -> Result<Vec<EventRecord>> {
        self.read_events().await
    }

    async fn put_events(&self, events: &[EventRecord]) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }

        let mut stored = self.read_events().await?;
        for event in events {
            match stored.iter_mut().find(|e| e.name == event.name) {
                Some(existing) => *existing = event.clone(),
                None => stored.push(event.clone()),
            }
        }

        self.write_json(EVENTS_FILE, &stored).await
    }

    async fn delete_events(&self, names: &[String]) -> Result<()> {
        if names.is_empty() {
            return Ok(());
        }

        let doomed: HashSet<&str> = names.iter().map(String::as_str).collect();
        let mut stored = self.read_events().await?;
        stored.retain(|e| !doomed.contains(e.name.as_str()));

        self.write_json(EVENTS_FILE, &stored).await
    }

    async fn load_snapshots(&self, events: &[String]) -> Result<Vec<SeatSnapshot>> {
        let wanted: HashSet<&str> = events.iter().map(String::as_str).collect();
        let stored = self.read_snapshots().await?;

        Ok(stored
            .into_iter()
            .filter(|s| wanted.contains(s.event.as_str()))
            .collect())
    }

    async fn save_snapshots(&self, snapshots: &[SeatSnapshot]) -> Result<()> {
        if snapshots.is_empty() {
            return Ok(());
        }

        let mut stored = self.read_snapshots().await?;
        for snapshot in snapshots {
            match stored.iter_mut().find(|s| s.event == snapshot.event) {
                Some(existing) => *existing = snapshot.clone(),
                None => stored.push(snapshot.clone()),
            }
        }

        self.write_json(SEATS_FILE, &stored).await
    }
}
