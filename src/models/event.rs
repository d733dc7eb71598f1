//! Stored event records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An event tracked by the watcher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventRecord {
    /// Event name as listed on the site; unique within the store
    pub name: String,

    /// URL of the event's seat listing page
    pub link: String,

    /// Whether the seat watcher checks this event
    #[serde(default)]
    pub activated: bool,

    /// Date allowlist for seat watching; empty means every date
    #[serde(default)]
    pub included_dates: Vec<String>,

    /// When the event was first discovered
    pub created_at: DateTime<Utc>,

    /// When the event record last changed
    pub updated_at: DateTime<Utc>,
}

impl EventRecord {
    /// Create a freshly discovered event.
    ///
    /// New events start deactivated; a subscriber opts in explicitly.
    pub fn new(name: impl Into<String>, link: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            link: link.into(),
            activated: false,
            included_dates: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether a slot date passes this event's allowlist.
    ///
    /// Dates are compared in their whitespace-stripped form, the same form
    /// the seat scraper emits.
    pub fn date_included(&self, date: &str) -> bool {
        self.included_dates.is_empty() || self.included_dates.iter().any(|d| d == date)
    }
}
