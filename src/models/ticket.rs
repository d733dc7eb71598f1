//! Ticket slot and seat snapshot data structures.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One date+time showing with its seat-availability indicator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TicketItem {
    /// Calendar date label as shown on the site
    pub date: String,

    /// Session/showtime label
    pub time: String,

    /// Free-seat count as displayed, kept as an opaque string
    pub seats: String,

    /// Purchase URL (empty when the site offers none)
    #[serde(default)]
    pub link: String,
}

impl TicketItem {
    /// Identity key used to match the same slot across two snapshots.
    ///
    /// Built as `date + "#" + time` with all whitespace stripped from the
    /// date. Items sharing a key are the same slot regardless of any other
    /// field.
    pub fn slot_key(&self) -> String {
        let date: String = self.date.chars().filter(|c| !c.is_whitespace()).collect();
        format!("{}#{}", date, self.time)
    }

    /// First decimal number embedded in the seats label, if any.
    ///
    /// The seats field stays an opaque display string ("Liczba miejsc: 3");
    /// this extraction only feeds the optional change-threshold filter.
    pub fn seat_count(&self) -> Option<u32> {
        static NUMBER: OnceLock<Option<Regex>> = OnceLock::new();
        let re = NUMBER.get_or_init(|| Regex::new(r"\d+").ok()).as_ref()?;
        re.find(&self.seats)?.as_str().parse().ok()
    }
}

/// Seat-availability snapshot for one event at one point in time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatSnapshot {
    /// Event name the snapshot belongs to
    pub event: String,

    /// Observed slots, in page order
    pub items: Vec<TicketItem>,

    /// When the snapshot was taken
    pub created_at: DateTime<Utc>,
}

impl SeatSnapshot {
    /// Create a snapshot for an event from freshly observed items.
    pub fn new(event: impl Into<String>, items: Vec<TicketItem>, created_at: DateTime<Utc>) -> Self {
        Self {
            event: event.into(),
            items,
            created_at,
        }
    }
}
