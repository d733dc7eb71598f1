//! Pipeline entry points for watcher operations.
//!
//! - `run_event_sync`: reconcile stored events with the site listing
//! - `run_seat_watch`: scrape activated events and notify on changes
//! - `run_daily_status`: send the daily event digest

pub mod diff;
mod events;
mod seats;
mod status;

pub use diff::{ChangeDetector, ChangeReport, SeatChange, detect_changes};
pub use events::{SyncOutcome, run_event_sync};
pub use seats::{WatchOutcome, run_seat_watch};
pub use status::run_daily_status;
