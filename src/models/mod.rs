// src/models/mod.rs

//! Domain models for the ticket watcher.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod event;
mod ticket;

// Re-export all public types
pub use config::{Config, ScraperConfig, SelectorConfig, SiteConfig, WatchConfig};
pub use event::EventRecord;
pub use ticket::{SeatSnapshot, TicketItem};
