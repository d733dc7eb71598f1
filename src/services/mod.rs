// src/services/mod.rs

//! Scraping services for the ticket site.

mod events;
mod seats;

pub use events::{DiscoveredEvent, EventScraper};
pub use seats::SeatScraper;

use scraper::Selector;

use crate::error::{AppError, Result};

/// Parse a CSS selector string into a scraper selector.
pub(crate) fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
