//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP and scraping behavior settings
    #[serde(default)]
    pub scraper: ScraperConfig,

    /// Ticketing site settings
    #[serde(default)]
    pub site: SiteConfig,

    /// CSS selectors for the listing and event pages
    #[serde(default)]
    pub selectors: SelectorConfig,

    /// Seat watching behavior
    #[serde(default)]
    pub watch: WatchConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.scraper.user_agent.trim().is_empty() {
            return Err(AppError::validation("scraper.user_agent is empty"));
        }
        if self.scraper.timeout_secs == 0 {
            return Err(AppError::validation("scraper.timeout_secs must be > 0"));
        }
        if self.scraper.max_concurrent == 0 {
            return Err(AppError::validation("scraper.max_concurrent must be > 0"));
        }
        if self.site.base_url.trim().is_empty() {
            return Err(AppError::validation("site.base_url is empty"));
        }
        self.selectors.validate()
    }
}

/// HTTP client and scraping behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between requests in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Maximum concurrent page fetches
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Ticketing site settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// URL of the event listing page
    #[serde(default = "defaults::base_url")]
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
        }
    }
}

/// CSS selectors for scraping the listing and event pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Selector for one event entry on the listing page
    #[serde(default = "defaults::event_row")]
    pub event_row: String,

    /// Selector for the link element within an event entry
    #[serde(default = "defaults::event_link")]
    pub event_link: String,

    /// Selector for one seat slot block on an event page
    #[serde(default = "defaults::seat_row")]
    pub seat_row: String,

    /// Selector for the date element within a slot block
    #[serde(default = "defaults::seat_date")]
    pub seat_date: String,

    /// Selector for the showtime element within a slot block
    #[serde(default = "defaults::seat_time")]
    pub seat_time: String,

    /// Selector for the free-seats element within a slot block
    #[serde(default = "defaults::seat_free")]
    pub seat_free: String,

    /// Selector for the purchase link within a slot block
    #[serde(default = "defaults::seat_link")]
    pub seat_link: String,

    /// HTML attribute name for extracting links (usually "href")
    #[serde(default = "defaults::link_attr")]
    pub link_attr: String,
}

impl SelectorConfig {
    fn validate(&self) -> Result<()> {
        let fields = [
            ("selectors.event_row", &self.event_row),
            ("selectors.event_link", &self.event_link),
            ("selectors.seat_row", &self.seat_row),
            ("selectors.seat_date", &self.seat_date),
            ("selectors.seat_time", &self.seat_time),
            ("selectors.seat_free", &self.seat_free),
            ("selectors.seat_link", &self.seat_link),
            ("selectors.link_attr", &self.link_attr),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(AppError::validation(format!("{name} is empty")));
            }
        }
        Ok(())
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            event_row: defaults::event_row(),
            event_link: defaults::event_link(),
            seat_row: defaults::seat_row(),
            seat_date: defaults::seat_date(),
            seat_time: defaults::seat_time(),
            seat_free: defaults::seat_free(),
            seat_link: defaults::seat_link(),
            link_attr: defaults::link_attr(),
        }
    }
}

/// Seat watching behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Minimum numeric seat delta for a change to be reported.
    /// Zero reports every change.
    #[serde(default)]
    pub free_seats_threshold: u32,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            free_seats_threshold: 0,
        }
    }
}

mod defaults {
    // Scraper defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; TicketBlaster/1.0)".into()
    }
    pub fn timeout() -> u64 {
        10
    }
    pub fn request_delay() -> u64 {
        100
    }
    pub fn max_concurrent() -> usize {
        5
    }

    // Site defaults
    pub fn base_url() -> String {
        "https://bilety.muzyczny.org/".into()
    }

    // Selector defaults
    pub fn event_row() -> String {
        "div.wydarzenie h2".into()
    }
    pub fn event_link() -> String {
        "a".into()
    }
    pub fn seat_row() -> String {
        "div.termin".into()
    }
    pub fn seat_date() -> String {
        "div.data".into()
    }
    pub fn seat_time() -> String {
        "div.godzina".into()
    }
    pub fn seat_free() -> String {
        "div.wolne".into()
    }
    pub fn seat_link() -> String {
        "div.text-right a".into()
    }
    pub fn link_attr() -> String {
        "href".into()
    }
}
