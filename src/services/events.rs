// src/services/events.rs

//! Event listing scraper.
//!
//! Fetches the site front page and extracts the events currently on
//! sale using configured CSS selectors.

use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

use crate::error::Result;
use crate::models::Config;
use crate::services::parse_selector;
use crate::utils::http::fetch_text;
use crate::utils::resolve_url;

/// An event found on the listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredEvent {
    pub title: String,
    pub link: String,
}

/// Scraper for the site's event listing page.
pub struct EventScraper {
    base: Url,
    row_selector: Selector,
    link_selector: Selector,
    link_attr: String,
}

impl EventScraper {
    /// Create a scraper from site and selector configuration.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            base: Url::parse(&config.site.base_url)?,
            row_selector: parse_selector(&config.selectors.event_row)?,
            link_selector: parse_selector(&config.selectors.event_link)?,
            link_attr: config.selectors.link_attr.clone(),
        })
    }

    /// Fetch the listing page and parse the events on it.
    pub async fn fetch(&self, client: &Client) -> Result<Vec<DiscoveredEvent>> {
        let html = fetch_text(client, self.base.as_str()).await?;
        Ok(self.parse(&html))
    }

    /// Parse an event listing out of a page body.
    ///
    /// Rows without a title are skipped; rows without a link keep an
    /// empty link so the event is still discovered.
    pub fn parse(&self, html: &str) -> Vec<DiscoveredEvent> {
        let document = Html::parse_document(html);
        let mut events = Vec::new();

        for row in document.select(&self.row_selector) {
            let raw_title: String = row.text().collect();
            let title = raw_title.trim().to_string();
            if title.is_empty() {
                continue;
            }

            let link = row
                .select(&self.link_selector)
                .next()
                .and_then(|el| el.value().attr(&self.link_attr))
                .map(|href| resolve_url(&self.base, href))
                .unwrap_or_default();

            events.push(DiscoveredEvent { title, link });
        }

        events
    }
}
