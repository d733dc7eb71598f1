// src/services/seats.rs

//! Seat availability scraper.
//!
//! Fetches an event page and extracts one record per session block:
//! date, showtime, free-seat text, and the purchase link.

use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

use crate::error::Result;
use crate::models::{Config, TicketItem};
use crate::services::parse_selector;
use crate::utils::http::fetch_text;
use crate::utils::resolve_url;

/// Scraper for an event's seat availability page.
pub struct SeatScraper {
    base: Url,
    row_selector: Selector,
    date_selector: Selector,
    time_selector: Selector,
    free_selector: Selector,
    link_selector: Selector,
    link_attr: String,
}

impl SeatScraper {
    /// Create a scraper from site and selector configuration.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            base: Url::parse(&config.site.base_url)?,
            row_selector: parse_selector(&config.selectors.seat_row)?,
            date_selector: parse_selector(&config.selectors.seat_date)?,
            time_selector: parse_selector(&config.selectors.seat_time)?,
            free_selector: parse_selector(&config.selectors.seat_free)?,
            link_selector: parse_selector(&config.selectors.seat_link)?,
            link_attr: config.selectors.link_attr.clone(),
        })
    }

    /// Fetch an event page and parse the seat listing on it.
    pub async fn fetch(&self, client: &Client, url: &str) -> Result<Vec<TicketItem>> {
        let html = fetch_text(client, url).await?;
        Ok(self.parse(&html))
    }

    /// Parse a seat listing out of an event page body.
    ///
    /// The date keeps no whitespace at all so stored values compare
    /// cleanly across scrapes. Blocks with neither a date nor a time
    /// are decoration and are skipped.
    pub fn parse(&self, html: &str) -> Vec<TicketItem> {
        let document = Html::parse_document(html);
        let mut items = Vec::new();

        for block in document.select(&self.row_selector) {
            let date: String = self
                .select_text(&block, &self.date_selector)
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            let time = self.select_text(&block, &self.time_selector).trim().to_string();
            let seats = self.select_text(&block, &self.free_selector).trim().to_string();

            if date.is_empty() && time.is_empty() {
                continue;
            }

            let link = block
                .select(&self.link_selector)
                .next()
                .and_then(|el| el.value().attr(&self.link_attr))
                .map(|href| resolve_url(&self.base, href))
                .unwrap_or_default();

            items.push(TicketItem {
                date,
                time,
                seats,
                link,
            });
        }

        items
    }

    fn select_text(&self, block: &scraper::ElementRef<'_>, selector: &Selector) -> String {
        block
            .select(selector)
            .next()
            .map(|el| el.text().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scraper() -> SeatScraper {
        SeatScraper::new(&Config::default()).unwrap()
    }

    #[test]
    fn test_parse_seat_listing() {
        let html = r#"
            <div class="termin">
                <div class="data">24 / 05 / 2023</div>
                <div class="godzina">Godz. 13:00</div>
                <div class="wolne">Liczba miejsc: 4</div>
                <div class="text-right"><a href="/kup/123">Kup bilet</a></div>
            </div>
            <div class="termin">
                <div class="data">26/05/2023</div>
                <div class="godzina">Godz. 11:00</div>
                <div class="wolne">Liczba miejsc: 0</div>
            </div>
        "#;

        let items = scraper().parse(html);
        assert_eq!(items.len(), 2);

        assert_eq!(items[0].date, "24/05/2023");
        assert_eq!(items[0].time, "Godz. 13:00");
        assert_eq!(items[0].seats, "Liczba miejsc: 4");
        assert_eq!(items[0].link, "https://bilety.muzyczny.org/kup/123");

        assert_eq!(items[1].date, "26/05/2023");
        assert_eq!(items[1].link, "");
    }

    #[test]
    fn test_parse_skips_blocks_without_date_or_time() {
        let html = r#"
            <div class="termin"><div class="wolne">Liczba miejsc: 2</div></div>
            <div class="termin">
                <div class="data">01/06/2023</div>
                <div class="godzina">Godz. 19:00</div>
                <div class="wolne">Liczba miejsc: 2</div>
            </div>
        "#;

        let items = scraper().parse(html);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].date, "01/06/2023");
    }

    #[test]
    fn test_parse_keeps_block_with_only_time() {
        let html = r#"
            <div class="termin">
                <div class="godzina">Godz. 20:00</div>
                <div class="wolne">Liczba miejsc: 7</div>
            </div>
        "#;

        let items = scraper().parse(html);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].date, "");
        assert_eq!(items[0].time, "Godz. 20:00");
    }

    #[test]
    fn test_parse_empty_page() {
        assert!(scraper().parse("<html><body></body></html>").is_empty());
    }
}
