//! HTTP client construction and fetch helpers.

use std::time::Duration;

use log::debug;
use reqwest::Client;

use crate::error::Result;
use crate::models::ScraperConfig;

/// Build a reqwest client from scraper settings.
pub fn create_client(config: &ScraperConfig) -> Result<Client> {
    let client = Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Fetch a page and return its body as text.
///
/// Non-2xx statuses are treated as errors so callers never parse an
/// error page as a listing.
pub async fn fetch_text(client: &Client, url: &str) -> Result<String> {
    debug!("GET {url}");
    let response = client.get(url).send().await?.error_for_status()?;
    let body = response.text().await?;
    debug!("GET {url} -> {} bytes", body.len());
    Ok(body)
}
