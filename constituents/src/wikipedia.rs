//! Primary source: the Wikipedia "List of S&P 500 companies" page.

use std::time::Duration;

use crate::{
    html::first_table_column, user_agent::get_user_agent, ConstituentSource, Error, SYMBOL_COLUMN,
};

/// Production page URL.
pub const DEFAULT_URL: &str = "https://en.wikipedia.org/wiki/List_of_S%26P_500_companies";

/// Request timeout for the page fetch.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Scrapes the first table of the constituents page for its `Symbol` column.
pub struct WikipediaSource {
    url: String,
    http: reqwest::Client,
}

impl WikipediaSource {
    /// Creates a source pointing at the production page.
    pub fn new() -> Result<Self, Error> {
        Self::with_url(DEFAULT_URL)
    }

    /// Creates a source pointing at a custom URL. Used for testing with wiremock.
    pub fn with_url(url: &str) -> Result<Self, Error> {
        Self::with_url_and_timeout(url, REQUEST_TIMEOUT)
    }

    /// Like [`with_url`](Self::with_url), with a custom request timeout.
    pub fn with_url_and_timeout(url: &str, timeout: Duration) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(get_user_agent())
            .timeout(timeout)
            .build()?;
        Ok(Self {
            url: url.to_string(),
            http,
        })
    }

    async fn fetch_html(&self) -> Result<String, Error> {
        let resp = self
            .http
            .get(&self.url)
            .header("accept", "text/html,application/xhtml+xml")
            .header("accept-language", "en-US,en;q=0.9")
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::HttpStatus {
                status: resp.status().as_u16(),
            });
        }

        Ok(resp.text().await?)
    }
}

#[async_trait::async_trait]
impl ConstituentSource for WikipediaSource {
    fn name(&self) -> &'static str {
        "wikipedia"
    }

    async fn fetch_symbols(&self) -> Result<Vec<String>, Error> {
        let html = self.fetch_html().await?;
        let symbols = first_table_column(&html, SYMBOL_COLUMN)?;
        if symbols.is_empty() {
            return Err(Error::Empty);
        }
        tracing::debug!("parsed {} symbols from {}", symbols.len(), self.url);
        Ok(symbols)
    }
}
