//! Fallback source: the DataHub `s-and-p-500-companies` CSV dataset.

use crate::{ConstituentSource, Error, SYMBOL_COLUMN};

/// Production dataset URL.
pub const DEFAULT_URL: &str = "https://datahub.io/core/s-and-p-500-companies/r/constituents.csv";

/// Reads the `Symbol` column of the DataHub constituents CSV.
///
/// No request timeout is configured on this client.
pub struct DataHubSource {
    url: String,
    http: reqwest::Client,
}

impl DataHubSource {
    pub fn new() -> Result<Self, Error> {
        Self::with_url(DEFAULT_URL)
    }

    /// Creates a source pointing at a custom URL. Used for testing with wiremock.
    pub fn with_url(url: &str) -> Result<Self, Error> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            url: url.to_string(),
            http,
        })
    }
}

#[async_trait::async_trait]
impl ConstituentSource for DataHubSource {
    fn name(&self) -> &'static str {
        "datahub"
    }

    async fn fetch_symbols(&self) -> Result<Vec<String>, Error> {
        let resp = self.http.get(&self.url).send().await?;
        if !resp.status().is_success() {
            return Err(Error::HttpStatus {
                status: resp.status().as_u16(),
            });
        }
        let body = resp.text().await?;
        let symbols = parse_symbol_column(&body)?;
        if symbols.is_empty() {
            return Err(Error::Empty);
        }
        Ok(symbols)
    }
}

/// Extracts the `Symbol` column from CSV text, skipping blank cells.
fn parse_symbol_column(body: &str) -> Result<Vec<String>, Error> {
    let body = body.trim_start_matches('\u{feff}');
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(body.as_bytes());

    let idx = reader
        .headers()?
        .iter()
        .position(|h| h.trim() == SYMBOL_COLUMN)
        .ok_or_else(|| Error::MissingColumn(SYMBOL_COLUMN.to_string()))?;

    let mut symbols = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(symbol) = record.get(idx) {
            if !symbol.trim().is_empty() {
                symbols.push(symbol.to_string());
            }
        }
    }
    Ok(symbols)
}
