//! Sequential bulk download of daily price history.
//!
//! Instruments are requested one at a time, in list order. A failing
//! instrument does not abort the run: it is logged and kept in the table
//! with empty cells, so only a result with no data at all is fatal.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use thiserror::Error;

use crate::config::DEFAULT_REQUEST_TIMEOUT;
use crate::table::RawPriceTable;
use crate::ticker::Ticker;

/// Half-open date range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// One trading day of unadjusted OHLCV plus the adjusted close.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: f64,
}

/// Errors from a price provider.
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("Request for {symbol} timed out after {secs}s")]
    Timeout { symbol: String, secs: u64 },
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Failed to parse response: {0}")]
    ParseFailed(String),
    #[error(transparent)]
    Upstream(#[from] yahoo_finance_api::YahooError),
}

/// A source of daily history for a single symbol.
#[async_trait::async_trait]
pub trait PriceProvider {
    async fn daily_history(
        &self,
        symbol: &str,
        range: &DateRange,
    ) -> Result<Vec<DailyBar>, DownloadError>;
}

/// What happened to one instrument.
#[derive(Debug, Clone, PartialEq)]
pub enum InstrumentOutcome {
    Rows(usize),
    Failed(String),
}

/// Receives per-instrument progress during a bulk download.
pub trait DownloadObserver {
    fn on_start(&mut self, _total: usize) {}
    fn on_instrument(&mut self, _ticker: &Ticker, _outcome: &InstrumentOutcome) {}
    fn on_finish(&mut self) {}
}

/// Ignores all progress.
pub struct NoopObserver;

impl DownloadObserver for NoopObserver {}

/// Result of [`BulkDownloader::download`].
#[derive(Debug)]
pub struct BulkDownload {
    pub table: RawPriceTable,
    pub failed: Vec<Ticker>,
    pub elapsed: Duration,
}

/// Downloads every instrument through a [`PriceProvider`], one by one.
///
/// Each request is bounded by a timeout; an instrument that runs over it
/// fails with [`DownloadError::Timeout`].
pub struct BulkDownloader<P> {
    provider: P,
    timeout: Duration,
}

impl<P: PriceProvider> BulkDownloader<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[cfg(test)]
    pub(crate) fn provider(&self) -> &P {
        &self.provider
    }

    async fn fetch(
        &self,
        symbol: &str,
        range: &DateRange,
    ) -> Result<Vec<DailyBar>, DownloadError> {
        tokio::time::timeout(self.timeout, self.provider.daily_history(symbol, range))
            .await
            .map_err(|_| DownloadError::Timeout {
                symbol: symbol.to_string(),
                secs: self.timeout.as_secs(),
            })?
    }

    /// Fetches `instruments` over `range` and assembles the grouped table.
    ///
    /// Duplicate symbols are requested once and keep their first position.
    pub async fn download(
        &self,
        instruments: &[Ticker],
        range: &DateRange,
        observer: &mut dyn DownloadObserver,
    ) -> BulkDownload {
        let unique = dedup(instruments);
        if unique.len() < instruments.len() {
            tracing::debug!(
                "dropped {} duplicate instruments",
                instruments.len() - unique.len()
            );
        }

        tracing::info!(
            "downloading {} instruments {} -> {}",
            unique.len(),
            range.start,
            range.end
        );

        let started = Instant::now();
        observer.on_start(unique.len());

        let mut series = Vec::with_capacity(unique.len());
        let mut failed = Vec::new();

        for ticker in unique {
            let (bars, outcome) = match self.fetch(ticker.as_str(), range).await {
                Ok(bars) => {
                    let n = bars.len();
                    (bars, InstrumentOutcome::Rows(n))
                }
                Err(e) => {
                    tracing::warn!("failed to download {}: {}", ticker, e);
                    failed.push(ticker.clone());
                    (Vec::new(), InstrumentOutcome::Failed(e.to_string()))
                }
            };
            observer.on_instrument(&ticker, &outcome);
            series.push((ticker, bars));
        }

        observer.on_finish();
        let elapsed = started.elapsed();
        tracing::info!("bulk download took {:.1}s", elapsed.as_secs_f64());

        if !failed.is_empty() {
            tracing::warn!("{} failed downloads", failed.len());
        }

        BulkDownload {
            table: RawPriceTable::from_series(series),
            failed,
            elapsed,
        }
    }
}

fn dedup(instruments: &[Ticker]) -> Vec<Ticker> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(instruments.len());
    for ticker in instruments {
        if seen.insert(ticker.as_str()) {
            unique.push(ticker.clone());
        }
    }
    unique
}
