//! Yahoo Finance daily history provider.
//!
//! Wraps `yahoo_finance_api::YahooConnector` behind [`PriceProvider`], with
//! chrono/time date conversion at the boundary. The per-request timeout is
//! applied by the bulk downloader.

use chrono::NaiveDate;
use time::OffsetDateTime;

use crate::download::{DailyBar, DateRange, DownloadError, PriceProvider};

/// Convert chrono::NaiveDate to time::OffsetDateTime at UTC midnight.
pub fn date_to_offset_datetime(date: NaiveDate) -> Result<OffsetDateTime, DownloadError> {
    let datetime = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| DownloadError::InvalidDate(date.to_string()))?;

    let timestamp = datetime.and_utc().timestamp();

    OffsetDateTime::from_unix_timestamp(timestamp)
        .map_err(|_| DownloadError::InvalidDate(date.to_string()))
}

/// Convert a unix timestamp (seconds) to its UTC calendar date.
pub fn timestamp_to_date(timestamp: i64) -> Result<NaiveDate, DownloadError> {
    chrono::DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| DownloadError::InvalidDate(format!("timestamp {}", timestamp)))
}

/// Daily, unadjusted OHLCV from Yahoo Finance.
pub struct YahooProvider {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooProvider {
    pub fn new() -> Result<Self, DownloadError> {
        Ok(Self {
            connector: yahoo_finance_api::YahooConnector::new()?,
        })
    }
}

#[async_trait::async_trait]
impl PriceProvider for YahooProvider {
    async fn daily_history(
        &self,
        symbol: &str,
        range: &DateRange,
    ) -> Result<Vec<DailyBar>, DownloadError> {
        let start = date_to_offset_datetime(range.start)?;
        let end = date_to_offset_datetime(range.end)?;

        let response = self.connector.get_quote_history(symbol, start, end).await?;
        let quotes = response.quotes()?;

        let mut bars = Vec::with_capacity(quotes.len());
        for q in quotes {
            let timestamp = i64::try_from(q.timestamp).map_err(|_| {
                DownloadError::ParseFailed(format!("timestamp out of range for {}", symbol))
            })?;
            let date = timestamp_to_date(timestamp)?;
            if date < range.start || date >= range.end {
                continue;
            }
            bars.push(DailyBar {
                date,
                open: q.open,
                high: q.high,
                low: q.low,
                close: q.close,
                adj_close: q.adjclose,
                volume: q.volume as f64,
            });
        }

        tracing::debug!("{}: {} daily bars", symbol, bars.len());
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_date_to_offset_datetime_basic() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let result = date_to_offset_datetime(date).unwrap();

        assert_eq!(result.year(), 2024);
        assert_eq!(result.month() as u32, 1);
        assert_eq!(result.day(), 15);

        assert_eq!(result.hour(), 0);
        assert_eq!(result.minute(), 0);
        assert_eq!(result.offset().whole_hours(), 0);
    }

    #[test]
    fn test_default_start_is_expected_timestamp() {
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let result = date_to_offset_datetime(date).unwrap();
        assert_eq!(result.unix_timestamp(), 1_577_836_800);
    }

    #[test]
    fn test_timestamp_to_date_market_open() {
        // 2024-06-14 13:30 UTC, the regular-session open.
        let date = timestamp_to_date(1_718_371_800).unwrap();
        assert_eq!(date.year(), 2024);
        assert_eq!(date.month(), 6);
        assert_eq!(date.day(), 14);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let dates = vec![
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2020, 2, 29).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        ];

        for date in dates {
            let offset_dt = date_to_offset_datetime(date).unwrap();
            let back = timestamp_to_date(offset_dt.unix_timestamp()).unwrap();
            assert_eq!(back, date, "Roundtrip failed for {}", date);
        }
    }
}
