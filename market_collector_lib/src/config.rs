//! Run configuration for a collection.

use std::time::Duration;

use chrono::NaiveDate;

use crate::clock::Clock;
use crate::download::DateRange;
use crate::error::CollectError;
use crate::ticker::{Ticker, GOLD_SYMBOL, INDEX_SYMBOL, RISK_FREE_SYMBOL};

/// File name of the raw (grouped by instrument) table.
pub const RAW_FILE_NAME: &str = "sp500_data.csv";
/// File name of the flattened, column-sorted table.
pub const FLAT_FILE_NAME: &str = "market_data.csv";

/// Default output directory. Relative paths resolve against the working
/// directory, not the location of the binary.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Extra tickers appended after the auxiliary symbols.
pub const DEFAULT_EXTRA_TICKERS: &[&str] = &["BRK-B", "ARKK"];

/// Per-instrument timeout for the price provider.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid default start date")
}

/// Everything a collection run needs besides its collaborators. Where the
/// tables end up is decided by the [`TableSink`](crate::writer::TableSink).
#[derive(Debug, Clone, PartialEq)]
pub struct CollectConfig {
    pub start: NaiveDate,
    /// Exclusive, like the provider's own `end` parameter.
    pub end: NaiveDate,
    pub include_index: bool,
    pub include_gold: bool,
    pub include_risk_free: bool,
    pub extra_tickers: Vec<Ticker>,
    pub request_timeout: Duration,
}

impl CollectConfig {
    /// Defaults, with the end of the range taken from `clock`.
    pub fn new(clock: &impl Clock) -> Self {
        Self {
            start: default_start_date(),
            end: clock.today(),
            include_index: true,
            include_gold: true,
            include_risk_free: true,
            extra_tickers: DEFAULT_EXTRA_TICKERS
                .iter()
                .map(|s| Ticker::normalize(s))
                .collect(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn validate(&self) -> Result<(), CollectError> {
        if self.start >= self.end {
            return Err(CollectError::InvalidInput(format!(
                "start date {} must be before end date {}",
                self.start, self.end
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(CollectError::InvalidInput(
                "request timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn date_range(&self) -> DateRange {
        DateRange {
            start: self.start,
            end: self.end,
        }
    }

    /// Resolved tickers, then index, gold and risk-free proxies (each only
    /// if enabled), then the extra tickers.
    pub fn instruments(&self, resolved: Vec<Ticker>) -> Vec<Ticker> {
        let mut tickers = resolved;
        if self.include_index {
            tickers.push(Ticker::normalize(INDEX_SYMBOL));
        }
        if self.include_gold {
            tickers.push(Ticker::normalize(GOLD_SYMBOL));
        }
        if self.include_risk_free {
            tickers.push(Ticker::normalize(RISK_FREE_SYMBOL));
        }
        tickers.extend(self.extra_tickers.iter().cloned());
        tickers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::ticker::normalize_all;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()
    }

    fn names(tickers: &[Ticker]) -> Vec<&str> {
        tickers.iter().map(Ticker::as_str).collect()
    }

    #[test]
    fn defaults() {
        let config = CollectConfig::new(&FixedClock(today()));
        assert_eq!(config.start, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(config.end, today());
        assert!(config.include_index && config.include_gold && config.include_risk_free);
        assert_eq!(names(&config.extra_tickers), vec!["BRK-B", "ARKK"]);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn instrument_order_matches_documented_scenario() {
        let mut config = CollectConfig::new(&FixedClock(today()));
        config.extra_tickers = vec![Ticker::normalize("ARKK")];

        let resolved = normalize_all(&["AAPL", "BRK.B"]);
        let instruments = config.instruments(resolved);

        assert_eq!(
            names(&instruments),
            vec!["AAPL", "BRK-B", "^GSPC", "GC=F", "^IRX", "ARKK"]
        );
    }

    #[test]
    fn disabled_auxiliaries_are_left_out() {
        let mut config = CollectConfig::new(&FixedClock(today()));
        config.include_index = false;
        config.include_risk_free = false;
        config.extra_tickers.clear();

        let instruments = config.instruments(normalize_all(&["MSFT"]));
        assert_eq!(names(&instruments), vec!["MSFT", "GC=F"]);
    }

    #[test]
    fn empty_range_is_rejected() {
        let mut config = CollectConfig::new(&FixedClock(today()));
        config.start = today();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must be before"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = CollectConfig::new(&FixedClock(today()));
        config.request_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }
}
