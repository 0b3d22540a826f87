//! Library layer for the market data collector: ticker resolution, bulk
//! daily-history download, price table reshaping and CSV persistence.
//!
//! Wraps the `constituents` crate with symbol normalization and a
//! primary/fallback resolver, and `yahoo_finance_api` with a sequential
//! bulk downloader.

pub mod clock;
pub mod config;
pub mod download;
pub mod error;
pub mod pipeline;
pub mod resolver;
pub mod table;
pub mod ticker;
pub mod writer;
pub mod yahoo;

pub use constituents;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::CollectConfig;
pub use download::{
    BulkDownload, BulkDownloader, DailyBar, DateRange, DownloadError, DownloadObserver,
    InstrumentOutcome, NoopObserver, PriceProvider,
};
pub use error::CollectError;
pub use pipeline::{CollectSummary, CollectedTables};
pub use resolver::{Resolution, ResolutionError, TickerResolver};
pub use table::{FlatPriceTable, PriceField, RawPriceTable};
pub use ticker::Ticker;
pub use writer::{CsvDirectory, TableSink};
pub use yahoo::YahooProvider;
