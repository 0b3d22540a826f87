//! The `collect` subcommand (also the default): resolve, download, write.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use market_collector_lib::config::{default_start_date, DEFAULT_DATA_DIR};
use market_collector_lib::constituents::{
    DataHubSource, WikipediaSource, DATAHUB_URL, WIKIPEDIA_URL,
};
use market_collector_lib::{
    pipeline, BulkDownloader, Clock, CollectConfig, CsvDirectory, SystemClock, Ticker,
    TickerResolver, YahooProvider,
};

use crate::output;
use crate::progress::ProgressObserver;

/// Arguments for the `collect` subcommand.
#[derive(Args, Debug, Clone)]
pub struct CollectArgs {
    /// Output directory for sp500_data.csv and market_data.csv. A relative
    /// path is resolved against the current working directory, not the
    /// location of the binary.
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// First date to download (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Date to stop at, exclusive (YYYY-MM-DD, default: today)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Extra tickers appended after the auxiliary symbols (repeatable)
    #[arg(long = "extra", value_name = "TICKER")]
    pub extra: Vec<String>,

    /// Do not append the market index (^GSPC)
    #[arg(long)]
    pub no_index: bool,

    /// Do not append the gold future (GC=F)
    #[arg(long)]
    pub no_gold: bool,

    /// Do not append the risk-free-rate proxy (^IRX)
    #[arg(long)]
    pub no_risk_free: bool,

    /// Per-instrument download timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout_secs: u64,

    #[command(flatten)]
    pub sources: SourceArgs,
}

/// Constituent source overrides, shared with the `tickers` subcommand.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Primary constituents page (HTML table with a Symbol column)
    #[arg(long, default_value = WIKIPEDIA_URL)]
    pub primary_url: String,

    /// Fallback constituents CSV (Symbol column)
    #[arg(long, default_value = DATAHUB_URL)]
    pub fallback_url: String,
}

impl SourceArgs {
    pub fn resolver(&self) -> Result<TickerResolver<WikipediaSource, DataHubSource>> {
        let primary = WikipediaSource::with_url(&self.primary_url)
            .context("failed to build primary source client")?;
        let fallback = DataHubSource::with_url(&self.fallback_url)
            .context("failed to build fallback source client")?;
        Ok(TickerResolver::new(primary, fallback))
    }
}

impl CollectArgs {
    /// Maps the arguments onto a config, taking "today" from `clock`.
    pub fn to_config(&self, clock: &impl Clock) -> CollectConfig {
        let mut config = CollectConfig::new(clock);
        config.start = self.start.unwrap_or_else(default_start_date);
        if let Some(end) = self.end {
            config.end = end;
        }
        config.include_index = !self.no_index;
        config.include_gold = !self.no_gold;
        config.include_risk_free = !self.no_risk_free;
        if !self.extra.is_empty() {
            config.extra_tickers = self.extra.iter().map(|s| Ticker::normalize(s)).collect();
        }
        config.request_timeout = Duration::from_secs(self.timeout_secs);
        config
    }
}

pub async fn run(args: &CollectArgs) -> Result<()> {
    let config = args.to_config(&SystemClock);

    let resolver = args.sources.resolver()?;
    let provider = YahooProvider::new().context("failed to create Yahoo client")?;
    let downloader = BulkDownloader::new(provider).with_timeout(config.request_timeout);
    let mut sink = CsvDirectory::new(&args.data_dir);
    let mut observer = ProgressObserver::new();

    let summary = pipeline::collect(&config, &resolver, &downloader, &mut sink, &mut observer)
        .await
        .context("market data collection failed")?;

    tracing::info!(
        "collected {} instruments ({} failed), {} rows",
        summary.instruments,
        summary.failed.len(),
        summary.rows
    );
    output::print_summary(&summary);
    Ok(())
}
