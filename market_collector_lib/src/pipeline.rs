//! The collection pipeline: resolve, download, reshape, persist.
//!
//! [`build_tables`] does no file I/O and returns both tables; [`persist`]
//! hands them to a [`TableSink`]. Nothing is written unless the download
//! produced data, and then either both tables are written or neither is.

use std::path::PathBuf;

use constituents::ConstituentSource;

use crate::config::CollectConfig;
use crate::download::{BulkDownloader, DateRange, DownloadObserver, PriceProvider};
use crate::error::CollectError;
use crate::resolver::TickerResolver;
use crate::table::{FlatPriceTable, RawPriceTable, FIELD_LEVEL, INDEX_NAME, INSTRUMENT_LEVEL};
use crate::ticker::Ticker;
use crate::writer::TableSink;

/// Both output tables for one run.
#[derive(Debug, Clone)]
pub struct CollectedTables {
    pub raw: RawPriceTable,
    pub flat: FlatPriceTable,
    pub failed: Vec<Ticker>,
}

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectSummary {
    pub instruments: usize,
    pub failed: Vec<Ticker>,
    pub rows: usize,
    pub columns: usize,
    pub raw_path: PathBuf,
    pub flat_path: PathBuf,
}

/// Downloads `instruments` and derives the flattened table.
///
/// Fails with [`CollectError::EmptyDownload`] when there is nothing to write.
pub async fn build_tables<P: PriceProvider>(
    downloader: &BulkDownloader<P>,
    instruments: &[Ticker],
    range: &DateRange,
    observer: &mut dyn DownloadObserver,
) -> Result<CollectedTables, CollectError> {
    let download = downloader.download(instruments, range, observer).await;

    if download.table.is_empty() {
        return Err(CollectError::EmptyDownload);
    }

    log_table_shape(&download.table);

    let flat = download.table.flatten();
    Ok(CollectedTables {
        raw: download.table,
        flat,
        failed: download.failed,
    })
}

/// Writes the raw and flattened tables as one unit.
pub fn persist<S: TableSink + ?Sized>(
    sink: &mut S,
    tables: &CollectedTables,
) -> Result<(PathBuf, PathBuf), CollectError> {
    let (raw_path, flat_path) = sink.write_tables(&tables.raw, &tables.flat)?;
    tracing::info!("raw data saved to {}", raw_path.display());
    tracing::info!("cleaned and saved as {}", flat_path.display());
    Ok((raw_path, flat_path))
}

/// Full run: resolve constituents, build the instrument list from `config`,
/// download, and persist both tables.
pub async fn collect<Pr, Fb, P, S>(
    config: &CollectConfig,
    resolver: &TickerResolver<Pr, Fb>,
    downloader: &BulkDownloader<P>,
    sink: &mut S,
    observer: &mut dyn DownloadObserver,
) -> Result<CollectSummary, CollectError>
where
    Pr: ConstituentSource,
    Fb: ConstituentSource,
    P: PriceProvider,
    S: TableSink + ?Sized,
{
    config.validate()?;

    let sp500 = resolver.resolve().await?;
    let instruments = config.instruments(sp500);
    tracing::info!("total to fetch: {}", instruments.len());

    let tables = build_tables(downloader, &instruments, &config.date_range(), observer).await?;
    let (raw_path, flat_path) = persist(sink, &tables)?;

    Ok(CollectSummary {
        instruments: instruments.len(),
        failed: tables.failed,
        rows: tables.raw.n_rows(),
        columns: tables.raw.n_cols(),
        raw_path,
        flat_path,
    })
}

fn log_table_shape(table: &RawPriceTable) {
    tracing::info!(
        "table shape: {} rows x {} columns",
        table.n_rows(),
        table.n_cols()
    );
    tracing::info!(
        "index: {} ({} -> {})",
        INDEX_NAME,
        table.index().first().map(|d| d.to_string()).unwrap_or_default(),
        table.index().last().map(|d| d.to_string()).unwrap_or_default()
    );
    tracing::info!("column level names: [{}, {}]", INSTRUMENT_LEVEL, FIELD_LEVEL);
    let sample: Vec<String> = table
        .columns()
        .iter()
        .take(10)
        .map(|(t, f)| format!("({}, {})", t, f.label()))
        .collect();
    tracing::info!("sample columns: {}", sample.join(", "));
}
