//! Sources for the current S&P 500 constituent list.
//!
//! Two public sources are supported: the Wikipedia constituents page (HTML,
//! first table, `Symbol` column) and the DataHub `constituents.csv` dataset.
//! Both return raw symbols exactly as published; normalization is left to
//! the caller.

mod datahub;
mod errors;
mod html;
mod user_agent;
mod wikipedia;

pub use self::datahub::{DataHubSource, DEFAULT_URL as DATAHUB_URL};
pub use self::errors::Error;
pub use self::html::first_table_column;
pub use self::user_agent::get_user_agent;
pub use self::wikipedia::{
    WikipediaSource, DEFAULT_URL as WIKIPEDIA_URL, REQUEST_TIMEOUT as WIKIPEDIA_TIMEOUT,
};

/// Name of the column holding ticker symbols in both sources.
pub const SYMBOL_COLUMN: &str = "Symbol";

/// A remote listing of index constituents.
#[async_trait::async_trait]
pub trait ConstituentSource {
    /// Short label used in log output.
    fn name(&self) -> &'static str;

    /// Fetches the raw symbols, in source order.
    async fn fetch_symbols(&self) -> Result<Vec<String>, Error>;
}
