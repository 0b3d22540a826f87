//! Error types for the constituent sources.

/// Errors that can occur while fetching or parsing a constituent list.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Network error, timeout, or failure to read the body.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    /// The source answered with a non-success status.
    #[error("unexpected status {status}")]
    HttpStatus { status: u16 },
    /// The page contained no `<table>` element.
    #[error("no table found in page")]
    MissingTable,
    /// The expected column header was not present.
    #[error("column {0:?} not found")]
    MissingColumn(String),
    /// The column was present but held no symbols.
    #[error("source returned no symbols")]
    Empty,
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("parse error: {0}")]
    Parse(String),
}
