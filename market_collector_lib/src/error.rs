//! Error types for the library layer.

use std::fmt;

use crate::download::DownloadError;
use crate::resolver::ResolutionError;

/// Errors produced by a collection run, wrapping ticker resolution,
/// provider, and filesystem failures.
#[derive(Debug)]
pub enum CollectError {
    /// Both constituent sources failed.
    Resolution(ResolutionError),
    /// The price provider could not be set up or failed outright.
    Provider(DownloadError),
    /// The bulk download produced no data; nothing was written.
    EmptyDownload,
    /// Writing an output file failed.
    Io(std::io::Error),
    /// CSV encoding of an output table failed.
    Csv(csv::Error),
    /// User-provided configuration failed validation.
    InvalidInput(String),
}

impl fmt::Display for CollectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolution(e) => write!(f, "Ticker resolution failed: {}", e),
            Self::Provider(e) => write!(f, "Price provider error: {}", e),
            Self::EmptyDownload => write!(f, "Download returned an empty table"),
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::Csv(e) => write!(f, "CSV error: {}", e),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for CollectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Resolution(e) => Some(e),
            Self::Provider(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Csv(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ResolutionError> for CollectError {
    fn from(e: ResolutionError) -> Self {
        Self::Resolution(e)
    }
}

impl From<DownloadError> for CollectError {
    fn from(e: DownloadError) -> Self {
        Self::Provider(e)
    }
}

impl From<std::io::Error> for CollectError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<csv::Error> for CollectError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}
