//! S&P 500 ticker resolution with a single primary-to-fallback switch.
//!
//! The primary source is tried once. Any failure there (network, status,
//! missing table or column) is logged and the fallback source is tried
//! exactly once. A fallback failure is fatal and carries both reasons.

use constituents::ConstituentSource;
use thiserror::Error;

use crate::ticker::{normalize_all, Ticker};

/// Outcome of a single attempt against one source.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Resolved {
        tickers: Vec<Ticker>,
        source: &'static str,
    },
    Failed {
        source: &'static str,
        reason: String,
    },
}

impl Resolution {
    /// Fetches from `source` and normalizes the result.
    pub async fn attempt<S>(source: &S) -> Self
    where
        S: ConstituentSource + ?Sized,
    {
        match source.fetch_symbols().await {
            Ok(raw) => Self::Resolved {
                tickers: normalize_all(&raw),
                source: source.name(),
            },
            Err(e) => Self::Failed {
                source: source.name(),
                reason: e.to_string(),
            },
        }
    }
}

/// Both sources failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolutionError {
    #[error("fallback source failed: {fallback} (primary source failed: {primary})")]
    Fallback { primary: String, fallback: String },
}

/// Resolves the constituent list from a primary source with one fallback.
pub struct TickerResolver<P, F> {
    primary: P,
    fallback: F,
}

impl<P, F> TickerResolver<P, F>
where
    P: ConstituentSource,
    F: ConstituentSource,
{
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }

    #[cfg(test)]
    pub(crate) fn primary(&self) -> &P {
        &self.primary
    }

    #[cfg(test)]
    pub(crate) fn fallback(&self) -> &F {
        &self.fallback
    }

    /// Returns normalized tickers in source order.
    pub async fn resolve(&self) -> Result<Vec<Ticker>, ResolutionError> {
        tracing::info!("fetching S&P 500 constituents from {}", self.primary.name());

        let primary_reason = match Resolution::attempt(&self.primary).await {
            Resolution::Resolved { tickers, source } => {
                tracing::info!("got {} tickers from {}", tickers.len(), source);
                return Ok(tickers);
            }
            Resolution::Failed { source, reason } => {
                tracing::warn!(
                    "{} failed ({}); using {} fallback",
                    source,
                    reason,
                    self.fallback.name()
                );
                reason
            }
        };

        match Resolution::attempt(&self.fallback).await {
            Resolution::Resolved { tickers, source } => {
                tracing::info!("got {} tickers from {}", tickers.len(), source);
                Ok(tickers)
            }
            Resolution::Failed { reason, .. } => Err(ResolutionError::Fallback {
                primary: primary_reason,
                fallback: reason,
            }),
        }
    }
}
