//! Ticker symbols in the form the price provider expects.

use std::fmt;

use serde::Serialize;

/// Market index proxy appended when `include_index` is set.
pub const INDEX_SYMBOL: &str = "^GSPC";
/// Gold future proxy appended when `include_gold` is set.
pub const GOLD_SYMBOL: &str = "GC=F";
/// 13-week T-bill yield, used as the risk-free-rate proxy.
pub const RISK_FREE_SYMBOL: &str = "^IRX";

/// A normalized ticker symbol: uppercase, trimmed, no periods.
///
/// Share classes are published with a period (`BRK.B`) but Yahoo Finance
/// spells them with a hyphen (`BRK-B`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Ticker(String);

impl Ticker {
    /// Replaces `.` with `-`, trims whitespace and uppercases.
    pub fn normalize(raw: &str) -> Self {
        Self(raw.replace('.', "-").trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Normalizes every raw symbol, preserving order.
pub fn normalize_all<S: AsRef<str>>(raw: &[S]) -> Vec<Ticker> {
    raw.iter().map(|s| Ticker::normalize(s.as_ref())).collect()
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Ticker {
    fn from(raw: &str) -> Self {
        Self::normalize(raw)
    }
}
