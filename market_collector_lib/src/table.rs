//! Date-indexed price tables in grouped and flattened form.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::download::DailyBar;
use crate::ticker::Ticker;

/// Name of the first column level (instrument).
pub const INSTRUMENT_LEVEL: &str = "Ticker";
/// Name of the second column level (price field).
pub const FIELD_LEVEL: &str = "Price";
/// Name of the row index.
pub const INDEX_NAME: &str = "Date";

/// A price field reported per instrument and day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
    AdjClose,
    Volume,
}

impl PriceField {
    /// Provider order of the fields within one instrument.
    pub const ALL: [PriceField; 6] = [
        PriceField::Open,
        PriceField::High,
        PriceField::Low,
        PriceField::Close,
        PriceField::AdjClose,
        PriceField::Volume,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PriceField::Open => "Open",
            PriceField::High => "High",
            PriceField::Low => "Low",
            PriceField::Close => "Close",
            PriceField::AdjClose => "Adj Close",
            PriceField::Volume => "Volume",
        }
    }

    fn value(self, bar: &DailyBar) -> f64 {
        match self {
            PriceField::Open => bar.open,
            PriceField::High => bar.high,
            PriceField::Low => bar.low,
            PriceField::Close => bar.close,
            PriceField::AdjClose => bar.adj_close,
            PriceField::Volume => bar.volume,
        }
    }
}

/// `{instrument}_{field}` with spaces and slashes removed.
pub fn flat_column_name(instrument: &str, field: &str) -> String {
    format!("{}_{}", instrument, field)
        .replace(' ', "")
        .replace('/', "")
}

/// Two-level table keyed by `(instrument, field)`, grouped by instrument.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawPriceTable {
    columns: Vec<(Ticker, PriceField)>,
    index: Vec<NaiveDate>,
    rows: Vec<Vec<Option<f64>>>,
}

impl RawPriceTable {
    /// Builds the table from per-instrument series.
    ///
    /// The index is the sorted union of every series' dates; an instrument
    /// with no bar on a given date has empty cells for that row. Instruments
    /// with no bars at all still get their six columns.
    pub fn from_series(series: Vec<(Ticker, Vec<DailyBar>)>) -> Self {
        let index: Vec<NaiveDate> = series
            .iter()
            .flat_map(|(_, bars)| bars.iter().map(|b| b.date))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let positions: BTreeMap<NaiveDate, usize> =
            index.iter().enumerate().map(|(i, d)| (*d, i)).collect();

        let n_cols = series.len() * PriceField::ALL.len();
        let mut rows = vec![vec![None; n_cols]; index.len()];
        let mut columns = Vec::with_capacity(n_cols);

        for (inst_idx, (ticker, bars)) in series.into_iter().enumerate() {
            let base = inst_idx * PriceField::ALL.len();
            for bar in &bars {
                let Some(&row) = positions.get(&bar.date) else {
                    continue;
                };
                for (offset, field) in PriceField::ALL.iter().enumerate() {
                    let v = field.value(bar);
                    rows[row][base + offset] = if v.is_finite() { Some(v) } else { None };
                }
            }
            for field in PriceField::ALL {
                columns.push((ticker.clone(), field));
            }
        }

        Self {
            columns,
            index,
            rows,
        }
    }

    /// True when there is no row or no column, i.e. nothing to persist.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty() || self.columns.is_empty()
    }

    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[(Ticker, PriceField)] {
        &self.columns
    }

    pub fn index(&self) -> &[NaiveDate] {
        &self.index
    }

    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.rows
    }

    #[cfg(test)]
    pub(crate) fn column_values(&self, col: usize) -> Vec<Option<f64>> {
        self.rows.iter().map(|r| r[col]).collect()
    }

    /// Renames every column to `{instrument}_{field}` and sorts the columns
    /// by name. Cell values and the index are carried over unchanged.
    pub fn flatten(&self) -> FlatPriceTable {
        let mut named: Vec<(String, usize)> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, (ticker, field))| (flat_column_name(ticker.as_str(), field.label()), i))
            .collect();
        named.sort_by(|a, b| a.0.cmp(&b.0));

        let rows = self
            .rows
            .iter()
            .map(|row| named.iter().map(|(_, src)| row[*src]).collect())
            .collect();

        FlatPriceTable {
            columns: named.into_iter().map(|(name, _)| name).collect(),
            index: self.index.clone(),
            rows,
        }
    }
}

/// Single-level table with `{instrument}_{field}` columns in sorted order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlatPriceTable {
    columns: Vec<String>,
    index: Vec<NaiveDate>,
    rows: Vec<Vec<Option<f64>>>,
}

impl FlatPriceTable {
    pub fn is_empty(&self) -> bool {
        self.index.is_empty() || self.columns.is_empty()
    }

    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn index(&self) -> &[NaiveDate] {
        &self.index
    }

    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.rows
    }

    #[cfg(test)]
    pub(crate) fn column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let col = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|r| r[col]).collect())
    }
}
