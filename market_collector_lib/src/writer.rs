//! CSV persistence of price tables.
//!
//! The raw table is written with a three-row header (instrument level,
//! field level, index name) and the flat table with a single header row.
//! Missing cells are written as empty fields.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::{FLAT_FILE_NAME, RAW_FILE_NAME};
use crate::error::CollectError;
use crate::table::{FlatPriceTable, RawPriceTable, FIELD_LEVEL, INDEX_NAME, INSTRUMENT_LEVEL};

/// Destination for the two output tables.
pub trait TableSink {
    /// Persists both tables, or neither, and returns where they went as
    /// `(raw, flat)`.
    fn write_tables(
        &mut self,
        raw: &RawPriceTable,
        flat: &FlatPriceTable,
    ) -> Result<(PathBuf, PathBuf), CollectError>;
}

/// Writes `sp500_data.csv` and `market_data.csv` into a directory,
/// creating it on first write. Existing files are replaced.
///
/// Both tables are first written to sibling temp files. Only when both
/// writes succeed are they renamed into place; if the second rename fails
/// the first target is restored from its backup.
#[derive(Debug, Clone)]
pub struct CsvDirectory {
    dir: PathBuf,
}

impl CsvDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn raw_path(&self) -> PathBuf {
        self.dir.join(RAW_FILE_NAME)
    }

    pub fn flat_path(&self) -> PathBuf {
        self.dir.join(FLAT_FILE_NAME)
    }

    fn sibling(&self, target: &Path, suffix: &str) -> PathBuf {
        let name = target
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("table.csv");
        self.dir.join(format!(".{}.{}", name, suffix))
    }

    /// Writes one table to its temp file and returns the temp path.
    fn stage<F>(&self, target: &Path, write: F) -> Result<PathBuf, CollectError>
    where
        F: FnOnce(fs::File) -> Result<(), csv::Error>,
    {
        let tmp = self.sibling(target, "tmp");
        let result = fs::File::create(&tmp)
            .map_err(CollectError::from)
            .and_then(|file| write(file).map_err(CollectError::from));
        if let Err(e) = result {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        Ok(tmp)
    }

    /// Renames `tmp` over `target`, moving an existing file aside first.
    /// Returns the backup path, if there was something to back up.
    fn swap_in(&self, tmp: &Path, target: &Path) -> Result<Option<PathBuf>, CollectError> {
        let backup = if target.is_file() {
            let backup = self.sibling(target, "bak");
            fs::rename(target, &backup)?;
            Some(backup)
        } else {
            None
        };
        if let Err(e) = fs::rename(tmp, target) {
            if let Some(backup) = &backup {
                let _ = fs::rename(backup, target);
            }
            return Err(e.into());
        }
        Ok(backup)
    }

    /// Moves every staged file into place, or restores the previous state.
    fn commit(&self, staged: &[(PathBuf, PathBuf)]) -> Result<(), CollectError> {
        let mut swapped: Vec<(&Path, Option<PathBuf>)> = Vec::with_capacity(staged.len());
        for (tmp, target) in staged {
            match self.swap_in(tmp, target) {
                Ok(backup) => swapped.push((target.as_path(), backup)),
                Err(e) => {
                    for (target, backup) in swapped.into_iter().rev() {
                        match backup {
                            Some(backup) => {
                                let _ = fs::rename(backup, target);
                            }
                            None => {
                                let _ = fs::remove_file(target);
                            }
                        }
                    }
                    discard(staged);
                    return Err(e);
                }
            }
        }
        for (_, backup) in swapped {
            if let Some(backup) = backup {
                let _ = fs::remove_file(backup);
            }
        }
        Ok(())
    }
}

fn discard(staged: &[(PathBuf, PathBuf)]) {
    for (tmp, _) in staged {
        let _ = fs::remove_file(tmp);
    }
}

impl TableSink for CsvDirectory {
    fn write_tables(
        &mut self,
        raw: &RawPriceTable,
        flat: &FlatPriceTable,
    ) -> Result<(PathBuf, PathBuf), CollectError> {
        fs::create_dir_all(&self.dir)?;
        let raw_path = self.raw_path();
        let flat_path = self.flat_path();

        let raw_tmp = self.stage(&raw_path, |f| write_raw_csv(f, raw))?;
        let flat_tmp = match self.stage(&flat_path, |f| write_flat_csv(f, flat)) {
            Ok(tmp) => tmp,
            Err(e) => {
                let _ = fs::remove_file(&raw_tmp);
                return Err(e);
            }
        };

        self.commit(&[(raw_tmp, raw_path.clone()), (flat_tmp, flat_path.clone())])?;
        Ok((raw_path, flat_path))
    }
}

/// Raw layout:
///
/// ```text
/// Ticker,AAPL,AAPL,...
/// Price,Open,High,...
/// Date,,,...
/// 2024-01-02,187.15,188.44,...
/// ```
pub fn write_raw_csv<W: Write>(writer: W, table: &RawPriceTable) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut instruments = Vec::with_capacity(table.n_cols() + 1);
    instruments.push(INSTRUMENT_LEVEL.to_string());
    instruments.extend(table.columns().iter().map(|(t, _)| t.to_string()));
    wtr.write_record(&instruments)?;

    let mut fields = Vec::with_capacity(table.n_cols() + 1);
    fields.push(FIELD_LEVEL.to_string());
    fields.extend(table.columns().iter().map(|(_, f)| f.label().to_string()));
    wtr.write_record(&fields)?;

    let mut index_header = vec![String::new(); table.n_cols() + 1];
    index_header[0] = INDEX_NAME.to_string();
    wtr.write_record(&index_header)?;

    write_rows(&mut wtr, table.index(), table.rows())?;
    wtr.flush()?;
    Ok(())
}

/// Flat layout: `Date,<col>...` then one row per date.
pub fn write_flat_csv<W: Write>(writer: W, table: &FlatPriceTable) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(table.n_cols() + 1);
    header.push(INDEX_NAME.to_string());
    header.extend(table.columns().iter().cloned());
    wtr.write_record(&header)?;

    write_rows(&mut wtr, table.index(), table.rows())?;
    wtr.flush()?;
    Ok(())
}

fn write_rows<W: Write>(
    wtr: &mut csv::Writer<W>,
    index: &[chrono::NaiveDate],
    rows: &[Vec<Option<f64>>],
) -> Result<(), csv::Error> {
    for (date, row) in index.iter().zip(rows) {
        let mut record = Vec::with_capacity(row.len() + 1);
        record.push(date.format("%Y-%m-%d").to_string());
        record.extend(row.iter().map(|v| format_cell(*v)));
        wtr.write_record(&record)?;
    }
    Ok(())
}

fn format_cell(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => String::new(),
    }
}
