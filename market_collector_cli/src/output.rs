use anyhow::Result;
use market_collector_lib::{CollectSummary, Ticker};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

#[derive(Tabled, Serialize)]
struct TickerRow {
    #[tabled(rename = "#")]
    #[serde(rename = "#")]
    position: usize,
    #[tabled(rename = "Symbol")]
    #[serde(rename = "Symbol")]
    symbol: String,
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Item")]
    item: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

// -- Row builders --

fn build_ticker_rows(tickers: &[Ticker]) -> Vec<TickerRow> {
    tickers
        .iter()
        .enumerate()
        .map(|(i, t)| TickerRow {
            position: i + 1,
            symbol: t.to_string(),
        })
        .collect()
}

fn build_summary_rows(summary: &CollectSummary) -> Vec<SummaryRow> {
    let failed = if summary.failed.is_empty() {
        "0".to_string()
    } else {
        let names: Vec<&str> = summary.failed.iter().map(Ticker::as_str).collect();
        format!("{} ({})", names.len(), names.join(", "))
    };
    vec![
        SummaryRow {
            item: "Instruments",
            value: summary.instruments.to_string(),
        },
        SummaryRow {
            item: "Failed",
            value: failed,
        },
        SummaryRow {
            item: "Rows",
            value: summary.rows.to_string(),
        },
        SummaryRow {
            item: "Columns",
            value: summary.columns.to_string(),
        },
        SummaryRow {
            item: "Raw file",
            value: summary.raw_path.display().to_string(),
        },
        SummaryRow {
            item: "Flat file",
            value: summary.flat_path.display().to_string(),
        },
    ]
}

// -- Rendering --

pub fn render_tickers(tickers: &[Ticker], format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Table => Table::new(build_ticker_rows(tickers)).to_string(),
        OutputFormat::Markdown => {
            let mut table = Table::new(build_ticker_rows(tickers));
            table.with(Style::markdown());
            table.to_string()
        }
        OutputFormat::Json => serde_json::to_string_pretty(tickers)?,
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(Vec::new());
            for row in build_ticker_rows(tickers) {
                wtr.serialize(row)?;
            }
            String::from_utf8(wtr.into_inner().map_err(|e| e.into_error())?)?
        }
    })
}

pub fn print_tickers(tickers: &[Ticker], format: OutputFormat) -> Result<()> {
    println!("{}", render_tickers(tickers, format)?.trim_end());
    Ok(())
}

pub fn print_summary(summary: &CollectSummary) {
    let mut table = Table::new(build_summary_rows(summary));
    table.with(Style::rounded());
    println!("{}", table);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn tickers() -> Vec<Ticker> {
        vec![Ticker::normalize("AAPL"), Ticker::normalize("brk.b")]
    }

    #[test]
    fn ticker_rows_are_numbered_from_one() {
        let rows = build_ticker_rows(&tickers());
        assert_eq!(rows[0].position, 1);
        assert_eq!(rows[1].position, 2);
        assert_eq!(rows[1].symbol, "BRK-B");
    }

    #[test]
    fn json_is_a_plain_array() {
        let out = render_tickers(&tickers(), OutputFormat::Json).unwrap();
        let parsed: Vec<String> = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, vec!["AAPL", "BRK-B"]);
    }

    #[test]
    fn csv_has_header_and_rows() {
        let out = render_tickers(&tickers(), OutputFormat::Csv).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines, vec!["#,Symbol", "1,AAPL", "2,BRK-B"]);
    }

    #[test]
    fn table_and_markdown_contain_symbols() {
        for format in [OutputFormat::Table, OutputFormat::Markdown] {
            let out = render_tickers(&tickers(), format).unwrap();
            assert!(out.contains("Symbol"));
            assert!(out.contains("AAPL"));
            assert!(out.contains("BRK-B"));
        }
        let md = render_tickers(&tickers(), OutputFormat::Markdown).unwrap();
        assert!(md.lines().next().unwrap().starts_with('|'));
    }

    #[test]
    fn summary_lists_failed_instruments() {
        let summary = CollectSummary {
            instruments: 505,
            failed: vec![Ticker::normalize("XYZ")],
            rows: 1200,
            columns: 3030,
            raw_path: PathBuf::from("data/sp500_data.csv"),
            flat_path: PathBuf::from("data/market_data.csv"),
        };
        let rows = build_summary_rows(&summary);
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[1].value, "1 (XYZ)");
        assert_eq!(rows[4].value, "data/sp500_data.csv");
    }
}
