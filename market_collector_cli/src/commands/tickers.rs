//! The `tickers` subcommand: resolve and print the constituent list only.

use anyhow::{Context, Result};
use clap::Args;

use crate::commands::collect::SourceArgs;
use crate::output::{self, OutputFormat};

/// Arguments for the `tickers` subcommand.
#[derive(Args, Debug, Clone)]
pub struct TickersArgs {
    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub output: OutputFormat,

    #[command(flatten)]
    pub sources: SourceArgs,
}

pub async fn run(args: &TickersArgs) -> Result<()> {
    let resolver = args.sources.resolver()?;
    let tickers = resolver
        .resolve()
        .await
        .context("could not resolve S&P 500 constituents")?;
    output::print_tickers(&tickers, args.output)
}
