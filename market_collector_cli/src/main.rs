mod commands;
mod output;
mod progress;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "collect-market-data")]
#[command(about = "Download S&P 500 daily price history into CSV files")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    collect: commands::collect::CollectArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve constituents, download history and write both CSV files (default)
    Collect(commands::collect::CollectArgs),
    /// Resolve and print the current S&P 500 constituents
    Tickers(commands::tickers::TickersArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("market_collector=info".parse()?)
                .add_directive("constituents=info".parse()?),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Collect(cli.collect)) {
        Commands::Collect(args) => commands::collect::run(&args).await?,
        Commands::Tickers(args) => commands::tickers::run(&args).await?,
    }

    Ok(())
}
