mod board;
mod collection;
mod products;
mod tracked;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::products::ProductsCommands;

#[derive(Debug, Parser)]
#[command(name = "dealdesk")]
#[command(about = "Deal board and marketplace product summaries")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch deals from the document store and print them grouped by column
    Board {
        /// Column configuration file (defaults to `DEALDESK_COLUMNS_PATH`)
        #[arg(long)]
        columns: Option<PathBuf>,

        /// Refetch every N seconds until interrupted
        #[arg(long)]
        refresh_secs: Option<u64>,

        /// Print single-line JSON
        #[arg(long)]
        compact: bool,
    },
    /// List the products being tracked in the document store
    Tracked {
        /// Print single-line JSON
        #[arg(long)]
        compact: bool,
    },
    /// Inspect a scrape-service response file
    Products {
        #[command(subcommand)]
        command: ProductsCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Board {
            columns,
            refresh_secs,
            compact,
        } => {
            let config = dealdesk_core::load_app_config()?;
            init_tracing(&config.log_level)?;
            tracing::debug!(?config, "configuration loaded");
            board::run_board(&config, columns.as_deref(), refresh_secs, compact).await
        }
        Commands::Tracked { compact } => {
            let config = dealdesk_core::load_app_config()?;
            init_tracing(&config.log_level)?;
            tracing::debug!(?config, "configuration loaded");
            tracked::run_tracked(&config, compact).await
        }
        Commands::Products { command } => {
            let level =
                std::env::var("DEALDESK_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
            init_tracing(&level)?;
            products::run_products(command)
        }
    }
}

/// Logs go to stderr so stdout carries only JSON output.
fn init_tracing(level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T, compact: bool) -> anyhow::Result<()> {
    let rendered = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{rendered}");
    Ok(())
}
