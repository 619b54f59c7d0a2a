//! `products` commands: load a scrape-service response file into a
//! [`ProductAggregator`] and print one view of it.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Subcommand;
use dealdesk_products::{BySource, Product, ProductAggregator, ScrapeResponse, Source};
use serde::Serialize;

use crate::print_json;

/// Sub-commands available under `products`.
#[derive(Debug, Subcommand)]
pub enum ProductsCommands {
    /// Listing counts per marketplace and the overall average price
    Summary {
        /// Scrape response JSON (`{"ozon": [...], "wildberries": [...], "sbermegamarket": [...]}`)
        #[arg(long)]
        file: PathBuf,
    },
    /// Listings with the given article number, across all marketplaces
    Find {
        #[arg(long)]
        file: PathBuf,

        #[arg(long)]
        article: String,
    },
    /// Listings priced within an inclusive range, per marketplace
    Range {
        #[arg(long)]
        file: PathBuf,

        #[arg(long)]
        min: f64,

        #[arg(long)]
        max: f64,
    },
    /// All listings from one marketplace
    List {
        #[arg(long)]
        file: PathBuf,

        #[arg(long)]
        source: Source,
    },
}

#[derive(Debug, PartialEq, Serialize)]
pub(crate) struct ProductsSummary {
    pub total: usize,
    pub by_source: BySource<usize>,
    pub average_price: f64,
}

pub(crate) fn summarize(store: &ProductAggregator) -> ProductsSummary {
    ProductsSummary {
        total: store.total_count(),
        by_source: store.count_by_source(),
        average_price: store.average_price(),
    }
}

pub(crate) fn run_products(command: ProductsCommands) -> anyhow::Result<()> {
    match command {
        ProductsCommands::Summary { file } => {
            let store = load_store(&file)?;
            print_json(&summarize(&store), false)
        }
        ProductsCommands::Find { file, article } => {
            let store = load_store(&file)?;
            let found = store.find_by_article(&article);
            tracing::info!(%article, matches = found.len(), "article search finished");
            print_json(&found, false)
        }
        ProductsCommands::Range { file, min, max } => {
            if min.is_nan() || max.is_nan() || min > max {
                anyhow::bail!("invalid price range: min {min} must not exceed max {max}");
            }
            let store = load_store(&file)?;
            print_json(&store.by_price_range(min, max), false)
        }
        ProductsCommands::List { file, source } => {
            let store = load_store(&file)?;
            let products: &[Product] = store.products(source);
            print_json(products, false)
        }
    }
}

fn load_store(path: &Path) -> anyhow::Result<ProductAggregator> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading scrape response {}", path.display()))?;
    let store = parse_store(&content)
        .with_context(|| format!("parsing scrape response {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        products = store.total_count(),
        "scrape response loaded"
    );
    Ok(store)
}

pub(crate) fn parse_store(content: &str) -> anyhow::Result<ProductAggregator> {
    let response: ScrapeResponse = serde_json::from_str(content)?;
    let mut store = ProductAggregator::new();
    store.apply_scrape(&response);
    Ok(store)
}
