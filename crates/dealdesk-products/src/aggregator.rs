//! The product aggregator: three per-marketplace collections, each replaced
//! wholesale on update, queried together.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

use crate::product::Product;
use crate::source::{BySource, ScrapeResponse, Source};

/// Product listings from every marketplace.
///
/// Mutation goes through `&mut self` and always swaps a whole collection, so
/// readers never observe a partially written source.
#[derive(Debug, Clone, Default)]
pub struct ProductAggregator {
    collections: BySource<Vec<Product>>,
}

impl ProductAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace `source`'s listings with `raw_items`, keeping only recognized
    /// fields. Non-object items are skipped. Returns how many products were
    /// stored. Other sources are untouched.
    pub fn set_source(&mut self, source: Source, raw_items: &[Value]) -> usize {
        let mut skipped = 0usize;
        let products: Vec<Product> = raw_items
            .iter()
            .filter_map(|raw| match Product::from_raw(source, raw) {
                Ok(product) => Some(product),
                Err(e) => {
                    skipped += 1;
                    tracing::debug!(%source, error = %e, "skipping raw listing");
                    None
                }
            })
            .collect();

        if skipped > 0 {
            tracing::warn!(%source, skipped, "some listings could not be read");
        }
        tracing::debug!(%source, stored = products.len(), "source replaced");

        let stored = products.len();
        *self.collections.get_mut(source) = products;
        stored
    }

    /// Replace all three sources from one scrape-service response.
    pub fn apply_scrape(&mut self, response: &ScrapeResponse) {
        for source in Source::ALL {
            self.set_source(source, response.get(source));
        }
    }

    #[must_use]
    pub fn get_all(&self) -> &BySource<Vec<Product>> {
        &self.collections
    }

    #[must_use]
    pub fn products(&self, source: Source) -> &[Product] {
        self.collections.get(source)
    }

    /// Every product, tagged with its source, in source order.
    pub fn merged(&self) -> impl Iterator<Item = (Source, &Product)> {
        self.collections
            .iter()
            .flat_map(|(source, products)| products.iter().map(move |p| (source, p)))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.collections.iter().all(|(_, products)| products.is_empty())
    }

    pub fn clear(&mut self) {
        self.collections = BySource::default();
    }

    /// Products whose article equals `article`, ozon first, then
    /// wildberries, then sbermegamarket. Products without an article never
    /// match.
    #[must_use]
    pub fn find_by_article(&self, article: &str) -> Vec<&Product> {
        self.merged()
            .filter(|(_, p)| p.article.as_deref() == Some(article))
            .map(|(_, p)| p)
            .collect()
    }

    #[must_use]
    pub fn total_count(&self) -> usize {
        self.collections.iter().map(|(_, products)| products.len()).sum()
    }

    #[must_use]
    pub fn count_by_source(&self) -> BySource<usize> {
        self.collections.map(|_, products| products.len())
    }

    /// Mean price across all sources, rounded to two decimals (midpoint away
    /// from zero). Products without a finite numeric price are ignored;
    /// returns 0 when none have one.
    #[must_use]
    pub fn average_price(&self) -> f64 {
        let prices: Vec<f64> = self
            .merged()
            .filter_map(|(_, p)| p.price)
            .filter(|p| p.is_finite())
            .collect();

        if prices.is_empty() {
            return 0.0;
        }

        match exact_mean(&prices) {
            Some(mean) => mean
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
                .to_f64()
                .unwrap_or(0.0),
            None => {
                tracing::warn!(count = prices.len(), "price sum out of decimal range; using float mean");
                float_mean(&prices)
            }
        }
    }

    /// Per source, the products priced within `[min, max]`, in original order.
    #[must_use]
    pub fn by_price_range(&self, min: f64, max: f64) -> BySource<Vec<&Product>> {
        self.collections.map(|_, products| {
            products.iter().filter(|p| p.price_in(min, max)).collect()
        })
    }
}

/// Mean computed in decimal arithmetic; `None` if a price or the running
/// sum leaves `Decimal`'s range.
fn exact_mean(prices: &[f64]) -> Option<Decimal> {
    let total = prices
        .iter()
        .map(|p| Decimal::from_f64(*p))
        .try_fold(Decimal::ZERO, |acc, p| p.and_then(|p| acc.checked_add(p)))?;
    total.checked_div(Decimal::from(prices.len()))
}

/// Mean of finite prices. Each price is scaled down before summing so the
/// total cannot overflow.
#[allow(clippy::cast_precision_loss)]
fn float_mean(prices: &[f64]) -> f64 {
    let count = prices.len() as f64;
    let mean: f64 = prices.iter().map(|p| p / count).sum();
    if !mean.is_finite() {
        return 0.0;
    }
    let scaled = mean * 100.0;
    if scaled.is_finite() {
        scaled.round() / 100.0
    } else {
        mean
    }
}

#[cfg(test)]
#[path = "aggregator_test.rs"]
mod tests;
