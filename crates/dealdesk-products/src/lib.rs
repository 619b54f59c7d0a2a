//! In-memory aggregation of marketplace product listings.
//!
//! Listings arrive per marketplace from an external scrape/import step and
//! are held as three independent collections that can be searched, filtered
//! and summarised together.

pub mod aggregator;
pub mod product;
pub mod source;

pub use aggregator::ProductAggregator;
pub use product::Product;
pub use source::{BySource, ScrapeResponse, Source, UnknownSource};
