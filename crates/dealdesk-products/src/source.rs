use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A marketplace contributing product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Ozon,
    Wildberries,
    Sbermegamarket,
}

impl Source {
    /// Every source, in the order results are merged and reported.
    pub const ALL: [Source; 3] = [Source::Ozon, Source::Wildberries, Source::Sbermegamarket];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Ozon => "ozon",
            Source::Wildberries => "wildberries",
            Source::Sbermegamarket => "sbermegamarket",
        }
    }

    /// Whether this marketplace's listings carry a product image.
    #[must_use]
    pub fn keeps_image(self) -> bool {
        matches!(self, Source::Ozon | Source::Sbermegamarket)
    }

    /// Whether this marketplace's listings carry a search-result position.
    #[must_use]
    pub fn keeps_index(self) -> bool {
        matches!(self, Source::Wildberries)
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown source '{0}'; expected ozon, wildberries or sbermegamarket")]
pub struct UnknownSource(pub String);

impl FromStr for Source {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Source::ALL
            .into_iter()
            .find(|source| source.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownSource(s.to_owned()))
    }
}

/// One value per [`Source`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BySource<T> {
    pub ozon: T,
    pub wildberries: T,
    pub sbermegamarket: T,
}

/// Raw listings per marketplace, as returned by the scrape service.
pub type ScrapeResponse = BySource<Vec<Value>>;

impl<T> BySource<T> {
    #[must_use]
    pub fn get(&self, source: Source) -> &T {
        match source {
            Source::Ozon => &self.ozon,
            Source::Wildberries => &self.wildberries,
            Source::Sbermegamarket => &self.sbermegamarket,
        }
    }

    pub fn get_mut(&mut self, source: Source) -> &mut T {
        match source {
            Source::Ozon => &mut self.ozon,
            Source::Wildberries => &mut self.wildberries,
            Source::Sbermegamarket => &mut self.sbermegamarket,
        }
    }

    /// Entries in [`Source::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Source, &T)> {
        Source::ALL.into_iter().map(move |source| (source, self.get(source)))
    }

    pub fn map<'a, U>(&'a self, mut f: impl FnMut(Source, &'a T) -> U) -> BySource<U> {
        BySource {
            ozon: f(Source::Ozon, &self.ozon),
            wildberries: f(Source::Wildberries, &self.wildberries),
            sbermegamarket: f(Source::Sbermegamarket, &self.sbermegamarket),
        }
    }
}
