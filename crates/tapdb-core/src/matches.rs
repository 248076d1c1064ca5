use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::listing::Listing;
use crate::signature::TargetModel;

/// A group of listings from at least two distinct stores judged to be the
/// same physical product.
///
/// Matches are terminal: once emitted by the clustering engine they are
/// never revisited, and each listing belongs to at most one match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceMatch {
    /// Deterministic key derived from the member `source_url`s.
    pub match_key: String,
    /// Product type shared by all members.
    pub category: String,
    /// Finer classification within the category, `""` when not applicable.
    pub subtype: String,
    /// Detected brand, or `"generic"` when none was detected.
    pub brand: String,
    /// Target models represented in the group.
    pub models: BTreeSet<TargetModel>,
    /// Member listings, ascending by price.
    pub listings: Vec<Listing>,
    pub lowest_price: Decimal,
    pub highest_price: Decimal,
    /// `highest_price - lowest_price`.
    pub savings: Decimal,
    /// `round(100 * savings / highest_price)`.
    pub savings_percent: u32,
    /// Mean pairwise title similarity across all member pairs, in [0, 1].
    pub avg_title_similarity: f64,
}

impl PriceMatch {
    /// Number of distinct stores represented in the match.
    #[must_use]
    pub fn store_count(&self) -> usize {
        self.listings
            .iter()
            .map(|l| l.store_id.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }
}
