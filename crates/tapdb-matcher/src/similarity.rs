//! Pairwise compatibility scoring.
//!
//! Scoring is gate-first: a cascade of hard rejections establishes that
//! two listings *could* be the same product before any text similarity is
//! consulted. A zero score means "not comparable", not "barely similar" —
//! the clustering engine treats the two identically, but the gates are
//! what keep false merges out.

use rust_decimal::Decimal;
use tapdb_core::{BrandRegistry, Listing, MatcherConfig, Signature, TargetModel, VariantTag};

/// Product types where a resolved subtype difference is disqualifying:
/// a hood film is not a bumper film, a front mat is not a full set.
const SUBTYPE_GATED_TYPES: &[&str] = &["ppf", "bodykit", "floormat"];

/// Variants that name a concrete hardware generation. A listing carrying
/// one of these never matches a listing with any other variant value.
const SPECIFIC_VARIANTS: &[VariantTag] = &[
    VariantTag::PreRefresh,
    VariantTag::Highland,
    VariantTag::Juniper,
    VariantTag::Plaid,
];

/// Raw bigram similarity between two normalized titles, in [0, 1].
///
/// This is the ungated metric: the aggregator reuses it for its final
/// sanity filter without any of the category gates below.
#[must_use]
pub fn title_similarity(a: &str, b: &str) -> f64 {
    strsim::sorensen_dice(a, b)
}

/// Whether two prices could belong to the same product.
///
/// Rejects once the larger price is more than `max_ratio` times the
/// smaller one.
#[must_use]
pub fn prices_compatible(a: Decimal, b: Decimal, max_ratio: Decimal) -> bool {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    hi <= lo * max_ratio
}

/// Score a pair of listings, `0.0` meaning "not comparable".
///
/// Hard-rejection gates run in order; if none fires, the normalized-title
/// similarity is boosted by categorical agreement and penalized for
/// low-confidence categorization, then clamped to [0, 1].
#[must_use]
pub fn score_pair(
    a: &Listing,
    b: &Listing,
    sig_a: &Signature,
    sig_b: &Signature,
    registry: &BrandRegistry,
    config: &MatcherConfig,
) -> f64 {
    if sig_a.product_type != sig_b.product_type {
        return 0.0;
    }
    if SUBTYPE_GATED_TYPES.contains(&sig_a.product_type.as_str())
        && !sig_a.product_subtype.is_empty()
        && !sig_b.product_subtype.is_empty()
        && sig_a.product_subtype != sig_b.product_subtype
    {
        return 0.0;
    }
    if sig_a.target_model != TargetModel::Universal
        && sig_b.target_model != TargetModel::Universal
        && sig_a.target_model != sig_b.target_model
    {
        return 0.0;
    }
    if (SPECIFIC_VARIANTS.contains(&sig_a.variant) || SPECIFIC_VARIANTS.contains(&sig_b.variant))
        && sig_a.variant != sig_b.variant
    {
        return 0.0;
    }
    if (registry.is_mat_specialist(&sig_a.brand) || registry.is_mat_specialist(&sig_b.brand))
        && !sig_a.material.is_empty()
        && !sig_b.material.is_empty()
        && sig_a.material != sig_b.material
    {
        return 0.0;
    }
    if !prices_compatible(a.price, b.price, config.max_price_ratio) {
        return 0.0;
    }

    let mut score = title_similarity(&sig_a.normalized_title, &sig_b.normalized_title);
    if sig_a.target_model == sig_b.target_model && sig_a.target_model != TargetModel::Universal {
        score += 0.10;
    }
    if sig_a.material == sig_b.material && !sig_a.material.is_empty() {
        score += 0.10;
    }
    if sig_a.product_subtype == sig_b.product_subtype && !sig_a.product_subtype.is_empty() {
        score += 0.15;
    }
    if sig_a.product_type == "other" {
        score *= 0.5;
    }
    score.clamp(0.0, 1.0)
}
