//! Final quality gate and match construction.
//!
//! The aggregator turns a candidate group into an emitted [`PriceMatch`]
//! or rejects it. Its similarity check deliberately bypasses the gated
//! scorer: the group already passed the category gates during clustering,
//! so this is a pure text sanity filter over every member pair.

use std::collections::BTreeSet;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use sha2::{Digest, Sha256};

use tapdb_core::PriceMatch;

use crate::cluster::RunContext;
use crate::similarity::title_similarity;

/// Length of the hex-encoded match key.
const MATCH_KEY_LEN: usize = 16;

/// Build a [`PriceMatch`] from a candidate group, or reject it.
///
/// `group` holds canonical listing indices with the seed first. Gates:
/// savings percentage within the configured band, absolute savings above
/// the floor, and mean pairwise title similarity above the floor.
pub(crate) fn aggregate_group(ctx: &RunContext<'_>, group: &[usize]) -> Option<PriceMatch> {
    // Ascending by price; stable, so equal prices keep canonical order.
    let mut members = group.to_vec();
    members.sort_by_key(|&idx| ctx.listings[idx].price);

    let lowest_price = ctx.listings[members[0]].price;
    let highest_price = ctx.listings[members[members.len() - 1]].price;
    let savings = highest_price - lowest_price;
    let savings_percent = percent_of(savings, highest_price);
    let avg_title_similarity = mean_pairwise_similarity(ctx, &members);

    if savings_percent < ctx.config.min_savings_percent
        || savings_percent > ctx.config.max_savings_percent
        || savings < ctx.config.min_savings
        || avg_title_similarity < ctx.config.min_group_similarity
    {
        tracing::debug!(
            seed = %ctx.listings[group[0]].source_url,
            members = group.len(),
            %savings,
            savings_percent,
            avg_title_similarity,
            "group rejected by quality gate"
        );
        return None;
    }

    let primary = &ctx.signatures[group[0]];
    let brand = if primary.brand.is_empty() {
        "generic".to_string()
    } else {
        primary.brand.clone()
    };
    let models: BTreeSet<_> = members
        .iter()
        .map(|&idx| ctx.signatures[idx].target_model)
        .collect();
    let listings: Vec<_> = members
        .iter()
        .map(|&idx| ctx.listings[idx].clone())
        .collect();

    Some(PriceMatch {
        match_key: match_key(&listings.iter().map(|l| l.source_url.as_str()).collect::<Vec<_>>()),
        category: primary.product_type.clone(),
        subtype: primary.product_subtype.clone(),
        brand,
        models,
        listings,
        lowest_price,
        highest_price,
        savings,
        savings_percent,
        avg_title_similarity,
    })
}

/// `round(100 * part / whole)` with conventional half-away-from-zero
/// rounding. `whole` is a listing price, so it is strictly positive.
fn percent_of(part: Decimal, whole: Decimal) -> u32 {
    (part * Decimal::ONE_HUNDRED / whole)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .unwrap_or(u32::MAX)
}

/// Mean ungated title similarity over all member pairs.
fn mean_pairwise_similarity(ctx: &RunContext<'_>, members: &[usize]) -> f64 {
    let mut total = 0.0;
    let mut pairs = 0u32;
    for (pos, &a) in members.iter().enumerate() {
        for &b in &members[pos + 1..] {
            total += title_similarity(
                &ctx.signatures[a].normalized_title,
                &ctx.signatures[b].normalized_title,
            );
            pairs += 1;
        }
    }
    if pairs == 0 {
        return 0.0;
    }
    total / f64::from(pairs)
}

/// Deterministic key for a match: SHA-256 over the sorted member URLs,
/// truncated. Stable across runs and input permutations.
fn match_key(source_urls: &[&str]) -> String {
    let mut sorted: Vec<&str> = source_urls.to_vec();
    sorted.sort_unstable();
    let digest = Sha256::digest(sorted.join("\n").as_bytes());
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    hex[..MATCH_KEY_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use tapdb_core::{BrandRegistry, Listing, MatcherConfig};

    use super::*;
    use crate::cluster::RunContext;
    use crate::extract::extract;

    fn make_listing(title: &str, price: Decimal, store: &str) -> Listing {
        Listing {
            title: title.to_string(),
            price,
            currency: "USD".to_string(),
            store_id: store.to_string(),
            store_name: store.to_uppercase(),
            source_url: format!(
                "https://{store}.example.com/products/{}",
                title.to_lowercase().replace(' ', "-")
            ),
            image_url: None,
            vendor: None,
            declared_product_type: None,
            tags: Vec::new(),
        }
    }

    fn run_aggregate(listings: &[Listing]) -> Option<PriceMatch> {
        let registry = BrandRegistry::builtin();
        let config = MatcherConfig::default();
        let signatures: Vec<_> = listings.iter().map(|l| extract(l, &registry)).collect();
        let ctx = RunContext {
            listings,
            signatures: &signatures,
            registry: &registry,
            config: &config,
        };
        let group: Vec<usize> = (0..listings.len()).collect();
        aggregate_group(&ctx, &group)
    }

    #[test]
    fn emits_match_with_expected_metrics() {
        let listings = vec![
            make_listing(
                "Sunshade for Model Y Glass Roof",
                Decimal::from(149),
                "storeb",
            ),
            make_listing(
                "Sunshade for Model Y Glass Roof",
                Decimal::from(129),
                "storea",
            ),
        ];
        let m = run_aggregate(&listings).expect("expected an emitted match");
        assert_eq!(m.lowest_price, Decimal::from(129));
        assert_eq!(m.highest_price, Decimal::from(149));
        assert_eq!(m.savings, Decimal::from(20));
        assert_eq!(m.savings_percent, 13);
        assert_eq!(m.listings[0].store_id, "storea");
        assert_eq!(m.brand, "generic");
        assert!(m.avg_title_similarity > 0.99);
    }

    #[test]
    fn rejects_when_savings_percent_below_floor() {
        let listings = vec![
            make_listing("Sunshade for Model Y Glass Roof", Decimal::from(500), "storea"),
            make_listing("Sunshade for Model Y Glass Roof", Decimal::from(505), "storeb"),
        ];
        // Savings 5 is at the absolute floor but only 1%.
        assert!(run_aggregate(&listings).is_none());
    }

    #[test]
    fn rejects_when_absolute_savings_below_floor() {
        let listings = vec![
            make_listing("Sunshade for Model Y Glass Roof", Decimal::from(100), "storea"),
            make_listing("Sunshade for Model Y Glass Roof", Decimal::from(104), "storeb"),
        ];
        // 4% is within the band, but savings 4 < 5.
        assert!(run_aggregate(&listings).is_none());
    }

    #[test]
    fn rejects_when_titles_disagree() {
        let listings = vec![
            make_listing("Sunshade for Model Y Glass Roof", Decimal::from(100), "storea"),
            make_listing("Roof Sun Shade Visor Mesh Foldable Kit", Decimal::from(120), "storeb"),
        ];
        assert!(run_aggregate(&listings).is_none());
    }

    #[test]
    fn match_key_is_order_independent() {
        let key_a = match_key(&["https://a.example.com/1", "https://b.example.com/2"]);
        let key_b = match_key(&["https://b.example.com/2", "https://a.example.com/1"]);
        assert_eq!(key_a, key_b);
        assert_eq!(key_a.len(), MATCH_KEY_LEN);
    }

    #[test]
    fn percent_rounds_half_away_from_zero() {
        assert_eq!(percent_of(Decimal::from(20), Decimal::from(149)), 13);
        assert_eq!(percent_of(Decimal::new(125, 1), Decimal::from(100)), 13);
        assert_eq!(percent_of(Decimal::ZERO, Decimal::from(100)), 0);
    }
}
