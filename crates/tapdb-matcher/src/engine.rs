//! Run orchestration: validation, canonical ordering, signature caching,
//! the three clustering passes, and final output ordering.

use std::collections::HashMap;

use tapdb_core::{BrandRegistry, Listing, MatcherConfig, PriceMatch};

use crate::cluster::{pass_brand_seeded, pass_title_only, pass_type_model, ClaimSet, RunContext};
use crate::error::MatcherError;
use crate::extract::extract;

/// The matching engine. Construction is cheap; all per-run state (the
/// signature cache and claim set) is created fresh inside [`run`].
///
/// [`run`]: MatchEngine::run
#[derive(Debug, Default)]
pub struct MatchEngine {
    config: MatcherConfig,
    registry: BrandRegistry,
}

impl MatchEngine {
    #[must_use]
    pub fn new(config: MatcherConfig, registry: BrandRegistry) -> Self {
        Self { config, registry }
    }

    /// Run the full matching pipeline over a batch of listings.
    ///
    /// Synchronous and deterministic: the same input set, in any order,
    /// produces byte-identical output. Returned matches are ordered by
    /// absolute savings, highest first.
    ///
    /// # Errors
    ///
    /// Returns [`MatcherError::InvalidListing`] for a non-positive price
    /// and [`MatcherError::AmbiguousListing`] when one `source_url`
    /// appears with conflicting content. The run fails as a whole;
    /// filtering bad records is the caller's job.
    pub fn run(&self, listings: &[Listing]) -> Result<Vec<PriceMatch>, MatcherError> {
        let ordered = validate_and_order(listings)?;
        tracing::info!(
            input = listings.len(),
            accepted = ordered.len(),
            "matching run started"
        );

        let signatures: Vec<_> = ordered
            .iter()
            .map(|listing| extract(listing, &self.registry))
            .collect();
        let ctx = RunContext {
            listings: &ordered,
            signatures: &signatures,
            registry: &self.registry,
            config: &self.config,
        };

        let mut claims = ClaimSet::new(ordered.len());
        let mut matches = Vec::new();

        pass_brand_seeded(&ctx, &mut claims, &mut matches);
        tracing::info!(
            matches = matches.len(),
            claimed = claims.claimed_count(),
            "brand-seeded pass complete"
        );

        pass_title_only(&ctx, &mut claims, &mut matches);
        tracing::info!(
            matches = matches.len(),
            claimed = claims.claimed_count(),
            "title-only pass complete"
        );

        pass_type_model(&ctx, &mut claims, &mut matches);
        tracing::info!(
            matches = matches.len(),
            claimed = claims.claimed_count(),
            "type+model fallback pass complete"
        );

        // Highest savings first; the stable sort keeps emission order for
        // ties, which is itself deterministic.
        matches.sort_by(|a, b| b.savings.cmp(&a.savings));
        Ok(matches)
    }
}

/// Validate the caller contract and produce the canonical processing
/// order: ascending by `(store_id, source_url)`.
///
/// `source_url` is the unique key, so this order is total and invariant
/// under input permutation — a requirement for reproducible output.
/// Exact duplicate records (same URL, identical content) are dropped with
/// a warning; conflicting duplicates abort the run.
fn validate_and_order(listings: &[Listing]) -> Result<Vec<Listing>, MatcherError> {
    let mut seen: HashMap<&str, &Listing> = HashMap::new();
    let mut accepted: Vec<Listing> = Vec::with_capacity(listings.len());

    for listing in listings {
        if listing.price.is_sign_negative() || listing.price.is_zero() {
            return Err(MatcherError::InvalidListing {
                source_url: listing.source_url.clone(),
                reason: format!("non-positive price {}", listing.price),
            });
        }
        match seen.get(listing.source_url.as_str()) {
            Some(first) if *first == listing => {
                tracing::warn!(
                    source_url = %listing.source_url,
                    "dropping exact duplicate listing"
                );
            }
            Some(_) => {
                return Err(MatcherError::AmbiguousListing {
                    source_url: listing.source_url.clone(),
                });
            }
            None => {
                seen.insert(listing.source_url.as_str(), listing);
                accepted.push(listing.clone());
            }
        }
    }

    accepted.sort_by(|a, b| {
        (a.store_id.as_str(), a.source_url.as_str()).cmp(&(b.store_id.as_str(), b.source_url.as_str()))
    });
    Ok(accepted)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn make_listing(source_url: &str, store: &str, price: Decimal) -> Listing {
        Listing {
            title: "Model Y Sunshade".to_string(),
            price,
            currency: "USD".to_string(),
            store_id: store.to_string(),
            store_name: store.to_uppercase(),
            source_url: source_url.to_string(),
            image_url: None,
            vendor: None,
            declared_product_type: None,
            tags: Vec::new(),
        }
    }

    #[test]
    fn rejects_zero_price() {
        let listings = vec![make_listing("https://a/1", "storea", Decimal::ZERO)];
        let err = validate_and_order(&listings).unwrap_err();
        assert!(
            matches!(err, MatcherError::InvalidListing { ref source_url, .. } if source_url == "https://a/1")
        );
    }

    #[test]
    fn rejects_negative_price() {
        let listings = vec![make_listing("https://a/1", "storea", Decimal::from(-5))];
        assert!(matches!(
            validate_and_order(&listings),
            Err(MatcherError::InvalidListing { .. })
        ));
    }

    #[test]
    fn rejects_conflicting_duplicate_url() {
        let listings = vec![
            make_listing("https://a/1", "storea", Decimal::from(10)),
            make_listing("https://a/1", "storea", Decimal::from(12)),
        ];
        let err = validate_and_order(&listings).unwrap_err();
        assert!(
            matches!(err, MatcherError::AmbiguousListing { ref source_url } if source_url == "https://a/1")
        );
    }

    #[test]
    fn drops_exact_duplicate() {
        let listings = vec![
            make_listing("https://a/1", "storea", Decimal::from(10)),
            make_listing("https://a/1", "storea", Decimal::from(10)),
        ];
        let ordered = validate_and_order(&listings).expect("expected success");
        assert_eq!(ordered.len(), 1);
    }

    #[test]
    fn orders_by_store_then_url() {
        let listings = vec![
            make_listing("https://b/2", "storeb", Decimal::from(10)),
            make_listing("https://a/2", "storea", Decimal::from(10)),
            make_listing("https://a/1", "storea", Decimal::from(10)),
        ];
        let ordered = validate_and_order(&listings).expect("expected success");
        let urls: Vec<_> = ordered.iter().map(|l| l.source_url.as_str()).collect();
        assert_eq!(urls, ["https://a/1", "https://a/2", "https://b/2"]);
    }
}
