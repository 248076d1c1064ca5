//! Three-pass clustering over the listing set.
//!
//! Each pass walks the unclaimed listings in canonical order, accumulates
//! candidate groups around a seed, and hands every candidate group to the
//! aggregator immediately. Only groups the aggregator emits claim their
//! members; rejected groups leave their listings eligible for later seeds
//! and later passes.
//!
//! Pass thresholds differ because the evidence differs: a registry brand
//! is strong identity evidence on its own (0.45), bare titles need much
//! higher textual agreement (0.65), and categorical bucketing sits in
//! between (0.50).

use std::collections::{BTreeMap, BTreeSet};

use tapdb_core::{BrandRegistry, Listing, MatcherConfig, PriceMatch, Signature, TargetModel};

use crate::aggregate::aggregate_group;
use crate::similarity::{prices_compatible, score_pair};

/// One claim flag per listing, indexed by canonical position.
///
/// A fresh `ClaimSet` is created per engine run and threaded explicitly
/// through the passes, so each pass is re-entrant and testable in
/// isolation.
#[derive(Debug)]
pub(crate) struct ClaimSet {
    claimed: Vec<bool>,
}

impl ClaimSet {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            claimed: vec![false; len],
        }
    }

    pub(crate) fn is_claimed(&self, idx: usize) -> bool {
        self.claimed[idx]
    }

    /// Mark a whole emitted group as consumed. Claiming is the single
    /// serialized step that preserves first-pass-wins semantics.
    pub(crate) fn claim_all(&mut self, group: &[usize]) {
        for &idx in group {
            self.claimed[idx] = true;
        }
    }

    pub(crate) fn claimed_count(&self) -> usize {
        self.claimed.iter().filter(|c| **c).count()
    }
}

/// Immutable per-run state shared by the passes: listings in canonical
/// order with their cached signatures.
pub(crate) struct RunContext<'a> {
    pub listings: &'a [Listing],
    pub signatures: &'a [Signature],
    pub registry: &'a BrandRegistry,
    pub config: &'a MatcherConfig,
}

impl RunContext<'_> {
    /// Accumulate a group around `seed` from the `candidates` that follow
    /// it in canonical order.
    ///
    /// A candidate joins when it is unclaimed, from a different store than
    /// the seed, scores at least `threshold` against the seed, and is
    /// price-compatible with *every* listing already accumulated — an
    /// existing member can veto an addition that passes against the seed
    /// alone.
    fn build_group(
        &self,
        seed: usize,
        candidates: &[usize],
        threshold: f64,
        claims: &ClaimSet,
    ) -> Vec<usize> {
        let mut group = vec![seed];
        for &cand in candidates {
            if claims.is_claimed(cand) {
                continue;
            }
            if self.listings[cand].store_id == self.listings[seed].store_id {
                continue;
            }
            let score = score_pair(
                &self.listings[seed],
                &self.listings[cand],
                &self.signatures[seed],
                &self.signatures[cand],
                self.registry,
                self.config,
            );
            if score < threshold {
                continue;
            }
            let compatible_with_all = group.iter().all(|&member| {
                prices_compatible(
                    self.listings[member].price,
                    self.listings[cand].price,
                    self.config.max_price_ratio,
                )
            });
            if !compatible_with_all {
                continue;
            }
            group.push(cand);
        }
        group
    }

    /// Walk `members` as seeds in order, emit every group that survives
    /// the aggregator, and claim the members of emitted matches.
    fn accumulate(
        &self,
        members: &[usize],
        threshold: f64,
        claims: &mut ClaimSet,
        matches: &mut Vec<PriceMatch>,
    ) {
        for (pos, &seed) in members.iter().enumerate() {
            if claims.is_claimed(seed) {
                continue;
            }
            let group = self.build_group(seed, &members[pos + 1..], threshold, claims);
            if group.len() < 2 || !has_two_stores(self.listings, &group) {
                continue;
            }
            if let Some(price_match) = aggregate_group(self, &group) {
                claims.claim_all(&group);
                matches.push(price_match);
            }
        }
    }
}

fn has_two_stores(listings: &[Listing], group: &[usize]) -> bool {
    group
        .iter()
        .map(|&idx| listings[idx].store_id.as_str())
        .collect::<BTreeSet<_>>()
        .len()
        >= 2
}

/// Pass 1 — brand-seeded grouping.
///
/// Partitions unclaimed listings whose detected brand is in the registry,
/// then accumulates within each brand partition at the low threshold.
pub(crate) fn pass_brand_seeded(
    ctx: &RunContext<'_>,
    claims: &mut ClaimSet,
    matches: &mut Vec<PriceMatch>,
) {
    let mut by_brand: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for idx in 0..ctx.listings.len() {
        if claims.is_claimed(idx) {
            continue;
        }
        let brand = ctx.signatures[idx].brand.as_str();
        if ctx.registry.is_known(brand) {
            by_brand.entry(brand).or_default().push(idx);
        }
    }

    for (brand, members) in &by_brand {
        tracing::debug!(brand = *brand, candidates = members.len(), "brand-seeded pass");
        ctx.accumulate(members, ctx.config.pass1_brand_threshold, claims, matches);
    }
}

/// Pass 2 — title-only grouping.
///
/// Considers every remaining listing with a confident category and enough
/// title signal; brand evidence is not required, so the threshold is high.
pub(crate) fn pass_title_only(
    ctx: &RunContext<'_>,
    claims: &mut ClaimSet,
    matches: &mut Vec<PriceMatch>,
) {
    let members: Vec<usize> = (0..ctx.listings.len())
        .filter(|&idx| {
            !claims.is_claimed(idx)
                && ctx.signatures[idx].product_type != "other"
                && ctx.listings[idx].title.chars().count() >= ctx.config.pass2_min_title_len
        })
        .collect();

    ctx.accumulate(&members, ctx.config.pass2_title_threshold, claims, matches);
}

/// Pass 3 — type+model fallback.
///
/// Buckets the remaining listings by `(product_type, target_model,
/// subtype-or-"generic")` and accumulates within buckets of at least two.
pub(crate) fn pass_type_model(
    ctx: &RunContext<'_>,
    claims: &mut ClaimSet,
    matches: &mut Vec<PriceMatch>,
) {
    let mut buckets: BTreeMap<(&str, TargetModel, &str), Vec<usize>> = BTreeMap::new();
    for idx in 0..ctx.listings.len() {
        if claims.is_claimed(idx) {
            continue;
        }
        let sig = &ctx.signatures[idx];
        let subtype = if sig.product_subtype.is_empty() {
            "generic"
        } else {
            sig.product_subtype.as_str()
        };
        buckets
            .entry((sig.product_type.as_str(), sig.target_model, subtype))
            .or_default()
            .push(idx);
    }

    for (key, members) in &buckets {
        if members.len() < 2 {
            continue;
        }
        tracing::debug!(
            product_type = key.0,
            model = %key.1,
            subtype = key.2,
            candidates = members.len(),
            "type+model fallback pass"
        );
        ctx.accumulate(members, ctx.config.pass3_bucket_threshold, claims, matches);
    }
}
