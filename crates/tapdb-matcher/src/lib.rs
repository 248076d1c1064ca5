//! Cross-store product matching for TAPDB.
//!
//! Takes the listing catalogs collected from many independent accessory
//! stores and decides which listings describe the same physical product,
//! so prices can be compared across stores. There is no shared identifier
//! to join on; matching works from normalized titles, extracted signatures,
//! and a registry of known multi-store brands, tuned for high precision:
//! wrongly merging two different products is far worse than missing a
//! real match.

pub mod engine;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod similarity;

mod aggregate;
mod cluster;

pub use engine::MatchEngine;
pub use error::MatcherError;
pub use extract::extract;
pub use normalize::normalize;
pub use similarity::{score_pair, title_similarity};
