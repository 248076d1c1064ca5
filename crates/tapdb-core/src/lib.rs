//! Domain types shared across the TAPDB workspace: listings, signatures,
//! matches, the brand registry, and matcher configuration.

use thiserror::Error;

pub mod brands;
pub mod config;
pub mod listing;
pub mod matches;
pub mod signature;

pub use brands::BrandRegistry;
pub use config::{load_matcher_config, load_matcher_config_from_env, MatcherConfig};
pub use listing::Listing;
pub use matches::PriceMatch;
pub use signature::{Signature, TargetModel, VariantTag};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read brands file {path}: {source}")]
    BrandsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse brands file: {0}")]
    BrandsFileParse(#[from] serde_yaml::Error),

    #[error("brands file validation failed: {0}")]
    Validation(String),
}
