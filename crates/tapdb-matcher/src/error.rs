use thiserror::Error;

#[derive(Debug, Error)]
pub enum MatcherError {
    #[error("invalid listing {source_url}: {reason}")]
    InvalidListing { source_url: String, reason: String },

    #[error("ambiguous listing identity: {source_url} appears with conflicting content")]
    AmbiguousListing { source_url: String },
}
