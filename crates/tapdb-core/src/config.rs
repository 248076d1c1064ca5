use rust_decimal::Decimal;

use crate::ConfigError;

/// Tunable thresholds for a matching run.
///
/// The defaults are the calibrated production values; env vars with the
/// `TAPDB_` prefix override individual fields. All thresholds trade recall
/// for precision — raising them yields fewer, safer matches.
#[derive(Debug, Clone, PartialEq)]
pub struct MatcherConfig {
    /// Minimum pair score for the brand-seeded pass.
    pub pass1_brand_threshold: f64,
    /// Minimum pair score for the title-only pass.
    pub pass2_title_threshold: f64,
    /// Minimum pair score for the type+model fallback pass.
    pub pass3_bucket_threshold: f64,
    /// Titles shorter than this carry too little signal for the
    /// title-only pass.
    pub pass2_min_title_len: usize,
    /// Two prices are incompatible once `max / min` exceeds this ratio.
    pub max_price_ratio: Decimal,
    /// Minimum absolute savings (currency units) for a match to be worth
    /// emitting.
    pub min_savings: Decimal,
    /// Emitted savings percentage must fall in
    /// `[min_savings_percent, max_savings_percent]`.
    pub min_savings_percent: u32,
    pub max_savings_percent: u32,
    /// Minimum mean pairwise title similarity across an emitted group.
    pub min_group_similarity: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            pass1_brand_threshold: 0.45,
            pass2_title_threshold: 0.65,
            pass3_bucket_threshold: 0.50,
            pass2_min_title_len: 25,
            max_price_ratio: Decimal::TWO,
            min_savings: Decimal::from(5),
            min_savings_percent: 3,
            max_savings_percent: 50,
            min_group_similarity: 0.65,
        }
    }
}

/// Load matcher configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env
/// vars. Every variable has a default, so this only fails on malformed
/// values.
///
/// # Errors
///
/// Returns `ConfigError` if an override value cannot be parsed.
pub fn load_matcher_config() -> Result<MatcherConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_matcher_config_from_env()
}

/// Load matcher configuration from environment variables already in the
/// process.
///
/// Unlike [`load_matcher_config`], this does NOT load `.env` files — useful
/// for testing or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if an override value cannot be parsed.
pub fn load_matcher_config_from_env() -> Result<MatcherConfig, ConfigError> {
    build_matcher_config(|key| std::env::var(key))
}

/// Build matcher configuration using the provided env-var lookup function.
///
/// This is the core parsing logic, decoupled from the actual environment so
/// it can be tested with a pure `HashMap` lookup.
fn build_matcher_config<F>(lookup: F) -> Result<MatcherConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let defaults = MatcherConfig::default();

    let parse_f64 = |var: &str, default: f64| -> Result<f64, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw.parse::<f64>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Ok(default),
        }
    };

    let parse_u32 = |var: &str, default: u32| -> Result<u32, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Ok(default),
        }
    };

    let parse_usize = |var: &str, default: usize| -> Result<usize, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw.parse::<usize>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Ok(default),
        }
    };

    let parse_decimal = |var: &str, default: Decimal| -> Result<Decimal, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw
                .parse::<Decimal>()
                .map_err(|e| ConfigError::InvalidEnvVar {
                    var: var.to_string(),
                    reason: e.to_string(),
                }),
            Err(_) => Ok(default),
        }
    };

    Ok(MatcherConfig {
        pass1_brand_threshold: parse_f64(
            "TAPDB_PASS1_BRAND_THRESHOLD",
            defaults.pass1_brand_threshold,
        )?,
        pass2_title_threshold: parse_f64(
            "TAPDB_PASS2_TITLE_THRESHOLD",
            defaults.pass2_title_threshold,
        )?,
        pass3_bucket_threshold: parse_f64(
            "TAPDB_PASS3_BUCKET_THRESHOLD",
            defaults.pass3_bucket_threshold,
        )?,
        pass2_min_title_len: parse_usize("TAPDB_PASS2_MIN_TITLE_LEN", defaults.pass2_min_title_len)?,
        max_price_ratio: parse_decimal("TAPDB_MAX_PRICE_RATIO", defaults.max_price_ratio)?,
        min_savings: parse_decimal("TAPDB_MIN_SAVINGS", defaults.min_savings)?,
        min_savings_percent: parse_u32("TAPDB_MIN_SAVINGS_PERCENT", defaults.min_savings_percent)?,
        max_savings_percent: parse_u32("TAPDB_MAX_SAVINGS_PERCENT", defaults.max_savings_percent)?,
        min_group_similarity: parse_f64(
            "TAPDB_MIN_GROUP_SIMILARITY",
            defaults.min_group_similarity,
        )?,
    })
}
