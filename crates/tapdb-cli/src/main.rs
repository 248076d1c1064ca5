//! Thin driver around the matching engine: loads a listings file, runs a
//! matching run, and writes the matches out. All algorithmic judgment
//! lives in `tapdb-matcher`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use tapdb_core::{load_matcher_config_from_env, BrandRegistry, Listing, PriceMatch};
use tapdb_matcher::MatchEngine;

#[derive(Debug, Parser)]
#[command(name = "tapdb-cli")]
#[command(about = "Cross-store accessory price matching")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Find cross-store matches in a listings file.
    Match {
        /// JSON file containing an array of listings.
        #[arg(long)]
        input: PathBuf,
        /// Where to write the matches JSON; stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Optional brands YAML extending the built-in registry.
        #[arg(long, env = "TAPDB_BRANDS_PATH")]
        brands: Option<PathBuf>,
    },
    /// Print the effective brand registry, one name per line.
    Brands {
        /// Optional brands YAML extending the built-in registry.
        #[arg(long, env = "TAPDB_BRANDS_PATH")]
        brands: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Match {
            input,
            output,
            brands,
        } => run_match(&input, output.as_deref(), brands.as_deref()),
        Commands::Brands { brands } => {
            let registry = load_registry(brands.as_deref())?;
            for name in registry.names() {
                println!("{name}");
            }
            Ok(())
        }
    }
}

fn load_registry(brands: Option<&Path>) -> anyhow::Result<BrandRegistry> {
    match brands {
        Some(path) => BrandRegistry::load(path)
            .with_context(|| format!("failed to load brand registry from {}", path.display())),
        None => Ok(BrandRegistry::builtin()),
    }
}

fn run_match(input: &Path, output: Option<&Path>, brands: Option<&Path>) -> anyhow::Result<()> {
    let config = load_matcher_config_from_env().context("invalid matcher configuration")?;
    let registry = load_registry(brands)?;

    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read listings from {}", input.display()))?;
    let listings: Vec<Listing> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse listings from {}", input.display()))?;

    let engine = MatchEngine::new(config, registry);
    let matches = engine.run(&listings).context("matching run failed")?;
    summarize(&matches);

    let rendered = serde_json::to_string_pretty(&matches).context("failed to render matches")?;
    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("failed to write matches to {}", path.display()))?;
            tracing::info!(path = %path.display(), "matches written");
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn summarize(matches: &[PriceMatch]) {
    let total_savings: Decimal = matches.iter().map(|m| m.savings).sum();
    let listings_matched: usize = matches.iter().map(|m| m.listings.len()).sum();
    tracing::info!(
        matches = matches.len(),
        listings_matched,
        %total_savings,
        "matching run complete"
    );
}
