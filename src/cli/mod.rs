//! Command-line interface for pds-match.
//!
//! Available commands:
//!
//! - **match**: Run the search cascade for one set of demographics
//! - **reconcile**: Match, then compare local demographics with the registry's record
//! - **validate-nhs-number**: Check an NHS number's Modulus 11 check digit
//! - **strategies**: List the catalogued search strategies
//! - **serve**: Start the JSON API server
//!
//! ## Usage
//!
//! ```text
//! # Match against a fixture registry
//! pds-match match --registry registry.json --given OCTAVIA --family CHISLETT --birth-date 2008-09-20
//!
//! # Reconcile with a locally held NHS number, JSON output
//! pds-match reconcile --registry registry.json --nhs-number 9449306753 \
//!     --given OCTAVIA --family CHISLETT --birth-date 2008-09-20 --format json
//!
//! # Show the cascade a record would produce under cascade v1
//! pds-match strategies --show-cascade --strategy cascade --strategy-version 1 \
//!     --given OCTAVIA --family CHISLETT --birth-date 2008-09-05
//!
//! # Start the API
//! pds-match serve --registry registry.json --port 8080
//! ```

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::MatchingConfig;
use crate::core::person::PersonRecord;
use crate::registry::FixtureRegistry;
use crate::strategy::{latest_version, StrategySelection};

pub mod match_cmd;
pub mod nhs_number;
pub mod reconcile;
pub mod strategies;

#[derive(Parser)]
#[command(name = "pds-match")]
#[command(version)]
#[command(about = "Match patient demographics against the national registry")]
#[command(
    long_about = "pds-match resolves a partial demographic record to an NHS number.\n\nIt runs an ordered cascade of registry searches and reports:\n- A confidence-banded match status\n- The cascade stage that produced it\n- Field-by-field differences between local and registry demographics"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Match demographics to an NHS number
    Match(match_cmd::MatchArgs),

    /// Compare local demographics with the registry
    Reconcile(reconcile::ReconcileArgs),

    /// Check an NHS number's check digit
    ValidateNhsNumber(nhs_number::ValidateArgs),

    /// List search strategies
    Strategies(strategies::StrategiesArgs),

    /// Start the web server
    Serve(ServeArgs),
}

/// Demographic fields shared by the matching commands
#[derive(Args, Debug, Clone, Default)]
pub struct DemographicsArgs {
    /// Given name
    #[arg(long)]
    pub given: Option<String>,

    /// Family name
    #[arg(long)]
    pub family: Option<String>,

    /// Birth date (YYYY-MM-DD)
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub birth_date: Option<String>,

    /// Gender (male, female, other, unknown)
    #[arg(long)]
    pub gender: Option<String>,

    /// Phone number
    #[arg(long)]
    pub phone: Option<String>,

    /// Email address
    #[arg(long)]
    pub email: Option<String>,

    /// Postcode
    #[arg(long)]
    pub postcode: Option<String>,
}

impl DemographicsArgs {
    pub fn to_record(&self) -> PersonRecord {
        PersonRecord {
            given: self.given.clone(),
            family: self.family.clone(),
            birth_date: self.birth_date.clone(),
            gender: self.gender.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            postcode: self.postcode.clone(),
        }
    }
}

/// Configuration file plus per-run overrides
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path to a JSON matching configuration
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Strategy name (exact, fuzzy, cascade)
    #[arg(long)]
    pub strategy: Option<String>,

    /// Strategy version (defaults to the latest for --strategy)
    #[arg(long)]
    pub strategy_version: Option<u32>,

    /// Half-width of the birth-date range search, in months
    #[arg(long)]
    pub dob_range_months: Option<u32>,

    /// Never send gender to the registry
    #[arg(long)]
    pub no_gender: bool,

    /// Time budget for the whole cascade in seconds; 0 disables it
    #[arg(long)]
    pub timeout: Option<u64>,
}

impl ConfigArgs {
    /// Load the configuration file if given, then apply command-line overrides
    pub fn resolve(&self) -> anyhow::Result<MatchingConfig> {
        let mut config = match &self.config {
            Some(path) => MatchingConfig::load_from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => MatchingConfig::default(),
        };

        match (&self.strategy, self.strategy_version) {
            (Some(name), version) => {
                let version = version
                    .or_else(|| latest_version(name))
                    .ok_or_else(|| anyhow::anyhow!("Unknown strategy '{}'", name))?;
                config.strategy = StrategySelection::new(name.clone(), version);
            }
            (None, Some(version)) => config.strategy.version = version,
            (None, None) => {}
        }
        if let Some(months) = self.dob_range_months {
            config.dob_range_months = months;
        }
        if self.no_gender {
            config.include_gender = false;
        }
        if let Some(secs) = self.timeout {
            config.timeout_secs = (secs > 0).then_some(secs);
        }

        config.validate()?;
        Ok(config)
    }
}

/// Load a fixture registry with path context on failure
pub fn load_registry(path: &std::path::Path) -> anyhow::Result<FixtureRegistry> {
    FixtureRegistry::load_from_file(path)
        .with_context(|| format!("Failed to load registry {}", path.display()))
}

/// Build a single-threaded runtime for one command
pub fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}

#[derive(clap::Args)]
pub struct ServeArgs {
    /// Registry fixture file (JSON)
    #[arg(long, required = true)]
    pub registry: PathBuf,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Address to bind to
    #[arg(short, long, default_value = "127.0.0.1")]
    pub address: String,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Render an optional value for text and TSV output
pub(crate) fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}
