//! Matching configuration.
//!
//! Resolved once at startup (from a JSON file, CLI flags, or defaults) and passed into
//! the engines at construction. Nothing in the engines reads process-wide state.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::matching::scoring::ConfidenceThresholds;
use crate::matching::MatchError;
use crate::strategy::{find_strategy, CascadeOptions, StrategySelection};

/// Default birth-date range half-width, in months
pub const DEFAULT_DOB_RANGE_MONTHS: u32 = 6;

/// Default time budget for one whole cascade
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Longest cascade time budget a configuration may ask for
pub const MAX_TIMEOUT_SECS: u64 = 24 * 60 * 60;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid confidence thresholds: {0}")]
    InvalidThresholds(String),

    #[error("Timeout of {0}s exceeds the maximum of {MAX_TIMEOUT_SECS}s")]
    InvalidTimeout(u64),

    #[error(transparent)]
    Strategy(#[from] MatchError),
}

/// Configuration for the matching and reconciliation engines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Strategy and version whose cascade is run
    pub strategy: StrategySelection,
    /// Half-width of the birth-date range used by range searches
    pub dob_range_months: u32,
    /// Site policy: send gender to the registry at all
    pub include_gender: bool,
    /// Score bands for single matches
    pub thresholds: ConfidenceThresholds,
    /// Time budget for a whole cascade; `None` disables the limit
    pub timeout_secs: Option<u64>,
    /// Salt for pseudonymising NHS numbers in audit metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_salt: Option<String>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            strategy: StrategySelection::default(),
            dob_range_months: DEFAULT_DOB_RANGE_MONTHS,
            include_gender: true,
            thresholds: ConfidenceThresholds::default(),
            timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
            audit_salt: None,
        }
    }
}

impl MatchingConfig {
    /// Load and validate configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check thresholds are ordered and in range, the timeout is bounded, and the strategy exists
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thresholds;
        if !(0.0..=1.0).contains(&t.potential_match_threshold)
            || !(0.0..=1.0).contains(&t.match_threshold)
        {
            return Err(ConfigError::InvalidThresholds(
                "thresholds must lie within [0, 1]".to_string(),
            ));
        }
        if t.potential_match_threshold > t.match_threshold {
            return Err(ConfigError::InvalidThresholds(format!(
                "potential match threshold {} exceeds match threshold {}",
                t.potential_match_threshold, t.match_threshold
            )));
        }
        if let Some(secs) = self.timeout_secs.filter(|&s| s > MAX_TIMEOUT_SECS) {
            return Err(ConfigError::InvalidTimeout(secs));
        }
        find_strategy(&self.strategy)?;
        Ok(())
    }

    pub fn cascade_options(&self) -> CascadeOptions {
        CascadeOptions {
            dob_range_months: self.dob_range_months,
            include_gender: self.include_gender,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
