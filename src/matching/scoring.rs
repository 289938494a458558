use serde::{Deserialize, Serialize};

use crate::core::types::MatchStatus;

/// Default score at or above which a single result is a confirmed match
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.95;

/// Default score at or above which a single result is a potential match
pub const DEFAULT_POTENTIAL_MATCH_THRESHOLD: f64 = 0.85;

/// Score bands for single registry matches
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceThresholds {
    pub match_threshold: f64,
    pub potential_match_threshold: f64,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            potential_match_threshold: DEFAULT_POTENTIAL_MATCH_THRESHOLD,
        }
    }
}

impl ConfidenceThresholds {
    /// Band a registry score into a match status
    ///
    /// | Score | Status |
    /// |-------|--------|
    /// | `>= match_threshold` | `Match` |
    /// | `>= potential_match_threshold` | `PotentialMatch` |
    /// | below | `LowConfidenceMatch` |
    #[must_use]
    pub fn classify(&self, score: f64) -> MatchStatus {
        if score >= self.match_threshold {
            MatchStatus::Match
        } else if score >= self.potential_match_threshold {
            MatchStatus::PotentialMatch
        } else {
            MatchStatus::LowConfidenceMatch
        }
    }
}
