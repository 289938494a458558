use serde::{Deserialize, Serialize};

/// NHS number, the registry's 10-digit patient identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NhsNumber(pub String);

impl NhsNumber {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NhsNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Final status of a match attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchStatus {
    /// Single registry result at or above the match threshold
    Match,
    /// Single result between the potential and match thresholds
    PotentialMatch,
    /// Single result below the potential threshold
    LowConfidenceMatch,
    /// Registry reported several candidate people
    ManyMatch,
    /// No cascade entry produced a candidate
    NoMatch,
    /// Input was unusable, or the registry could not be consulted
    Error,
}

impl MatchStatus {
    /// Statuses that carry a numeric score
    #[must_use]
    pub fn is_scored(self) -> bool {
        matches!(
            self,
            Self::Match | Self::PotentialMatch | Self::LowConfidenceMatch
        )
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Match => "Match",
            Self::PotentialMatch => "PotentialMatch",
            Self::LowConfidenceMatch => "LowConfidenceMatch",
            Self::ManyMatch => "ManyMatch",
            Self::NoMatch => "NoMatch",
            Self::Error => "Error",
        };
        write!(f, "{s}")
    }
}

/// Quality classification of a single input field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataQuality {
    Valid,
    NotProvided,
    Invalid,
}

/// Relationship between locally held and registry held demographics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReconciliationStatus {
    NoDifferences,
    OneDifference,
    ManyDifferences,
    LocalDemographicsDidNotMatchToAnNhsNumber,
    LocalNhsNumberIsNotValid,
    LocalNhsNumberIsNotFoundInNhs,
    LocalNhsNumberIsSuperseded,
    Error,
}

impl ReconciliationStatus {
    /// Classify by number of differing fields
    #[must_use]
    pub fn from_difference_count(count: usize) -> Self {
        match count {
            0 => Self::NoDifferences,
            1 => Self::OneDifference,
            _ => Self::ManyDifferences,
        }
    }
}

impl std::fmt::Display for ReconciliationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NoDifferences => "NoDifferences",
            Self::OneDifference => "OneDifference",
            Self::ManyDifferences => "ManyDifferences",
            Self::LocalDemographicsDidNotMatchToAnNhsNumber => {
                "LocalDemographicsDidNotMatchToAnNhsNumber"
            }
            Self::LocalNhsNumberIsNotValid => "LocalNhsNumberIsNotValid",
            Self::LocalNhsNumberIsNotFoundInNhs => "LocalNhsNumberIsNotFoundInNhs",
            Self::LocalNhsNumberIsSuperseded => "LocalNhsNumberIsSuperseded",
            Self::Error => "Error",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scored_statuses() {
        assert!(MatchStatus::Match.is_scored());
        assert!(MatchStatus::PotentialMatch.is_scored());
        assert!(MatchStatus::LowConfidenceMatch.is_scored());
        assert!(!MatchStatus::ManyMatch.is_scored());
        assert!(!MatchStatus::NoMatch.is_scored());
        assert!(!MatchStatus::Error.is_scored());
    }

    #[test]
    fn test_reconciliation_status_from_count() {
        assert_eq!(
            ReconciliationStatus::from_difference_count(0),
            ReconciliationStatus::NoDifferences
        );
        assert_eq!(
            ReconciliationStatus::from_difference_count(1),
            ReconciliationStatus::OneDifference
        );
        assert_eq!(
            ReconciliationStatus::from_difference_count(5),
            ReconciliationStatus::ManyDifferences
        );
    }
}
