use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::audit::{self, AuditMetadata, AuditPort, TracingAuditSink, ACTION_QUALITY_GATE_PASSED};
use crate::config::MatchingConfig;
use crate::core::person::{non_blank, PersonRecord};
use crate::core::query::{DateToken, NamedQuery, SearchQuery};
use crate::core::registry::RegistrySearchResult;
use crate::core::types::{MatchStatus, NhsNumber};
use crate::matching::quality::{
    DataQualityGate, DataQualityReport, DefaultFieldValidator, FieldValidator,
};
use crate::matching::MatchError;
use crate::registry::ports::RegistrySearchPort;
use crate::strategy::find_strategy;

/// Message carried by the outcome when the quality gate rejects the input
pub const INSUFFICIENT_QUALITY_MESSAGE: &str =
    "Given name, family name and birth date must all be valid to search the registry";

/// Message carried by the outcome when the cascade ran out of time with nothing found
pub const TIMED_OUT_MESSAGE: &str = "registry search timed out";

static DEFAULT_VALIDATOR: DefaultFieldValidator = DefaultFieldValidator { today: None };
static DEFAULT_AUDIT: TracingAuditSink = TracingAuditSink;

/// Result of one match attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub status: MatchStatus,

    /// Registry score; only set for scored statuses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nhs_number: Option<NhsNumber>,

    /// Cascade entry that produced this outcome
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_stage: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<DataQualityReport>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl MatchOutcome {
    fn new(status: MatchStatus) -> Self {
        Self {
            status,
            score: None,
            nhs_number: None,
            process_stage: None,
            quality: None,
            message: None,
        }
    }

    pub fn no_match() -> Self {
        Self::new(MatchStatus::NoMatch)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::new(MatchStatus::Error)
        }
    }

    #[must_use]
    pub fn with_quality(mut self, quality: DataQualityReport) -> Self {
        self.quality = Some(quality);
        self
    }
}

/// Best candidate seen so far in one cascade
///
/// Each observation consumes the value and returns the next one, so the cascade
/// loop folds results without shared mutable state.
#[derive(Debug, Clone, PartialEq, Default)]
enum RunningBest {
    #[default]
    Nothing,
    Many {
        stage: String,
    },
    Scored {
        status: MatchStatus,
        score: f64,
        nhs_number: NhsNumber,
        stage: String,
    },
}

impl RunningBest {
    /// A single match replaces the current best only with a strictly higher score;
    /// any score beats an unscored many-match
    fn with_scored(self, status: MatchStatus, score: f64, nhs_number: NhsNumber, stage: &str) -> Self {
        debug_assert!(status.is_scored(), "{status} does not carry a score");
        if matches!(&self, Self::Scored { score: best, .. } if score <= *best) {
            return self;
        }
        Self::Scored {
            status,
            score,
            nhs_number,
            stage: stage.to_string(),
        }
    }

    /// A many-match is kept only when nothing has been seen yet
    fn with_many(self, stage: &str) -> Self {
        match self {
            Self::Nothing => Self::Many {
                stage: stage.to_string(),
            },
            other => other,
        }
    }

    fn is_nothing(&self) -> bool {
        matches!(self, Self::Nothing)
    }

    fn into_outcome(self) -> MatchOutcome {
        match self {
            Self::Nothing => MatchOutcome::no_match(),
            Self::Many { stage } => MatchOutcome {
                process_stage: Some(stage),
                ..MatchOutcome::new(MatchStatus::ManyMatch)
            },
            Self::Scored {
                status,
                score,
                nhs_number,
                stage,
            } => MatchOutcome {
                score: Some(score),
                nhs_number: Some(nhs_number),
                process_stage: Some(stage),
                ..MatchOutcome::new(status)
            },
        }
    }
}

/// What one cascade entry contributed
enum EntryResult {
    Answer(RegistrySearchResult),
    Nothing,
    TimedOut,
}

/// Runs search cascades against the registry
pub struct MatchingEngine<'a> {
    search: &'a dyn RegistrySearchPort,
    validator: &'a dyn FieldValidator,
    audit: &'a dyn AuditPort,
    /// Configuration including strategy selection and thresholds
    config: MatchingConfig,
}

impl<'a> MatchingEngine<'a> {
    /// Create an engine with the default validator and tracing audit sink
    pub fn new(search: &'a dyn RegistrySearchPort, config: MatchingConfig) -> Self {
        Self {
            search,
            validator: &DEFAULT_VALIDATOR,
            audit: &DEFAULT_AUDIT,
            config,
        }
    }

    #[must_use]
    pub fn with_validator(mut self, validator: &'a dyn FieldValidator) -> Self {
        self.validator = validator;
        self
    }

    #[must_use]
    pub fn with_audit(mut self, audit: &'a dyn AuditPort) -> Self {
        self.audit = audit;
        self
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    pub(crate) fn audit(&self) -> &'a dyn AuditPort {
        self.audit
    }

    /// Build the configured strategy's cascade for a record
    ///
    /// # Errors
    ///
    /// Fails on an unknown strategy or version, or when the record has no usable birth date.
    pub fn cascade(&self, record: &PersonRecord) -> Result<Vec<NamedQuery>, MatchError> {
        let strategy = find_strategy(&self.config.strategy)?;
        strategy.cascade(record, &self.config.cascade_options())
    }

    /// Screen, search and band one record.
    ///
    /// Invalid optional fields are cleared from `record` by the quality gate.
    ///
    /// # Errors
    ///
    /// Only configuration errors are returned as `Err`. Poor input, registry failures
    /// and timeouts are reported through the outcome.
    pub async fn match_person(&self, record: &mut PersonRecord) -> Result<MatchOutcome, MatchError> {
        let quality = DataQualityGate::new(self.validator).assess(record);
        if !quality.is_sufficient() {
            tracing::debug!("Quality gate rejected record: {:?}", quality);
            return Ok(MatchOutcome::error(INSUFFICIENT_QUALITY_MESSAGE).with_quality(quality));
        }

        let cascade = self.cascade(record)?;

        let mut metadata = AuditMetadata::new();
        metadata.insert("strategy".to_string(), self.config.strategy.to_string());
        metadata.insert("cascade_entries".to_string(), cascade.len().to_string());
        audit::record(self.audit, ACTION_QUALITY_GATE_PASSED, metadata).await;

        Ok(self.run_cascade(&cascade).await.with_quality(quality))
    }

    async fn run_cascade(&self, cascade: &[NamedQuery]) -> MatchOutcome {
        // A budget too large to represent as an instant has no deadline
        let deadline = self
            .config
            .timeout()
            .and_then(|t| Instant::now().checked_add(t));
        let thresholds = self.config.thresholds;
        let mut best = RunningBest::default();
        let mut answered = false;

        for entry in cascade {
            let result = match self.search_entry(entry, deadline).await {
                EntryResult::Answer(result) => result,
                EntryResult::Nothing => continue,
                EntryResult::TimedOut => {
                    tracing::warn!("Cascade timed out before entry {}", entry.name);
                    if best.is_nothing() && !answered {
                        return MatchOutcome::error(TIMED_OUT_MESSAGE);
                    }
                    break;
                }
            };

            match result {
                RegistrySearchResult::Matched { nhs_number, score } => {
                    let status = thresholds.classify(score);
                    if status == MatchStatus::Match {
                        tracing::info!(stage = %entry.name, score, "Confirmed match");
                        return RunningBest::default()
                            .with_scored(status, score, nhs_number, &entry.name)
                            .into_outcome();
                    }
                    best = best.with_scored(status, score, nhs_number, &entry.name);
                }
                RegistrySearchResult::MultiMatched => best = best.with_many(&entry.name),
                RegistrySearchResult::Unmatched => answered = true,
                RegistrySearchResult::Error { .. } => {}
            }
        }

        best.into_outcome()
    }

    async fn search_entry(&self, entry: &NamedQuery, deadline: Option<Instant>) -> EntryResult {
        let call = self.search.search(&entry.query);
        let response = match deadline {
            Some(deadline) => match tokio::time::timeout_at(deadline, call).await {
                Ok(response) => response,
                Err(_) => return EntryResult::TimedOut,
            },
            None => call.await,
        };

        match response {
            Ok(Some(result)) => {
                tracing::debug!(stage = %entry.name, kind = result.kind(), "Cascade entry answered");
                if let RegistrySearchResult::Error { message } = &result {
                    tracing::warn!("Registry reported an error for {}: {}", entry.name, message);
                }
                EntryResult::Answer(result)
            }
            Ok(None) => {
                tracing::debug!(stage = %entry.name, "Cascade entry returned nothing");
                EntryResult::Nothing
            }
            Err(e) => {
                tracing::warn!("Registry search failed for {}: {}", entry.name, e);
                EntryResult::Nothing
            }
        }
    }

    /// Issue exactly one caller-shaped query, bypassing the cascade and the quality gate.
    ///
    /// Results are mapped by kind only: `Matched` becomes `Match` with the registry's score.
    ///
    /// # Errors
    ///
    /// Fails when a date token is malformed or none is supplied.
    pub async fn match_raw(
        &self,
        record: &PersonRecord,
        raw_dob_tokens: &[String],
    ) -> Result<MatchOutcome, MatchError> {
        let birth_date = raw_dob_tokens
            .iter()
            .map(|t| t.parse::<DateToken>())
            .collect::<Result<Vec<_>, _>>()?;
        if birth_date.is_empty() {
            return Err(MatchError::MissingBirthDate);
        }

        let owned = |v: Option<&String>| non_blank(v.map(String::as_str)).map(str::to_string);
        let gender = if self.config.include_gender {
            owned(record.gender.as_ref())
        } else {
            None
        };
        let query = SearchQuery {
            given: owned(record.given.as_ref()).into_iter().collect(),
            family: owned(record.family.as_ref()),
            birth_date,
            gender,
            phone: owned(record.phone.as_ref()),
            email: owned(record.email.as_ref()),
            postcode: owned(record.postcode.as_ref()),
            ..SearchQuery::default()
        };

        let outcome = match self.search.search(&query).await {
            Ok(Some(RegistrySearchResult::Matched { nhs_number, score })) => MatchOutcome {
                score: Some(score),
                nhs_number: Some(nhs_number),
                ..MatchOutcome::new(MatchStatus::Match)
            },
            Ok(Some(RegistrySearchResult::MultiMatched)) => MatchOutcome::new(MatchStatus::ManyMatch),
            Ok(Some(RegistrySearchResult::Unmatched) | None) => MatchOutcome::no_match(),
            Ok(Some(RegistrySearchResult::Error { message })) => MatchOutcome::error(message),
            Err(e) => MatchOutcome::error(e.to_string()),
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nhs(s: &str) -> NhsNumber {
        NhsNumber::new(s)
    }

    #[test]
    fn test_running_best_prefers_strictly_higher() {
        let best = RunningBest::default()
            .with_scored(MatchStatus::LowConfidenceMatch, 0.5, nhs("1"), "A")
            .with_scored(MatchStatus::PotentialMatch, 0.9, nhs("2"), "B")
            .with_scored(MatchStatus::PotentialMatch, 0.9, nhs("3"), "C")
            .with_scored(MatchStatus::LowConfidenceMatch, 0.6, nhs("4"), "D");

        let outcome = best.into_outcome();
        assert_eq!(outcome.status, MatchStatus::PotentialMatch);
        assert_eq!(outcome.nhs_number, Some(nhs("2")));
        assert_eq!(outcome.process_stage.as_deref(), Some("B"));
    }

    #[test]
    fn test_many_never_displaces_scored() {
        let best = RunningBest::default()
            .with_scored(MatchStatus::LowConfidenceMatch, 0.3, nhs("1"), "A")
            .with_many("B");
        assert_eq!(best.into_outcome().status, MatchStatus::LowConfidenceMatch);
    }

    #[test]
    fn test_first_many_is_kept() {
        let best = RunningBest::default().with_many("A").with_many("B");
        let outcome = best.into_outcome();
        assert_eq!(outcome.status, MatchStatus::ManyMatch);
        assert_eq!(outcome.process_stage.as_deref(), Some("A"));
        assert!(outcome.score.is_none());
    }

    #[test]
    fn test_scored_replaces_many() {
        let best = RunningBest::default()
            .with_many("A")
            .with_scored(MatchStatus::LowConfidenceMatch, 0.1, nhs("1"), "B");
        let outcome = best.into_outcome();
        assert_eq!(outcome.status, MatchStatus::LowConfidenceMatch);
        assert_eq!(outcome.score, Some(0.1));
    }

    #[test]
    fn test_nothing_is_no_match() {
        let outcome = RunningBest::default().into_outcome();
        assert_eq!(outcome.status, MatchStatus::NoMatch);
        assert!(outcome.score.is_none());
        assert!(outcome.nhs_number.is_none());
    }
}
