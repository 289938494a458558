use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::audit::{self, AuditMetadata, ACTION_DEMOGRAPHIC_LOOKUP};
use crate::core::person::ReconciliationRequest;
use crate::core::registry::RegistryPerson;
use crate::core::types::ReconciliationStatus;
use crate::matching::{MatchError, MatchOutcome, MatchingEngine};
use crate::reconciliation::diff::{compute_differences, summarize, FieldDifference};
use crate::registry::ports::{LookupOutcome, RegistryError, RegistryLookupPort};
use crate::utils::hashing::pseudonymise_or_redact;
use crate::utils::validation::{is_valid_nhs_number, postcode_district};

/// Message used when the matched NHS number cannot be retrieved
pub const MATCHED_PERSON_NOT_FOUND: &str = "Matched NHS number was not found in the registry";

/// Result of reconciling local demographics against the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationOutcome {
    /// Outcome of the search used to find the registry person
    pub match_outcome: MatchOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person: Option<RegistryPerson>,
    #[serde(default)]
    pub differences: Vec<FieldDifference>,
    pub status: ReconciliationStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ReconciliationOutcome {
    fn unmatched(match_outcome: MatchOutcome) -> Self {
        Self {
            match_outcome,
            person: None,
            differences: Vec::new(),
            status: ReconciliationStatus::LocalDemographicsDidNotMatchToAnNhsNumber,
            errors: Vec::new(),
        }
    }

    fn failed(mut self, message: impl Into<String>) -> Self {
        self.status = ReconciliationStatus::Error;
        self.errors.push(message.into());
        self
    }
}

/// Age band used in the completion log event
pub fn age_band(birth_date: Option<NaiveDate>, today: NaiveDate) -> &'static str {
    let Some(years) = birth_date.and_then(|b| today.years_since(b)) else {
        return "unknown";
    };
    match years {
        0..=15 => "0-15",
        16..=24 => "16-24",
        25..=44 => "25-44",
        45..=64 => "45-64",
        65..=84 => "65-84",
        _ => "85+",
    }
}

/// Matches a person, fetches the registry's record and compares it with local data
pub struct ReconciliationEngine<'a> {
    matcher: MatchingEngine<'a>,
    lookup: &'a dyn RegistryLookupPort,
    /// Reference date for age bands; today when unset
    today: Option<NaiveDate>,
}

impl<'a> ReconciliationEngine<'a> {
    pub fn new(matcher: MatchingEngine<'a>, lookup: &'a dyn RegistryLookupPort) -> Self {
        Self {
            matcher,
            lookup,
            today: None,
        }
    }

    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn matcher(&self) -> &MatchingEngine<'a> {
        &self.matcher
    }

    /// Reconcile one request.
    ///
    /// Lookup failures become an `Error` status with the registry's message preserved.
    ///
    /// # Errors
    ///
    /// Only configuration errors from the matching engine are returned as `Err`.
    pub async fn reconcile(
        &self,
        request: &ReconciliationRequest,
    ) -> Result<ReconciliationOutcome, MatchError> {
        let outcome = self.decide(request).await?;
        self.log_completion(request, &outcome);
        Ok(outcome)
    }

    async fn decide(
        &self,
        request: &ReconciliationRequest,
    ) -> Result<ReconciliationOutcome, MatchError> {
        // Searching works on a scrubbed copy; differences use the demographics as supplied
        let mut search_record = request.person.clone();
        let match_outcome = self.matcher.match_person(&mut search_record).await?;

        let Some(matched) = match_outcome.nhs_number.clone() else {
            return Ok(ReconciliationOutcome::unmatched(match_outcome));
        };

        let person = match self.fetch(matched.as_str(), "matched").await {
            Ok(LookupOutcome::Found(person)) => person,
            Ok(LookupOutcome::NotFound) => {
                let outcome = ReconciliationOutcome::unmatched(match_outcome);
                return Ok(outcome.failed(MATCHED_PERSON_NOT_FOUND));
            }
            Err(e) => {
                let outcome = ReconciliationOutcome::unmatched(match_outcome);
                return Ok(outcome.failed(e.to_string()));
            }
        };

        let differences = compute_differences(request, &person);
        let mut outcome = ReconciliationOutcome {
            match_outcome,
            status: ReconciliationStatus::from_difference_count(differences.len()),
            person: Some(person),
            differences,
            errors: Vec::new(),
        };

        let local = match request.local_nhs_number() {
            Some(local) if local != matched.as_str() => local,
            _ => return Ok(outcome),
        };

        if !is_valid_nhs_number(local) {
            outcome.status = ReconciliationStatus::LocalNhsNumberIsNotValid;
            return Ok(outcome);
        }

        match self.fetch(local, "local").await {
            Ok(LookupOutcome::NotFound) => {
                outcome.status = ReconciliationStatus::LocalNhsNumberIsNotFoundInNhs;
            }
            Ok(LookupOutcome::Found(current)) if current.nhs_number.as_str() != local => {
                tracing::debug!("Local NHS number has been superseded");
                outcome.status = ReconciliationStatus::LocalNhsNumberIsSuperseded;
            }
            Ok(LookupOutcome::Found(_)) => {}
            Err(e) => outcome = outcome.failed(e.to_string()),
        }
        Ok(outcome)
    }

    async fn fetch(&self, nhs_number: &str, purpose: &str) -> Result<LookupOutcome, RegistryError> {
        let salt = self.matcher.config().audit_salt.as_deref();
        let mut metadata = AuditMetadata::new();
        metadata.insert("nhs_number".to_string(), pseudonymise_or_redact(salt, nhs_number));
        metadata.insert("purpose".to_string(), purpose.to_string());
        audit::record(self.matcher.audit(), ACTION_DEMOGRAPHIC_LOOKUP, metadata).await;

        let result = self.lookup.lookup_by_identifier(nhs_number).await;
        if let Err(e) = &result {
            tracing::warn!("Registry lookup ({}) failed: {}", purpose, e);
        }
        result
    }

    fn log_completion(&self, request: &ReconciliationRequest, outcome: &ReconciliationOutcome) {
        let today = self
            .today
            .unwrap_or_else(|| chrono::Utc::now().date_naive());
        let person = &request.person;
        tracing::info!(
            target: "pds_match::reconciliation",
            age_band = age_band(person.parsed_birth_date(), today),
            gender = person.gender.as_deref().unwrap_or("unknown"),
            postcode_district = %person.postcode.as_deref().map(postcode_district).unwrap_or_default(),
            differences = %summarize(&outcome.differences),
            status = %outcome.status,
            match_stage = outcome.match_outcome.process_stage.as_deref().unwrap_or("none"),
            "reconciliation complete"
        );
    }
}
