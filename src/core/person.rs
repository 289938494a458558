use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format accepted for birth dates
pub const BIRTH_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse an ISO `YYYY-MM-DD` birth date
#[must_use]
pub fn parse_birth_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), BIRTH_DATE_FORMAT).ok()
}

/// Demographics supplied by a caller for one match attempt
///
/// Values are kept as supplied; the quality gate decides which of them are usable
/// and clears invalid optional fields before any query is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,

    /// ISO `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
}

impl PersonRecord {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_given(mut self, given: impl Into<String>) -> Self {
        self.given = Some(given.into());
        self
    }

    #[must_use]
    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = Some(family.into());
        self
    }

    #[must_use]
    pub fn with_birth_date(mut self, birth_date: impl Into<String>) -> Self {
        self.birth_date = Some(birth_date.into());
        self
    }

    #[must_use]
    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn with_postcode(mut self, postcode: impl Into<String>) -> Self {
        self.postcode = Some(postcode.into());
        self
    }

    /// Parsed birth date, if present and well formed
    pub fn parsed_birth_date(&self) -> Option<NaiveDate> {
        self.birth_date.as_deref().and_then(parse_birth_date)
    }
}

/// Treat blank strings as absent
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Demographics plus the NHS number the caller currently holds for the person
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nhs_number: Option<String>,

    #[serde(flatten)]
    pub person: PersonRecord,
}

impl ReconciliationRequest {
    pub fn new(nhs_number: Option<String>, person: PersonRecord) -> Self {
        Self { nhs_number, person }
    }

    /// Locally held NHS number, ignoring blanks
    pub fn local_nhs_number(&self) -> Option<&str> {
        non_blank(self.nhs_number.as_deref())
    }
}
