use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::types::NhsNumber;

/// What the registry said about one search query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegistrySearchResult {
    /// Exactly one person, with the registry's confidence in `[0, 1]`
    Matched { nhs_number: NhsNumber, score: f64 },
    /// More than one person fits the query
    MultiMatched,
    Unmatched,
    Error { message: String },
}

impl RegistrySearchResult {
    pub fn matched(nhs_number: impl Into<String>, score: f64) -> Self {
        Self::Matched {
            nhs_number: NhsNumber::new(nhs_number),
            score,
        }
    }

    /// Short name of the result kind, for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Matched { .. } => "matched",
            Self::MultiMatched => "multi_matched",
            Self::Unmatched => "unmatched",
            Self::Error { .. } => "error",
        }
    }
}

/// Entry in a person's address history
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryAddress {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_end: Option<NaiveDate>,
}

/// Full demographics held by the registry for one person
///
/// Most fields are lists: the registry keeps historical values alongside the current one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryPerson {
    pub nhs_number: NhsNumber,
    #[serde(default)]
    pub given: Vec<String>,
    #[serde(default)]
    pub family: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default)]
    pub postcode: Vec<String>,
    #[serde(default)]
    pub email: Vec<String>,
    #[serde(default)]
    pub phone: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<RegistryAddress>,
    /// Registered general practice
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gp_practice: Option<String>,
}

impl RegistryPerson {
    pub fn new(nhs_number: impl Into<String>) -> Self {
        Self {
            nhs_number: NhsNumber::new(nhs_number),
            given: Vec::new(),
            family: Vec::new(),
            birth_date: None,
            gender: None,
            postcode: Vec::new(),
            email: Vec::new(),
            phone: Vec::new(),
            addresses: Vec::new(),
            gp_practice: None,
        }
    }
}
