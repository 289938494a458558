use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::person::{non_blank, ReconciliationRequest, BIRTH_DATE_FORMAT};
use crate::core::registry::RegistryPerson;

/// Separator used when a multi-valued registry field is reported as one string
pub const VALUE_SEPARATOR: &str = "|";

/// Fields compared during reconciliation, in report order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationField {
    NhsNumber,
    BirthDate,
    Gender,
    Given,
    Family,
    Email,
    Phone,
    Postcode,
}

impl ReconciliationField {
    pub const ALL: [Self; 8] = [
        Self::NhsNumber,
        Self::BirthDate,
        Self::Gender,
        Self::Given,
        Self::Family,
        Self::Email,
        Self::Phone,
        Self::Postcode,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::NhsNumber => "nhs_number",
            Self::BirthDate => "birth_date",
            Self::Gender => "gender",
            Self::Given => "given",
            Self::Family => "family",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Postcode => "postcode",
        }
    }
}

impl fmt::Display for ReconciliationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One field where local and registry demographics disagree
///
/// A `None` side means that side holds no value for the field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDifference {
    pub field: ReconciliationField,
    pub local: Option<String>,
    pub registry: Option<String>,
}

impl FieldDifference {
    pub fn local_missing(&self) -> bool {
        self.local.is_none()
    }

    pub fn registry_missing(&self) -> bool {
        self.registry.is_none()
    }
}

fn joined(values: &[String]) -> Option<String> {
    let present: Vec<&str> = values.iter().filter_map(|v| non_blank(Some(v.as_str()))).collect();
    if present.is_empty() {
        None
    } else {
        Some(present.join(VALUE_SEPARATOR))
    }
}

/// Local value is present and appears in the registry's list, ignoring case
fn list_contains(local: Option<&str>, registry: &[String]) -> bool {
    local.is_some_and(|local| {
        registry
            .iter()
            .any(|r| r.trim().to_lowercase() == local.to_lowercase())
    })
}

fn compare_strings(
    field: ReconciliationField,
    local: Option<&str>,
    registry: &[String],
) -> Option<FieldDifference> {
    let local = non_blank(local);
    if list_contains(local, registry) {
        return None;
    }
    Some(FieldDifference {
        field,
        local: local.map(str::to_string),
        registry: joined(registry),
    })
}

/// Compare local demographics with the registry's record, field by field.
///
/// String fields agree when the local value is present and the registry holds it
/// (case-insensitively) among its current and historical values. The birth date agrees
/// only when both sides have one and they are the same day. Every other case is a
/// difference, including a field absent on both sides.
pub fn compute_differences(
    request: &ReconciliationRequest,
    registry: &RegistryPerson,
) -> Vec<FieldDifference> {
    let local = &request.person;
    let gender: Vec<String> = registry.gender.iter().cloned().collect();
    let nhs_number = vec![registry.nhs_number.to_string()];

    ReconciliationField::ALL
        .iter()
        .filter_map(|&field| match field {
            ReconciliationField::NhsNumber => {
                compare_strings(field, request.local_nhs_number(), &nhs_number)
            }
            ReconciliationField::BirthDate => {
                let local_date = local.parsed_birth_date();
                match (local_date, registry.birth_date) {
                    (Some(l), Some(r)) if l == r => None,
                    (_, r) => Some(FieldDifference {
                        field,
                        local: non_blank(local.birth_date.as_deref()).map(str::to_string),
                        registry: r.map(|d| d.format(BIRTH_DATE_FORMAT).to_string()),
                    }),
                }
            }
            ReconciliationField::Gender => compare_strings(field, local.gender.as_deref(), &gender),
            ReconciliationField::Given => compare_strings(field, local.given.as_deref(), &registry.given),
            ReconciliationField::Family => {
                compare_strings(field, local.family.as_deref(), &registry.family)
            }
            ReconciliationField::Email => compare_strings(field, local.email.as_deref(), &registry.email),
            ReconciliationField::Phone => compare_strings(field, local.phone.as_deref(), &registry.phone),
            ReconciliationField::Postcode => {
                compare_strings(field, local.postcode.as_deref(), &registry.postcode)
            }
        })
        .collect()
}

/// Comma-separated field names, `none` when empty
pub fn summarize(differences: &[FieldDifference]) -> String {
    if differences.is_empty() {
        return "none".to_string();
    }
    differences
        .iter()
        .map(|d| d.field.name())
        .collect::<Vec<_>>()
        .join(",")
}
