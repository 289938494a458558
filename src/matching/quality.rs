//! Input screening before any registry call.
//!
//! A [`FieldValidator`] reports `(fields, message)` errors. The gate maps each message
//! through a fixed per-field table of "required" and "invalid" messages to decide
//! whether a field is `NotProvided` or `Invalid`, clears invalid optional fields, and
//! reports whether enough is left to search on.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::person::{non_blank, parse_birth_date, PersonRecord};
use crate::core::types::DataQuality;
use crate::utils::validation::{is_valid_email, is_valid_gender, is_valid_phone, is_valid_postcode};

pub const GIVEN_REQUIRED: &str = "Given name is required";
pub const GIVEN_INVALID: &str = "Given name is invalid";
pub const FAMILY_REQUIRED: &str = "Family name is required";
pub const FAMILY_INVALID: &str = "Family name is invalid";
pub const BIRTH_DATE_REQUIRED: &str = "Birth date is required";
pub const BIRTH_DATE_INVALID: &str = "Birth date is invalid";
pub const GENDER_REQUIRED: &str = "Gender is required";
pub const GENDER_INVALID: &str = "Gender is invalid";
pub const PHONE_REQUIRED: &str = "Phone number is required";
pub const PHONE_INVALID: &str = "Phone number is invalid";
pub const EMAIL_REQUIRED: &str = "Email address is required";
pub const EMAIL_INVALID: &str = "Email address is invalid";
pub const POSTCODE_REQUIRED: &str = "Postcode is required";
pub const POSTCODE_INVALID: &str = "Postcode is invalid";

/// Fields tracked by the quality report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityField {
    Given,
    Family,
    BirthDate,
    Gender,
    Phone,
    Email,
    Postcode,
}

impl QualityField {
    /// Field name used in validator errors
    pub fn name(self) -> &'static str {
        match self {
            Self::Given => "given",
            Self::Family => "family",
            Self::BirthDate => "birth_date",
            Self::Gender => "gender",
            Self::Phone => "phone",
            Self::Email => "email",
            Self::Postcode => "postcode",
        }
    }
}

/// One validation failure, possibly spanning several fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub fields: Vec<String>,
    pub message: String,
}

impl FieldError {
    pub fn new(field: QualityField, message: &str) -> Self {
        Self {
            fields: vec![field.name().to_string()],
            message: message.to_string(),
        }
    }
}

/// Generic per-field validator feeding the gate
pub trait FieldValidator: Send + Sync {
    fn validate(&self, record: &PersonRecord) -> Vec<FieldError>;
}

struct FieldRule {
    field: QualityField,
    required: &'static str,
    invalid: &'static str,
    value: fn(&PersonRecord) -> Option<&str>,
    /// Set for optional fields, which are cleared when invalid
    clear: Option<fn(&mut PersonRecord)>,
}

fn clear_gender(record: &mut PersonRecord) {
    record.gender = None;
}

fn clear_phone(record: &mut PersonRecord) {
    record.phone = None;
}

fn clear_email(record: &mut PersonRecord) {
    record.email = None;
}

fn clear_postcode(record: &mut PersonRecord) {
    record.postcode = None;
}

static FIELD_RULES: [FieldRule; 7] = [
    FieldRule {
        field: QualityField::Given,
        required: GIVEN_REQUIRED,
        invalid: GIVEN_INVALID,
        value: |r| r.given.as_deref(),
        clear: None,
    },
    FieldRule {
        field: QualityField::Family,
        required: FAMILY_REQUIRED,
        invalid: FAMILY_INVALID,
        value: |r| r.family.as_deref(),
        clear: None,
    },
    FieldRule {
        field: QualityField::BirthDate,
        required: BIRTH_DATE_REQUIRED,
        invalid: BIRTH_DATE_INVALID,
        value: |r| r.birth_date.as_deref(),
        clear: None,
    },
    FieldRule {
        field: QualityField::Gender,
        required: GENDER_REQUIRED,
        invalid: GENDER_INVALID,
        value: |r| r.gender.as_deref(),
        clear: Some(clear_gender),
    },
    FieldRule {
        field: QualityField::Phone,
        required: PHONE_REQUIRED,
        invalid: PHONE_INVALID,
        value: |r| r.phone.as_deref(),
        clear: Some(clear_phone),
    },
    FieldRule {
        field: QualityField::Email,
        required: EMAIL_REQUIRED,
        invalid: EMAIL_INVALID,
        value: |r| r.email.as_deref(),
        clear: Some(clear_email),
    },
    FieldRule {
        field: QualityField::Postcode,
        required: POSTCODE_REQUIRED,
        invalid: POSTCODE_INVALID,
        value: |r| r.postcode.as_deref(),
        clear: Some(clear_postcode),
    },
];

/// Per-field quality of one match attempt's input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQualityReport {
    pub given: DataQuality,
    pub family: DataQuality,
    pub birth_date: DataQuality,
    pub gender: DataQuality,
    pub phone: DataQuality,
    pub email: DataQuality,
    pub postcode: DataQuality,
}

impl Default for DataQualityReport {
    fn default() -> Self {
        Self {
            given: DataQuality::NotProvided,
            family: DataQuality::NotProvided,
            birth_date: DataQuality::NotProvided,
            gender: DataQuality::NotProvided,
            phone: DataQuality::NotProvided,
            email: DataQuality::NotProvided,
            postcode: DataQuality::NotProvided,
        }
    }
}

impl DataQualityReport {
    pub fn get(&self, field: QualityField) -> DataQuality {
        match field {
            QualityField::Given => self.given,
            QualityField::Family => self.family,
            QualityField::BirthDate => self.birth_date,
            QualityField::Gender => self.gender,
            QualityField::Phone => self.phone,
            QualityField::Email => self.email,
            QualityField::Postcode => self.postcode,
        }
    }

    fn slot(&mut self, field: QualityField) -> &mut DataQuality {
        match field {
            QualityField::Given => &mut self.given,
            QualityField::Family => &mut self.family,
            QualityField::BirthDate => &mut self.birth_date,
            QualityField::Gender => &mut self.gender,
            QualityField::Phone => &mut self.phone,
            QualityField::Email => &mut self.email,
            QualityField::Postcode => &mut self.postcode,
        }
    }

    /// Given name, family name and birth date are all usable
    pub fn is_sufficient(&self) -> bool {
        self.given == DataQuality::Valid
            && self.family == DataQuality::Valid
            && self.birth_date == DataQuality::Valid
    }
}

fn severity(quality: DataQuality) -> u8 {
    match quality {
        DataQuality::Valid => 0,
        DataQuality::NotProvided => 1,
        DataQuality::Invalid => 2,
    }
}

/// Screens a record before matching
pub struct DataQualityGate<'a> {
    validator: &'a dyn FieldValidator,
}

impl<'a> DataQualityGate<'a> {
    pub fn new(validator: &'a dyn FieldValidator) -> Self {
        Self { validator }
    }

    /// Classify every tracked field and clear invalid optional fields on `record`
    pub fn assess(&self, record: &mut PersonRecord) -> DataQualityReport {
        let mut report = DataQualityReport::default();
        for rule in &FIELD_RULES {
            if non_blank((rule.value)(record)).is_some() {
                *report.slot(rule.field) = DataQuality::Valid;
            }
        }

        for error in self.validator.validate(record) {
            for name in &error.fields {
                let Some(rule) = FIELD_RULES.iter().find(|r| r.field.name() == name) else {
                    tracing::debug!("Ignoring validation error for untracked field '{}'", name);
                    continue;
                };

                let quality = if error.message == rule.required {
                    DataQuality::NotProvided
                } else if error.message == rule.invalid {
                    DataQuality::Invalid
                } else {
                    tracing::debug!("Unrecognised validation message for '{}': {}", name, error.message);
                    continue;
                };

                let slot = report.slot(rule.field);
                if severity(quality) > severity(*slot) {
                    *slot = quality;
                }
            }
        }

        for rule in &FIELD_RULES {
            if let Some(clear) = rule.clear {
                if report.get(rule.field) == DataQuality::Invalid {
                    clear(record);
                }
            }
        }

        report
    }
}

/// Presence and format rules for every tracked field
#[derive(Debug, Default, Clone)]
pub struct DefaultFieldValidator {
    /// Reference date for "not in the future"; today when unset
    pub today: Option<NaiveDate>,
}

impl DefaultFieldValidator {
    pub fn new() -> Self {
        Self::default()
    }

    fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Utc::now().date_naive())
    }
}

fn is_plausible_name(name: &str) -> bool {
    name.chars().any(char::is_alphabetic)
}

impl FieldValidator for DefaultFieldValidator {
    fn validate(&self, record: &PersonRecord) -> Vec<FieldError> {
        let mut errors = Vec::new();

        match non_blank(record.given.as_deref()) {
            None => errors.push(FieldError::new(QualityField::Given, GIVEN_REQUIRED)),
            Some(v) if !is_plausible_name(v) => {
                errors.push(FieldError::new(QualityField::Given, GIVEN_INVALID));
            }
            Some(_) => {}
        }

        match non_blank(record.family.as_deref()) {
            None => errors.push(FieldError::new(QualityField::Family, FAMILY_REQUIRED)),
            Some(v) if !is_plausible_name(v) => {
                errors.push(FieldError::new(QualityField::Family, FAMILY_INVALID));
            }
            Some(_) => {}
        }

        match non_blank(record.birth_date.as_deref()) {
            None => errors.push(FieldError::new(QualityField::BirthDate, BIRTH_DATE_REQUIRED)),
            Some(v) => {
                if !parse_birth_date(v).is_some_and(|d| d <= self.today()) {
                    errors.push(FieldError::new(QualityField::BirthDate, BIRTH_DATE_INVALID));
                }
            }
        }

        let optional: [(QualityField, Option<&str>, fn(&str) -> bool, &str); 4] = [
            (QualityField::Gender, record.gender.as_deref(), is_valid_gender, GENDER_INVALID),
            (QualityField::Phone, record.phone.as_deref(), is_valid_phone, PHONE_INVALID),
            (QualityField::Email, record.email.as_deref(), is_valid_email, EMAIL_INVALID),
            (QualityField::Postcode, record.postcode.as_deref(), is_valid_postcode, POSTCODE_INVALID),
        ];
        for (field, value, is_valid, message) in optional {
            if let Some(v) = non_blank(value) {
                if !is_valid(v) {
                    errors.push(FieldError::new(field, message));
                }
            }
        }

        errors
    }
}
