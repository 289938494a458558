use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::core::person::BIRTH_DATE_FORMAT;

/// Comparison prefix of a birth-date search token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatePrefix {
    Eq,
    Ge,
    Le,
}

impl DatePrefix {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ge => "ge",
            Self::Le => "le",
        }
    }
}

/// A single birth-date criterion such as `eq2008-09-20`
///
/// A date range is expressed as two tokens, one `ge` and one `le`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct DateToken {
    pub prefix: DatePrefix,
    pub date: NaiveDate,
}

impl DateToken {
    pub fn eq(date: NaiveDate) -> Self {
        Self {
            prefix: DatePrefix::Eq,
            date,
        }
    }

    pub fn ge(date: NaiveDate) -> Self {
        Self {
            prefix: DatePrefix::Ge,
            date,
        }
    }

    pub fn le(date: NaiveDate) -> Self {
        Self {
            prefix: DatePrefix::Le,
            date,
        }
    }

    /// Does `date` satisfy this criterion on its own?
    pub fn admits(&self, date: NaiveDate) -> bool {
        match self.prefix {
            DatePrefix::Eq => date == self.date,
            DatePrefix::Ge => date >= self.date,
            DatePrefix::Le => date <= self.date,
        }
    }
}

impl std::fmt::Display for DateToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}",
            self.prefix.as_str(),
            self.date.format(BIRTH_DATE_FORMAT)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid birth-date token '{0}': expected eq|ge|le followed by YYYY-MM-DD")]
pub struct DateTokenError(pub String);

impl FromStr for DateToken {
    type Err = DateTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (prefix, rest) = match s.get(..2) {
            Some("eq") => (DatePrefix::Eq, &s[2..]),
            Some("ge") => (DatePrefix::Ge, &s[2..]),
            Some("le") => (DatePrefix::Le, &s[2..]),
            _ => return Err(DateTokenError(s.to_string())),
        };
        let date = NaiveDate::parse_from_str(rest, BIRTH_DATE_FORMAT)
            .map_err(|_| DateTokenError(s.to_string()))?;
        Ok(Self { prefix, date })
    }
}

impl From<DateToken> for String {
    fn from(token: DateToken) -> Self {
        token.to_string()
    }
}

impl TryFrom<String> for DateToken {
    type Error = DateTokenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One registry search request
///
/// Built once per cascade entry and never modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub exact_match: bool,
    pub fuzzy_match: bool,
    /// Given names in order; more than one token when names are preprocessed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub given: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    pub birth_date: Vec<DateToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Include superseded and historical registry entries
    pub history: bool,
}

impl SearchQuery {
    /// Does `date` fall inside every birth-date criterion of this query?
    pub fn admits_birth_date(&self, date: NaiveDate) -> bool {
        !self.birth_date.is_empty() && self.birth_date.iter().all(|t| t.admits(date))
    }
}

/// A labelled cascade entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedQuery {
    pub name: String,
    pub query: SearchQuery,
}

impl NamedQuery {
    pub fn new(name: impl Into<String>, query: SearchQuery) -> Self {
        Self {
            name: name.into(),
            query,
        }
    }
}
