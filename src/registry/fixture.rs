//! A registry backed by a JSON file, for demos, conformance runs and tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;

use crate::core::query::SearchQuery;
use crate::core::registry::{RegistryPerson, RegistrySearchResult};
use crate::registry::ports::{
    LookupOutcome, RegistryError, RegistryLookupPort, RegistrySearchPort,
};

#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Failed to read registry fixture: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse registry fixture: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// A scripted answer to any query matching every criterion the rule sets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuzzy: Option<bool>,
    /// Answer with a port failure instead of a result
    #[serde(default)]
    pub unavailable: bool,
    pub result: RegistrySearchResult,
}

impl SearchRule {
    fn applies_to(&self, query: &SearchQuery) -> bool {
        let given_ok = self.given.as_ref().map_or(true, |given| {
            query.given.iter().any(|g| g.eq_ignore_ascii_case(given))
                || query.given.join(" ").eq_ignore_ascii_case(given)
        });
        let family_ok = self.family.as_ref().map_or(true, |family| {
            query
                .family
                .as_ref()
                .is_some_and(|f| f.eq_ignore_ascii_case(family))
        });
        let birth_ok = self
            .birth_date
            .map_or(true, |date| query.admits_birth_date(date));
        let fuzzy_ok = self.fuzzy.map_or(true, |fuzzy| query.fuzzy_match == fuzzy);

        given_ok && family_ok && birth_ok && fuzzy_ok
    }
}

/// On-disk fixture format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureData {
    #[serde(default)]
    pub persons: Vec<RegistryPerson>,
    #[serde(default)]
    pub search_rules: Vec<SearchRule>,
    /// Superseded NHS number -> current NHS number
    #[serde(default)]
    pub redirects: HashMap<String, String>,
    /// NHS numbers whose lookup fails with a port error
    #[serde(default)]
    pub unavailable_lookups: HashSet<String>,
}

/// In-memory registry implementing both search and lookup
#[derive(Debug, Default)]
pub struct FixtureRegistry {
    persons: HashMap<String, RegistryPerson>,
    rules: Vec<SearchRule>,
    redirects: HashMap<String, String>,
    unavailable_lookups: HashSet<String>,
}

impl FixtureRegistry {
    pub fn new(data: FixtureData) -> Self {
        let persons = data
            .persons
            .into_iter()
            .map(|p| (p.nhs_number.0.clone(), p))
            .collect();

        Self {
            persons,
            rules: data.search_rules,
            redirects: data.redirects,
            unavailable_lookups: data.unavailable_lookups,
        }
    }

    /// Load a fixture from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, FixtureError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a fixture from a JSON string
    pub fn from_json(json: &str) -> Result<Self, FixtureError> {
        let data: FixtureData = serde_json::from_str(json)?;
        Ok(Self::new(data))
    }

    pub fn with_person(mut self, person: RegistryPerson) -> Self {
        self.persons.insert(person.nhs_number.0.clone(), person);
        self
    }

    pub fn with_rule(mut self, rule: SearchRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_redirect(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.redirects.insert(from.into(), to.into());
        self
    }

    pub fn len(&self) -> usize {
        self.persons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }
}

#[async_trait]
impl RegistrySearchPort for FixtureRegistry {
    async fn search(
        &self,
        query: &SearchQuery,
    ) -> Result<Option<RegistrySearchResult>, RegistryError> {
        match self.rules.iter().find(|rule| rule.applies_to(query)) {
            Some(rule) if rule.unavailable => Err(RegistryError::Unavailable(
                "fixture rule marked unavailable".to_string(),
            )),
            Some(rule) => Ok(Some(rule.result.clone())),
            None => Ok(Some(RegistrySearchResult::Unmatched)),
        }
    }
}

#[async_trait]
impl RegistryLookupPort for FixtureRegistry {
    async fn lookup_by_identifier(
        &self,
        nhs_number: &str,
    ) -> Result<LookupOutcome, RegistryError> {
        let requested = nhs_number.trim();
        if self.unavailable_lookups.contains(requested) {
            return Err(RegistryError::Unavailable(format!(
                "lookup of {requested} failed"
            )));
        }

        let current = self
            .redirects
            .get(requested)
            .map_or(requested, String::as_str);

        Ok(self
            .persons
            .get(current)
            .cloned()
            .map_or(LookupOutcome::NotFound, LookupOutcome::Found))
    }
}
