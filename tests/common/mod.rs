//! Scripted collaborators shared by the engine test suites.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::field::{Field, Visit};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

use pds_match::audit::{AuditError, AuditMetadata, AuditPort};
use pds_match::core::{PersonRecord, RegistryPerson, RegistrySearchResult, SearchQuery};
use pds_match::registry::{LookupOutcome, RegistryError, RegistryLookupPort, RegistrySearchPort};

pub type SearchResponse = Result<Option<RegistrySearchResult>, RegistryError>;

/// One scripted answer, optionally delayed
pub struct Step {
    pub response: SearchResponse,
    pub delay: Option<Duration>,
}

impl Step {
    pub fn matched(nhs_number: &str, score: f64) -> Self {
        Self::ok(RegistrySearchResult::matched(nhs_number, score))
    }

    pub fn multi() -> Self {
        Self::ok(RegistrySearchResult::MultiMatched)
    }

    pub fn unmatched() -> Self {
        Self::ok(RegistrySearchResult::Unmatched)
    }

    pub fn ok(result: RegistrySearchResult) -> Self {
        Self {
            response: Ok(Some(result)),
            delay: None,
        }
    }

    pub fn empty() -> Self {
        Self {
            response: Ok(None),
            delay: None,
        }
    }

    pub fn failure() -> Self {
        Self {
            response: Err(RegistryError::Unavailable("connection refused".to_string())),
            delay: None,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// Answers searches in call order and records every query it receives.
/// Calls beyond the script answer `Unmatched`.
#[derive(Default)]
pub struct ScriptedSearch {
    steps: Mutex<VecDeque<Step>>,
    queries: Mutex<Vec<SearchQuery>>,
    calls: AtomicUsize,
}

impl ScriptedSearch {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<SearchQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl RegistrySearchPort for ScriptedSearch {
    async fn search(&self, query: &SearchQuery) -> SearchResponse {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.clone());
        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(step) => {
                if let Some(delay) = step.delay {
                    tokio::time::sleep(delay).await;
                }
                step.response
            }
            None => Ok(Some(RegistrySearchResult::Unmatched)),
        }
    }
}

/// Lookup port backed by a map, with per-number failures
#[derive(Default)]
pub struct ScriptedLookup {
    persons: HashMap<String, RegistryPerson>,
    failures: HashMap<String, String>,
    requested: Mutex<Vec<String>>,
}

impl ScriptedLookup {
    pub fn with_person(mut self, requested: &str, person: RegistryPerson) -> Self {
        self.persons.insert(requested.to_string(), person);
        self
    }

    pub fn with_failure(mut self, requested: &str, message: &str) -> Self {
        self.failures.insert(requested.to_string(), message.to_string());
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl RegistryLookupPort for ScriptedLookup {
    async fn lookup_by_identifier(&self, nhs_number: &str) -> Result<LookupOutcome, RegistryError> {
        self.requested.lock().unwrap().push(nhs_number.to_string());
        if let Some(message) = self.failures.get(nhs_number) {
            return Err(RegistryError::Upstream(message.clone()));
        }
        Ok(self
            .persons
            .get(nhs_number)
            .cloned()
            .map_or(LookupOutcome::NotFound, LookupOutcome::Found))
    }
}

/// Audit sink that keeps every event
#[derive(Default)]
pub struct RecordingAudit {
    events: Mutex<Vec<(String, AuditMetadata)>>,
}

impl RecordingAudit {
    pub fn events(&self) -> Vec<(String, AuditMetadata)> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditPort for RecordingAudit {
    async fn log(&self, action: &str, metadata: AuditMetadata) -> Result<(), AuditError> {
        self.events
            .lock()
            .unwrap()
            .push((action.to_string(), metadata));
        Ok(())
    }
}

pub type EventFields = BTreeMap<String, String>;

/// Tracing layer that keeps the fields of every event, by target
#[derive(Clone, Default)]
pub struct CapturedEvents {
    events: Arc<Mutex<Vec<(String, EventFields)>>>,
}

impl CapturedEvents {
    /// Subscriber to install with `tracing::subscriber::set_default`
    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync {
        tracing_subscriber::registry().with(self.clone())
    }

    pub fn for_target(&self, target: &str) -> Vec<EventFields> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| t == target)
            .map(|(_, fields)| fields.clone())
            .collect()
    }

    pub fn all_values(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .flat_map(|(_, fields)| fields.values().cloned())
            .collect()
    }
}

struct FieldCollector<'a>(&'a mut EventFields);

impl Visit for FieldCollector<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{value:?}"));
    }
}

impl<S: tracing::Subscriber> Layer<S> for CapturedEvents {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = EventFields::new();
        event.record(&mut FieldCollector(&mut fields));
        self.events
            .lock()
            .unwrap()
            .push((event.metadata().target().to_string(), fields));
    }
}

pub fn octavia() -> PersonRecord {
    PersonRecord::new()
        .with_given("OCTAVIA")
        .with_family("CHISLETT")
        .with_birth_date("2008-09-20")
}

pub fn octavia_registry(nhs_number: &str) -> RegistryPerson {
    let mut person = RegistryPerson::new(nhs_number);
    person.given = vec!["OCTAVIA".to_string()];
    person.family = vec!["CHISLETT".to_string()];
    person.birth_date = chrono::NaiveDate::from_ymd_opt(2008, 9, 20);
    person
}
