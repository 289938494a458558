//! # pds-match
//!
//! A library for resolving partial patient demographics to an NHS number against the
//! national registry, and for reconciling locally held demographics with the registry's
//! authoritative record.
//!
//! Demographic records arriving from local systems are often incomplete or noisy: names
//! with trailing asides, day and month swapped in the birth date, stale postcodes.
//! `pds-match` handles this by running an ordered cascade of differently shaped registry
//! searches, banding the registry's confidence score, and stopping at the first
//! confirmed match.
//!
//! ## Features
//!
//! - **Data-quality gate**: Rejects unusable input before any registry call
//! - **Versioned strategies**: Exact, fuzzy and widening cascades selected by name and version
//! - **Confidence banding**: Match, potential match and low-confidence match thresholds
//! - **Reconciliation**: Field-by-field differences and superseded NHS number detection
//! - **NHS number validation**: Modulus 11 check digit
//!
//! ## Example
//!
//! ```rust,no_run
//! use pds_match::{FixtureRegistry, MatchingConfig, MatchingEngine, PersonRecord};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = FixtureRegistry::load_from_file("registry.json".as_ref())?;
//! let engine = MatchingEngine::new(&registry, MatchingConfig::default());
//!
//! let mut record = PersonRecord::new()
//!     .with_given("OCTAVIA")
//!     .with_family("CHISLETT")
//!     .with_birth_date("2008-09-20");
//! let outcome = engine.match_person(&mut record).await?;
//! println!("{}: {:?}", outcome.status, outcome.nhs_number);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Person records, search queries, registry results and status enums
//! - [`strategy`]: Query cascade builder and strategy catalogue
//! - [`matching`]: Quality gate, confidence banding and the matching engine
//! - [`reconciliation`]: Field differencing and the reconciliation engine
//! - [`registry`]: Registry ports and the JSON fixture registry
//! - [`cli`]: Command-line interface implementation
//! - [`web`]: JSON API server

pub mod audit;
pub mod cli;
pub mod config;
pub mod core;
pub mod matching;
pub mod reconciliation;
pub mod registry;
pub mod strategy;
pub mod utils;
pub mod web;

// Re-export commonly used types for convenience
pub use config::MatchingConfig;
pub use crate::core::{
    DataQuality, MatchStatus, NhsNumber, PersonRecord, ReconciliationRequest,
    ReconciliationStatus, RegistryPerson, RegistrySearchResult, SearchQuery,
};
pub use matching::engine::{MatchOutcome, MatchingEngine};
pub use matching::MatchError;
pub use reconciliation::engine::{ReconciliationEngine, ReconciliationOutcome};
pub use registry::FixtureRegistry;
pub use utils::validation::is_valid_nhs_number;
