//! Demographic matching against the registry.
//!
//! - [`MatchingEngine`]: screens a record, runs the configured cascade and bands the result
//! - [`DataQualityGate`]: decides whether a record is good enough to search on
//! - [`ConfidenceThresholds`]: maps a registry score to a [`MatchStatus`](crate::core::MatchStatus)
//!
//! ## Cascade semantics
//!
//! Entries are issued one at a time in order. A confirmed match ends the cascade
//! immediately. Otherwise the best single match (strictly highest score, first wins
//! ties) is kept, and a many-match is reported only if no single match was ever seen.
//! Registry errors on one entry do not stop the cascade.
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
//! println!("{} {:?}", outcome.status, outcome.nhs_number);
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod error;
pub mod quality;
pub mod scoring;

pub use engine::{MatchOutcome, MatchingEngine};
pub use error::MatchError;
pub use quality::{
    DataQualityGate, DataQualityReport, DefaultFieldValidator, FieldError, FieldValidator,
    QualityField,
};
pub use scoring::ConfidenceThresholds;
