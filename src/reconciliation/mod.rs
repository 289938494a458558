//! Reconciliation of locally held demographics with the registry.
//!
//! [`ReconciliationEngine`] runs a match, fetches the registry's record for the matched
//! NHS number and reports each field that disagrees. When the caller also holds an NHS
//! number that differs from the matched one, that number is checked for validity, for
//! existence, and for having been superseded.

pub mod diff;
pub mod engine;

pub use diff::{compute_differences, FieldDifference, ReconciliationField};
pub use engine::{age_band, ReconciliationEngine, ReconciliationOutcome};
