//! Core data types for demographic matching.
//!
//! - [`PersonRecord`]: caller-supplied demographics for one match attempt
//! - [`ReconciliationRequest`]: demographics plus the locally held NHS number
//! - [`SearchQuery`], [`DateToken`], [`NamedQuery`]: registry search requests
//! - [`RegistrySearchResult`], [`RegistryPerson`]: what the registry returns
//! - [`MatchStatus`], [`DataQuality`], [`ReconciliationStatus`]: result classification
//!
//! ## Birth-date tokens
//!
//! | Token | Meaning |
//! |-------|---------|
//! | `eq2008-09-20` | born on that day |
//! | `ge2008-03-20` | born on or after |
//! | `le2009-03-20` | born on or before |

pub mod person;
pub mod query;
pub mod registry;
pub mod types;

pub use person::{PersonRecord, ReconciliationRequest};
pub use query::{DatePrefix, DateToken, NamedQuery, SearchQuery};
pub use registry::{RegistryAddress, RegistryPerson, RegistrySearchResult};
pub use types::{DataQuality, MatchStatus, NhsNumber, ReconciliationStatus};
