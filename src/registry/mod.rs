//! Collaborator ports onto the national registry.
//!
//! The engines never talk to the registry directly. They consume two narrow ports:
//!
//! - [`RegistrySearchPort`]: one search per cascade entry
//! - [`RegistryLookupPort`]: full demographics for an NHS number
//!
//! Transport, authentication and retry policy live behind these traits.
//! [`FixtureRegistry`] implements both from a JSON file and backs the CLI, the web
//! server and the tests.
//!
//! ## Fixture format
//!
//! ```json
//! {
//!   "persons": [{"nhs_number": "9449306753", "given": ["OCTAVIA"], "family": ["CHISLETT"]}],
//!   "search_rules": [
//!     {"family": "CHISLETT", "birth_date": "2008-09-20",
//!      "result": {"kind": "matched", "nhs_number": "9449306753", "score": 0.98}}
//!   ],
//!   "redirects": {"9434765919": "9449306753"}
//! }
//! ```

pub mod fixture;
pub mod ports;

pub use fixture::{FixtureData, FixtureError, FixtureRegistry, SearchRule};
pub use ports::{LookupOutcome, RegistryError, RegistryLookupPort, RegistrySearchPort};
