//! Search-query cascades and the strategies that choose them.
//!
//! A cascade is an ordered list of labelled [`SearchQuery`](crate::core::SearchQuery)
//! variants tried one after another until the registry confirms a match. The
//! [`QueryCascadeBuilder`] knows how to build each variant; a [`SearchStrategy`] is a
//! fixed sequence of builder calls selected by name and version.
//!
//! ## Example
//!
//! ```rust
//! use pds_match::core::PersonRecord;
//! use pds_match::strategy::{find_strategy, CascadeOptions, StrategySelection};
//!
//! let person = PersonRecord::new()
//!     .with_given("OCTAVIA")
//!     .with_family("CHISLETT")
//!     .with_birth_date("2008-09-20");
//!
//! let strategy = find_strategy(&StrategySelection::new("cascade", 1)).unwrap();
//! let cascade = strategy.cascade(&person, &CascadeOptions::default()).unwrap();
//! assert_eq!(cascade[0].name, "ExactGFD");
//! ```

pub mod builder;
pub mod catalog;

pub use builder::{CascadeOptions, NameMode, QueryCascadeBuilder};
pub use catalog::{find_strategy, latest_version, SearchStrategy, StrategySelection, STRATEGIES};
