use async_trait::async_trait;
use thiserror::Error;

use crate::core::query::SearchQuery;
use crate::core::registry::{RegistryPerson, RegistrySearchResult};

/// Failure talking to the registry
///
/// Retries and circuit breaking belong to the port implementation; by the time the
/// engine sees one of these the attempt is final.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Registry unavailable: {0}")]
    Unavailable(String),

    #[error("Registry error: {0}")]
    Upstream(String),

    #[error("Registry request timed out")]
    Timeout,
}

/// Result of fetching a person by NHS number
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The person the registry holds; its NHS number may differ from the one requested
    /// when the requested number has been superseded
    Found(RegistryPerson),
    NotFound,
}

/// Registry search, one call per cascade entry
#[async_trait]
pub trait RegistrySearchPort: Send + Sync {
    /// `Ok(None)` when the registry gave no usable answer
    async fn search(
        &self,
        query: &SearchQuery,
    ) -> Result<Option<RegistrySearchResult>, RegistryError>;
}

/// Full demographic retrieval by NHS number
#[async_trait]
pub trait RegistryLookupPort: Send + Sync {
    async fn lookup_by_identifier(&self, nhs_number: &str)
        -> Result<LookupOutcome, RegistryError>;
}
