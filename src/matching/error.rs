use thiserror::Error;

use crate::core::query::DateTokenError;

/// Configuration errors: fatal to the request and never retried
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("Unknown search strategy '{0}'")]
    UnknownStrategy(String),

    #[error("Search strategy '{name}' has no version {version}")]
    UnsupportedStrategyVersion { name: String, version: u32 },

    #[error("A birth date is required to build search queries")]
    MissingBirthDate,

    #[error("Birth date '{0}' is not a valid YYYY-MM-DD date")]
    InvalidBirthDate(String),

    #[error(transparent)]
    InvalidDateToken(#[from] DateTokenError),
}
