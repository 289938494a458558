use serde::{Deserialize, Serialize};

use crate::core::person::PersonRecord;
use crate::core::query::NamedQuery;
use crate::matching::MatchError;
use crate::strategy::builder::{CascadeOptions, NameMode, QueryCascadeBuilder};

/// Name and version of the strategy a matching engine runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategySelection {
    pub name: String,
    pub version: u32,
}

impl StrategySelection {
    pub fn new(name: impl Into<String>, version: u32) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }
}

impl Default for StrategySelection {
    fn default() -> Self {
        Self::new("cascade", 2)
    }
}

impl std::fmt::Display for StrategySelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} v{}", self.name, self.version)
    }
}

type CascadeFn = fn(&mut QueryCascadeBuilder<'_>, &CascadeOptions);

/// A named, versioned recipe of builder calls
pub struct SearchStrategy {
    pub name: &'static str,
    pub version: u32,
    pub description: &'static str,
    steps: CascadeFn,
}

impl std::fmt::Debug for SearchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchStrategy")
            .field("name", &self.name)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl SearchStrategy {
    /// Build this strategy's cascade for one person
    ///
    /// # Errors
    ///
    /// Fails when the person has no usable birth date.
    pub fn cascade(
        &self,
        person: &PersonRecord,
        options: &CascadeOptions,
    ) -> Result<Vec<NamedQuery>, MatchError> {
        let mut builder = QueryCascadeBuilder::new(person, *options)?;
        (self.steps)(&mut builder, options);
        Ok(builder.build())
    }
}

fn exact_v1(builder: &mut QueryCascadeBuilder<'_>, _options: &CascadeOptions) {
    builder
        .add_exact_gfd(NameMode::AsGiven)
        .add_exact_all(NameMode::AsGiven);
}

fn fuzzy_v1(builder: &mut QueryCascadeBuilder<'_>, _options: &CascadeOptions) {
    builder
        .add_fuzzy_gfd(NameMode::AsGiven)
        .add_fuzzy_all(NameMode::AsGiven);
}

fn cascade_v1(builder: &mut QueryCascadeBuilder<'_>, options: &CascadeOptions) {
    builder
        .add_exact_gfd(NameMode::AsGiven)
        .add_exact_all(NameMode::AsGiven)
        .add_fuzzy_gfd(NameMode::AsGiven)
        .add_fuzzy_all(NameMode::AsGiven)
        .add_fuzzy_gfd_range(options.dob_range_months, NameMode::AsGiven)
        .add_fuzzy_alt_dob(NameMode::AsGiven);
}

fn cascade_v2(builder: &mut QueryCascadeBuilder<'_>, options: &CascadeOptions) {
    builder
        .add_exact_gfd(NameMode::AsGiven)
        .add_exact_gfd(NameMode::Preprocessed)
        .add_exact_all(NameMode::AsGiven)
        .add_fuzzy_gfd(NameMode::AsGiven)
        .add_fuzzy_gfd(NameMode::Preprocessed)
        .add_fuzzy_all(NameMode::AsGiven)
        .add_fuzzy_gfd_range(options.dob_range_months, NameMode::AsGiven)
        .add_fuzzy_gfd_postcode_wildcard(NameMode::AsGiven)
        .add_non_fuzzy_gfd_range_postcode_wildcard(options.dob_range_months, NameMode::AsGiven)
        .add_fuzzy_alt_dob(NameMode::AsGiven);
}

/// Every strategy the engine can run, in listing order
pub static STRATEGIES: &[SearchStrategy] = &[
    SearchStrategy {
        name: "exact",
        version: 1,
        description: "Exact given/family/birth date, then exact on all fields",
        steps: exact_v1,
    },
    SearchStrategy {
        name: "fuzzy",
        version: 1,
        description: "Fuzzy given/family/birth date, then fuzzy on all fields",
        steps: fuzzy_v1,
    },
    SearchStrategy {
        name: "cascade",
        version: 1,
        description: "Exact then fuzzy, widening to a birth-date range and a day/month swap",
        steps: cascade_v1,
    },
    SearchStrategy {
        name: "cascade",
        version: 2,
        description: "Cascade v1 with name preprocessing and postcode-wildcard searches",
        steps: cascade_v2,
    },
];

/// Look up a strategy by name and version
///
/// # Errors
///
/// `MatchError::UnknownStrategy` when no strategy has that name,
/// `MatchError::UnsupportedStrategyVersion` when the name exists without that version.
pub fn find_strategy(selection: &StrategySelection) -> Result<&'static SearchStrategy, MatchError> {
    let mut named = STRATEGIES
        .iter()
        .filter(|s| s.name == selection.name)
        .peekable();

    if named.peek().is_none() {
        return Err(MatchError::UnknownStrategy(selection.name.clone()));
    }

    named
        .find(|s| s.version == selection.version)
        .ok_or_else(|| MatchError::UnsupportedStrategyVersion {
            name: selection.name.clone(),
            version: selection.version,
        })
}

/// Highest catalogued version of a strategy
pub fn latest_version(name: &str) -> Option<u32> {
    STRATEGIES
        .iter()
        .filter(|s| s.name == name)
        .map(|s| s.version)
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::builder::{
        EXACT_ALL, EXACT_GFD, FUZZY_ALL, FUZZY_ALT_DOB, FUZZY_GFD, FUZZY_GFD_RANGE,
    };

    fn labels(queries: &[NamedQuery]) -> Vec<&str> {
        queries.iter().map(|q| q.name.as_str()).collect()
    }

    fn person(birth_date: &str) -> PersonRecord {
        PersonRecord::new()
            .with_given("OCTAVIA")
            .with_family("CHISLETT")
            .with_birth_date(birth_date)
    }

    #[test]
    fn test_find_unknown_strategy() {
        let err = find_strategy(&StrategySelection::new("nope", 1)).unwrap_err();
        assert_eq!(err, MatchError::UnknownStrategy("nope".to_string()));
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_find_unsupported_version() {
        let err = find_strategy(&StrategySelection::new("cascade", 9)).unwrap_err();
        assert_eq!(
            err,
            MatchError::UnsupportedStrategyVersion {
                name: "cascade".to_string(),
                version: 9
            }
        );
        assert!(err.to_string().contains("cascade"));
        assert!(err.to_string().contains('9'));
    }

    #[test]
    fn test_latest_version() {
        assert_eq!(latest_version("cascade"), Some(2));
        assert_eq!(latest_version("exact"), Some(1));
        assert_eq!(latest_version("nope"), None);
    }

    #[test]
    fn test_default_selection_resolves() {
        let strategy = find_strategy(&StrategySelection::default()).unwrap();
        assert_eq!(strategy.name, "cascade");
        assert_eq!(strategy.version, 2);
    }

    #[test]
    fn test_cascade_v1_order() {
        let strategy = find_strategy(&StrategySelection::new("cascade", 1)).unwrap();
        let queries = strategy
            .cascade(&person("2008-09-05"), &CascadeOptions::default())
            .unwrap();
        assert_eq!(
            labels(&queries),
            vec![EXACT_GFD, EXACT_ALL, FUZZY_GFD, FUZZY_ALL, FUZZY_GFD_RANGE, FUZZY_ALT_DOB]
        );

        let queries = strategy
            .cascade(&person("2008-09-20"), &CascadeOptions::default())
            .unwrap();
        assert_eq!(
            labels(&queries),
            vec![EXACT_GFD, EXACT_ALL, FUZZY_GFD, FUZZY_ALL, FUZZY_GFD_RANGE]
        );
    }

    #[test]
    fn test_cascade_v2_order() {
        let strategy = find_strategy(&StrategySelection::new("cascade", 2)).unwrap();
        let queries = strategy
            .cascade(&person("2008-09-05"), &CascadeOptions::default())
            .unwrap();
        assert_eq!(
            labels(&queries),
            vec![
                "ExactGFD",
                "ExactGFDPreprocessed",
                "ExactAll",
                "FuzzyGFD",
                "FuzzyGFDPreprocessed",
                "FuzzyAll",
                "FuzzyGFDRange",
                "FuzzyGFDPostcodeWildcard",
                "NonFuzzyGFDRangePostcodeWildcard",
                "FuzzyAltDob",
            ]
        );
    }

    #[test]
    fn test_cascade_uses_configured_range() {
        let strategy = find_strategy(&StrategySelection::new("cascade", 1)).unwrap();
        let options = CascadeOptions {
            dob_range_months: 1,
            include_gender: true,
        };
        let queries = strategy.cascade(&person("2008-09-20"), &options).unwrap();
        let range = &queries
            .iter()
            .find(|q| q.name == FUZZY_GFD_RANGE)
            .unwrap()
            .query
            .birth_date;
        assert_eq!(range[0].to_string(), "ge2008-08-20");
        assert_eq!(range[1].to_string(), "le2008-10-20");
    }

    #[test]
    fn test_cascade_without_birth_date_fails() {
        let strategy = find_strategy(&StrategySelection::new("exact", 1)).unwrap();
        let person = PersonRecord::new().with_given("A").with_family("B");
        let err = strategy
            .cascade(&person, &CascadeOptions::default())
            .unwrap_err();
        assert_eq!(err, MatchError::MissingBirthDate);
    }
}
