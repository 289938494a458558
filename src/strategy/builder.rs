use chrono::{Datelike, Months, NaiveDate};

use crate::core::person::{non_blank, PersonRecord};
use crate::core::query::{DateToken, NamedQuery, SearchQuery};
use crate::matching::MatchError;

pub const EXACT_GFD: &str = "ExactGFD";
pub const EXACT_ALL: &str = "ExactAll";
pub const FUZZY_GFD: &str = "FuzzyGFD";
pub const FUZZY_ALL: &str = "FuzzyAll";
pub const FUZZY_GFD_RANGE: &str = "FuzzyGFDRange";
pub const FUZZY_GFD_POSTCODE_WILDCARD: &str = "FuzzyGFDPostcodeWildcard";
pub const NON_FUZZY_GFD_RANGE_POSTCODE_WILDCARD: &str = "NonFuzzyGFDRangePostcodeWildcard";
pub const FUZZY_ALT_DOB: &str = "FuzzyAltDob";

/// Label suffix for entries built with [`NameMode::Preprocessed`]
pub const PREPROCESSED_SUFFIX: &str = "Preprocessed";

/// How names are placed into a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameMode {
    /// Given and family names passed through as supplied
    #[default]
    AsGiven,
    /// Given names split on whitespace; a trailing `(...)` aside dropped from the family name
    Preprocessed,
}

/// Parameters shared by every entry of one cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeOptions {
    pub dob_range_months: u32,
    pub include_gender: bool,
}

impl Default for CascadeOptions {
    fn default() -> Self {
        Self {
            dob_range_months: 6,
            include_gender: true,
        }
    }
}

/// First two characters plus `*`, or the code unchanged when it is two characters or fewer
#[must_use]
pub fn postcode_wildcard(postcode: &str) -> String {
    let postcode = postcode.trim();
    if postcode.chars().count() > 2 {
        let prefix: String = postcode.chars().take(2).collect();
        format!("{prefix}*")
    } else {
        postcode.to_string()
    }
}

/// Day and month swapped, when the day could itself be a month
#[must_use]
pub fn alternate_birth_date(date: NaiveDate) -> Option<NaiveDate> {
    if date.day() <= 12 {
        NaiveDate::from_ymd_opt(date.year(), date.day(), date.month())
    } else {
        None
    }
}

/// Drop a trailing parenthesised aside, e.g. `SMITH (née JONES)` -> `SMITH`
#[must_use]
pub fn strip_trailing_aside(family: &str) -> String {
    let trimmed = family.trim();
    if trimmed.ends_with(')') {
        if let Some(open) = trimmed.rfind('(') {
            let stem = trimmed[..open].trim_end();
            if !stem.is_empty() {
                return stem.to_string();
            }
        }
    }
    trimmed.to_string()
}

/// Builds the ordered, labelled search queries for one person.
///
/// Each `add_*` call places one entry under a fixed label. Adding a label that is
/// already present replaces that entry where it stands, so cascade order is fixed
/// by the first call for each label.
#[derive(Debug)]
pub struct QueryCascadeBuilder<'a> {
    person: &'a PersonRecord,
    birth_date: NaiveDate,
    options: CascadeOptions,
    queries: Vec<NamedQuery>,
}

impl<'a> QueryCascadeBuilder<'a> {
    /// # Errors
    ///
    /// Returns `MatchError::MissingBirthDate` or `MatchError::InvalidBirthDate` when the
    /// person has no usable birth date.
    pub fn new(person: &'a PersonRecord, options: CascadeOptions) -> Result<Self, MatchError> {
        let raw = non_blank(person.birth_date.as_deref()).ok_or(MatchError::MissingBirthDate)?;
        let birth_date = person
            .parsed_birth_date()
            .ok_or_else(|| MatchError::InvalidBirthDate(raw.to_string()))?;

        Ok(Self {
            person,
            birth_date,
            options,
            queries: Vec::new(),
        })
    }

    pub fn queries(&self) -> &[NamedQuery] {
        &self.queries
    }

    pub fn build(self) -> Vec<NamedQuery> {
        self.queries
    }

    fn push(&mut self, label: &str, names: NameMode, query: SearchQuery) {
        let name = match names {
            NameMode::AsGiven => label.to_string(),
            NameMode::Preprocessed => format!("{label}{PREPROCESSED_SUFFIX}"),
        };

        if let Some(existing) = self.queries.iter_mut().find(|q| q.name == name) {
            existing.query = query;
        } else {
            self.queries.push(NamedQuery::new(name, query));
        }
    }

    fn given_tokens(&self, names: NameMode) -> Vec<String> {
        let Some(given) = non_blank(self.person.given.as_deref()) else {
            return Vec::new();
        };
        match names {
            NameMode::AsGiven => vec![given.to_string()],
            NameMode::Preprocessed => given.split_whitespace().map(str::to_string).collect(),
        }
    }

    fn family_name(&self, names: NameMode) -> Option<String> {
        let family = non_blank(self.person.family.as_deref())?;
        match names {
            NameMode::AsGiven => Some(family.to_string()),
            NameMode::Preprocessed => Some(strip_trailing_aside(family)),
        }
    }

    fn dob_range(&self, months: u32) -> Vec<DateToken> {
        let span = Months::new(months);
        let from = self
            .birth_date
            .checked_sub_months(span)
            .unwrap_or(NaiveDate::MIN);
        let to = self
            .birth_date
            .checked_add_months(span)
            .unwrap_or(NaiveDate::MAX);
        vec![DateToken::ge(from), DateToken::le(to)]
    }

    fn wildcard_postcode(&self) -> Option<String> {
        non_blank(self.person.postcode.as_deref()).map(postcode_wildcard)
    }

    /// Given, family and birth date, plus whichever contact fields are present
    fn gfd(&self, names: NameMode, fuzzy: bool, birth_date: Vec<DateToken>) -> SearchQuery {
        SearchQuery {
            exact_match: false,
            fuzzy_match: fuzzy,
            given: self.given_tokens(names),
            family: self.family_name(names),
            birth_date,
            // Non-fuzzy searches also look at historical registry entries
            history: !fuzzy,
            ..SearchQuery::default()
        }
    }

    fn with_all_fields(&self, query: SearchQuery) -> SearchQuery {
        let gender = if self.options.include_gender {
            non_blank(self.person.gender.as_deref()).map(str::to_lowercase)
        } else {
            None
        };
        SearchQuery {
            gender,
            phone: non_blank(self.person.phone.as_deref()).map(str::to_string),
            email: non_blank(self.person.email.as_deref()).map(str::to_string),
            postcode: non_blank(self.person.postcode.as_deref()).map(str::to_string),
            ..query
        }
    }

    pub fn add_exact_gfd(&mut self, names: NameMode) -> &mut Self {
        let query = SearchQuery {
            exact_match: true,
            ..self.gfd(names, false, vec![DateToken::eq(self.birth_date)])
        };
        self.push(EXACT_GFD, names, query);
        self
    }

    pub fn add_exact_all(&mut self, names: NameMode) -> &mut Self {
        let query = self.with_all_fields(SearchQuery {
            exact_match: true,
            ..self.gfd(names, false, vec![DateToken::eq(self.birth_date)])
        });
        self.push(EXACT_ALL, names, query);
        self
    }

    pub fn add_fuzzy_gfd(&mut self, names: NameMode) -> &mut Self {
        let query = self.gfd(names, true, vec![DateToken::eq(self.birth_date)]);
        self.push(FUZZY_GFD, names, query);
        self
    }

    pub fn add_fuzzy_all(&mut self, names: NameMode) -> &mut Self {
        let query =
            self.with_all_fields(self.gfd(names, true, vec![DateToken::eq(self.birth_date)]));
        self.push(FUZZY_ALL, names, query);
        self
    }

    /// Fuzzy given/family with birth date widened to `±months`
    pub fn add_fuzzy_gfd_range(&mut self, months: u32, names: NameMode) -> &mut Self {
        let query = self.gfd(names, true, self.dob_range(months));
        self.push(FUZZY_GFD_RANGE, names, query);
        self
    }

    pub fn add_fuzzy_gfd_postcode_wildcard(&mut self, names: NameMode) -> &mut Self {
        let query = SearchQuery {
            postcode: self.wildcard_postcode(),
            ..self.gfd(names, true, vec![DateToken::eq(self.birth_date)])
        };
        self.push(FUZZY_GFD_POSTCODE_WILDCARD, names, query);
        self
    }

    pub fn add_non_fuzzy_gfd_range_postcode_wildcard(
        &mut self,
        months: u32,
        names: NameMode,
    ) -> &mut Self {
        let query = SearchQuery {
            postcode: self.wildcard_postcode(),
            ..self.gfd(names, false, self.dob_range(months))
        };
        self.push(NON_FUZZY_GFD_RANGE_POSTCODE_WILDCARD, names, query);
        self
    }

    /// Fuzzy given/family with day and month swapped; skipped when the day is above 12
    pub fn add_fuzzy_alt_dob(&mut self, names: NameMode) -> &mut Self {
        if let Some(alternate) = alternate_birth_date(self.birth_date) {
            let query = self.gfd(names, true, vec![DateToken::eq(alternate)]);
            self.push(FUZZY_ALT_DOB, names, query);
        }
        self
    }
}
