//! Centralized validation and helper functions.

use regex::Regex;
use std::sync::OnceLock;

/// Length of an NHS number
pub const NHS_NUMBER_LENGTH: usize = 10;

/// Modulus-11 weights applied to the first nine digits
const NHS_NUMBER_WEIGHTS: [u32; 9] = [10, 9, 8, 7, 6, 5, 4, 3, 2];

/// Gender codes accepted by the registry
pub const GENDER_CODES: [&str; 4] = ["male", "female", "other", "unknown"];

/// Validate an NHS number with the Modulus-11 check digit.
///
/// An expected check digit of 10 can never be written as a single digit, so such
/// numbers are rejected whatever their final digit.
///
/// # Examples
///
/// ```
/// use pds_match::utils::validation::is_valid_nhs_number;
///
/// assert!(is_valid_nhs_number("9434765919"));
/// assert!(!is_valid_nhs_number("9434765918"));
/// assert!(!is_valid_nhs_number("943476591")); // 9 digits
/// ```
#[must_use]
pub fn is_valid_nhs_number(s: &str) -> bool {
    if s.len() != NHS_NUMBER_LENGTH {
        return false;
    }

    let Some(digits) = s
        .chars()
        .map(|c| c.to_digit(10))
        .collect::<Option<Vec<u32>>>()
    else {
        return false;
    };

    let sum: u32 = digits
        .iter()
        .zip(NHS_NUMBER_WEIGHTS)
        .map(|(digit, weight)| digit * weight)
        .sum();

    match 11 - (sum % 11) {
        11 => digits[9] == 0,
        10 => false,
        expected => digits[9] == expected,
    }
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+'-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
            .expect("email pattern is valid")
    })
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+?[0-9][0-9 \-]*[0-9]$").expect("phone pattern is valid"))
}

fn postcode_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^[A-Z]{1,2}[0-9][A-Z0-9]? ?[0-9][A-Z]{2}$")
            .expect("postcode pattern is valid")
    })
}

/// Syntactic email check
#[must_use]
pub fn is_valid_email(s: &str) -> bool {
    email_regex().is_match(s.trim())
}

/// Phone number made of digits, spaces and hyphens with an optional leading `+`,
/// carrying 10 to 15 digits
#[must_use]
pub fn is_valid_phone(s: &str) -> bool {
    let s = s.trim();
    let digit_count = s.chars().filter(char::is_ascii_digit).count();
    phone_regex().is_match(s) && (10..=15).contains(&digit_count)
}

/// UK postcode such as `LS1 4HR` or `SW1A1AA`
#[must_use]
pub fn is_valid_postcode(s: &str) -> bool {
    postcode_regex().is_match(s.trim())
}

#[must_use]
pub fn is_valid_gender(s: &str) -> bool {
    let s = s.trim();
    GENDER_CODES.iter().any(|code| code.eq_ignore_ascii_case(s))
}

/// Outward code of a postcode (`LS1 4HR` -> `LS1`), for logging
#[must_use]
pub fn postcode_district(s: &str) -> String {
    let compact: String = s.split_whitespace().collect();
    if compact.len() > 3 && compact.is_ascii() {
        compact[..compact.len() - 3].to_uppercase()
    } else {
        compact.to_uppercase()
    }
}
