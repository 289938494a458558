//! Pseudonymisation of identifiers placed in audit metadata.

use sha2::{Digest, Sha256};

/// Placeholder used when no salt is configured
pub const REDACTED: &str = "redacted";

/// Salted SHA-256 of an identifier, lowercase hex.
///
/// The salt is prepended and separated by `:` so that `("ab", "c")` and
/// `("a", "bc")` hash differently.
#[must_use]
pub fn pseudonymise(salt: &str, value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(value.trim().as_bytes());
    hex::encode(hasher.finalize())
}

/// Pseudonymise when a salt is available, otherwise redact
#[must_use]
pub fn pseudonymise_or_redact(salt: Option<&str>, value: &str) -> String {
    match salt {
        Some(salt) if !salt.is_empty() => pseudonymise(salt, value),
        _ => REDACTED.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pseudonymise_is_deterministic() {
        let a = pseudonymise("salt", "9434765919");
        let b = pseudonymise("salt", "9434765919");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_salt_changes_digest() {
        assert_ne!(
            pseudonymise("salt-a", "9434765919"),
            pseudonymise("salt-b", "9434765919")
        );
        assert_ne!(pseudonymise("ab", "c"), pseudonymise("a", "bc"));
    }

    #[test]
    fn test_redact_without_salt() {
        assert_eq!(pseudonymise_or_redact(None, "9434765919"), REDACTED);
        assert_eq!(pseudonymise_or_redact(Some(""), "9434765919"), REDACTED);
        assert_ne!(pseudonymise_or_redact(Some("s"), "9434765919"), REDACTED);
    }
}
