//! ECName validation and name utilities
//!
//! ECNames are the identifiers used for schemas, items and properties:
//! non-empty, drawn from `[A-Za-z0-9_]`, and never starting with a digit.

use crate::error::NameError;
use once_cell::sync::Lazy;
use regex::Regex;

static EC_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid ECName pattern"));

/// Check if a string is a valid ECName
pub fn is_valid_ec_name(name: &str) -> bool {
    EC_NAME.is_match(name)
}

/// Validate an ECName, reporting which rule it breaks
pub fn validate(name: &str) -> Result<(), NameError> {
    if is_valid_ec_name(name) {
        return Ok(());
    }

    let mut chars = name.chars();
    match chars.next() {
        None => Err(NameError::Empty),
        Some(c) if c.is_ascii_digit() => Err(NameError::LeadingDigit(name.to_string())),
        Some(_) => {
            let character = name
                .chars()
                .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
                .unwrap_or_default();
            Err(NameError::InvalidCharacter {
                name: name.to_string(),
                character,
            })
        }
    }
}

/// Split an `alias:Name` reference into alias and local name
pub fn split_alias(reference: &str) -> (Option<&str>, &str) {
    match reference.split_once(':') {
        Some((alias, local)) => (Some(alias), local),
        None => (None, reference),
    }
}

/// Split a `Schema.Name` full name into schema name and item name
pub fn split_full_name(full_name: &str) -> (Option<&str>, &str) {
    match full_name.split_once('.') {
        Some((schema, item)) => (Some(schema), item),
        None => (None, full_name),
    }
}
