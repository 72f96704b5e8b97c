//! Error types for ecschema-xml
//!
//! This module defines all error types used throughout the library.
//! Every parse and validation variant carries its fully formatted message,
//! and its `Display` output is exactly that message so callers can rely on
//! the wording.

use thiserror::Error;

/// Result type alias using the ecschema Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ECSchema parsing operations
#[derive(Error, Debug)]
pub enum Error {
    // ----- names -----
    /// A name failed the ECName rules
    #[error(transparent)]
    InvalidName(#[from] NameError),

    // ----- reference resolution -----
    /// An alias was registered twice for different schemas
    #[error("{0}")]
    DuplicateAlias(String),

    /// An `alias:Name` reference used an alias with no matching reference
    #[error("No valid schema found for alias {0}")]
    UnresolvedAlias(String),

    // ----- item classification -----
    /// A schema item has no `typeName`
    #[error("{0}")]
    MissingTypeName(String),

    /// A schema item's `typeName` is not a valid ECName
    #[error("{0}")]
    InvalidTypeName(String),

    /// The markup tag of a schema item is not a known item kind
    #[error("{0}")]
    UnknownItemType(String),

    // ----- per-item and per-property validation -----
    /// A required attribute is absent
    #[error("{0}")]
    MissingRequiredAttribute(String),

    /// An attribute is present but its value is malformed
    #[error("{0}")]
    InvalidAttributeValue(String),

    /// An enumerator of an int-backed enumeration has a non-integer value
    #[error("{0}")]
    NonIntegerEnumeratorValue(String),

    /// A format composite has the wrong number of units
    #[error("{0}")]
    InvalidComposite(String),

    /// A mixin lacks its `IsMixin` custom attribute
    #[error("{0}")]
    MissingIsMixin(String),

    /// A mixin's `IsMixin` lacks `AppliesToEntityClass`
    #[error("{0}")]
    MissingAppliesToEntityClass(String),

    /// A mixin declares more than one base class
    #[error("{0}")]
    MultipleBaseClass(String),

    /// A relationship lacks its Source or Target constraint
    #[error("{0}")]
    MissingConstraint(String),

    /// A relationship constraint has no `Class` children
    #[error("{0}")]
    MissingConstraintClasses(String),

    /// A property declaration has no `propertyName`
    #[error("{0}")]
    MissingPropertyName(String),

    /// A navigation property lacks a required property attribute
    #[error("{0}")]
    MissingRequiredPropertyAttribute(String),

    // ----- custom-attribute coercion -----
    /// A custom-attribute property element is empty or unusable
    #[error("{0}")]
    InvalidPrimitivePropertyValue(String),

    /// A custom-attribute property value does not match its declared type
    #[error("{0}")]
    TypeMismatch(String),

    /// The enumeration a property refers to cannot be found
    #[error("{0}")]
    EnumerationNotFound(String),

    /// A class needed to realize an instance cannot be found
    #[error("{0}")]
    ClassNotFound(String),

    // ----- schema envelope -----
    /// The root element is not an ECSchema
    #[error("{0}")]
    InvalidSchemaXml(String),

    /// The schema has no `xmlns` namespace marker
    #[error("{0}")]
    MissingXmlns(String),

    /// The schema's `xmlns` does not match the ECXML namespace pattern
    #[error("{0}")]
    InvalidXmlns(String),

    /// The schema has no `schemaName`
    #[error("{0}")]
    MissingSchemaName(String),

    /// The schema has no `version`
    #[error("{0}")]
    MissingVersion(String),

    /// The schema has no `alias`
    #[error("{0}")]
    MissingAlias(String),

    // ----- ambient -----
    /// Two schemas with the same name were added to one context
    #[error("{0}")]
    DuplicateSchema(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// Resource loading error
    #[error("resource error: {0}")]
    Resource(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),
}

impl Error {
    /// Whether this error came from validating the schema content itself,
    /// as opposed to I/O, malformed markup or configured limits.
    pub fn is_schema_error(&self) -> bool {
        !matches!(
            self,
            Error::Io(_) | Error::Xml(_) | Error::LimitExceeded(_) | Error::Resource(_)
        )
    }
}

/// ECName validation failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// The name is the empty string
    #[error("An ECName cannot be empty.")]
    Empty,

    /// The name starts with a digit
    #[error("'{0}' is not a valid ECName. It cannot start with a digit.")]
    LeadingDigit(String),

    /// The name contains a character outside `[A-Za-z0-9_]`
    #[error("'{name}' is not a valid ECName. The character '{character}' is not allowed.")]
    InvalidCharacter {
        /// The rejected name
        name: String,
        /// The first offending character
        character: char,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_alias_display() {
        let err = Error::UnresolvedAlias("bis".to_string());
        assert_eq!(err.to_string(), "No valid schema found for alias bis");
    }

    #[test]
    fn test_message_is_display_verbatim() {
        let msg = "The Enumeration Test.Color is missing the required 'backingTypeName' attribute.";
        let err = Error::MissingRequiredAttribute(msg.to_string());
        assert_eq!(err.to_string(), msg);
    }

    #[test]
    fn test_name_error_conversion() {
        let err: Error = NameError::LeadingDigit("1abc".to_string()).into();
        assert!(matches!(err, Error::InvalidName(NameError::LeadingDigit(_))));
        assert!(err.to_string().contains("cannot start with a digit"));
    }

    #[test]
    fn test_is_schema_error() {
        assert!(Error::MissingAlias("x".into()).is_schema_error());
        assert!(!Error::Xml("bad".into()).is_schema_error());
        assert!(!Error::LimitExceeded("deep".into()).is_schema_error());
    }
}
