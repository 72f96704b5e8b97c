//! Schema identity, qualified names and namespace markers
//!
//! This module provides the canonical `SchemaName.ItemName` identifier,
//! schema references, and the parsing of the two namespace markers found in
//! ECSchema markup: the ECXML namespace on the schema root, and the
//! `SchemaName.RR.WW.mm` marker on custom-attribute applications.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Prefix of every ECXML namespace URI
pub const ECXML_NAMESPACE_PREFIX: &str = "http://www.bentley.com/schemas/Bentley.ECXML.";

static ECXML_NAMESPACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^http://www\.bentley\.com/schemas/Bentley\.ECXML\.([0-9]+)\.([0-9]+)$")
        .expect("valid ECXML namespace pattern")
});

/// Canonical two-part identifier `SchemaName.ItemName`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    /// Name of the schema that owns the item
    pub schema: String,
    /// Name of the item
    pub item: String,
}

impl QualifiedName {
    /// Create a new qualified name
    pub fn new(schema: impl Into<String>, item: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            item: item.into(),
        }
    }

    /// Whether this name belongs to the given schema (case-insensitive)
    pub fn is_in_schema(&self, schema: &str) -> bool {
        self.schema.eq_ignore_ascii_case(schema)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.item)
    }
}

/// Failure to read a `SchemaName.ItemName` string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedNameParseError(pub String);

impl fmt::Display for QualifiedNameParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a qualified name of the form SchemaName.ItemName", self.0)
    }
}

impl std::error::Error for QualifiedNameParseError {}

impl FromStr for QualifiedName {
    type Err = QualifiedNameParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((schema, item)) if !schema.is_empty() && !item.is_empty() => {
                Ok(QualifiedName::new(schema, item))
            }
            _ => Err(QualifiedNameParseError(s.to_string())),
        }
    }
}

impl Serialize for QualifiedName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for QualifiedName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// An externally referenced schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaReference {
    /// Referenced schema name
    pub name: String,
    /// Version string as declared
    pub version: String,
}

impl SchemaReference {
    /// Create a new schema reference
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// ECXML version carried by the schema root namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcXmlVersion {
    /// Major version
    pub major: u32,
    /// Minor version
    pub minor: u32,
}

impl EcXmlVersion {
    /// Parse an ECXML namespace URI such as
    /// `http://www.bentley.com/schemas/Bentley.ECXML.3.1`
    pub fn from_namespace(namespace: &str) -> Option<Self> {
        let caps = ECXML_NAMESPACE.captures(namespace)?;
        let major = caps.get(1)?.as_str().parse().ok()?;
        let minor = caps.get(2)?.as_str().parse().ok()?;
        Some(Self { major, minor })
    }

    /// The namespace URI for this version
    pub fn namespace(&self) -> String {
        format!("{}{}.{}", ECXML_NAMESPACE_PREFIX, self.major, self.minor)
    }
}

/// Schema name from a custom-attribute namespace marker (`BisCore.01.00.00`)
pub fn schema_name_from_marker(marker: &str) -> Option<&str> {
    let name = marker.split('.').next()?;
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}
