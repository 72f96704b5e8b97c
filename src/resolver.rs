//! Reference resolution
//!
//! Maps the aliases declared by `ECSchemaReference` elements (plus the
//! schema's own alias) to schema names, and turns raw references found in
//! the markup into canonical `SchemaName.ItemName` form.

use crate::error::{Error, Result};
use crate::names;
use crate::namespaces::{QualifiedName, SchemaReference};
use indexmap::IndexMap;
use std::collections::HashMap;
use tracing::debug;

/// Alias table and reference list for one parse session
#[derive(Debug, Clone)]
pub struct ReferenceResolver {
    /// Name of the schema being parsed
    schema_name: String,
    /// The schema's own alias
    schema_alias: Option<String>,
    /// Lower-cased alias -> referenced schema name
    aliases: HashMap<String, String>,
    /// Referenced schemas keyed by name, in order of first declaration
    references: IndexMap<String, SchemaReference>,
}

impl ReferenceResolver {
    /// Create a resolver for the schema with the given name and alias
    pub fn new(schema_name: impl Into<String>, schema_alias: Option<String>) -> Self {
        Self {
            schema_name: schema_name.into(),
            schema_alias: schema_alias.filter(|a| !a.is_empty()),
            aliases: HashMap::new(),
            references: IndexMap::new(),
        }
    }

    /// Name of the current schema
    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    /// Alias of the current schema
    pub fn schema_alias(&self) -> Option<&str> {
        self.schema_alias.as_deref()
    }

    /// Register a referenced schema under an alias.
    ///
    /// Registering the same alias for the same schema again is a no-op. A
    /// repeated schema name keeps the version it was first declared with.
    pub fn record_reference(&mut self, name: &str, version: &str, alias: &str) -> Result<()> {
        let key = alias.to_lowercase();

        let existing = match self.schema_alias {
            Some(ref own) if own.eq_ignore_ascii_case(alias) => Some(self.schema_name.as_str()),
            _ => self.aliases.get(&key).map(|s| s.as_str()),
        };

        match existing {
            Some(existing) if existing != name => {
                return Err(Error::DuplicateAlias(format!(
                    "The schema {} has multiple schema references ({}, {}) with the same alias '{}', which is not allowed.",
                    self.schema_name, existing, name, alias
                )));
            }
            Some(_) => {}
            None => {
                debug!(schema = %self.schema_name, alias, reference = name, "registered schema reference");
                self.aliases.insert(key, name.to_string());
            }
        }

        self.references
            .entry(name.to_string())
            .or_insert_with(|| SchemaReference::new(name, version));
        Ok(())
    }

    /// Look up the schema name registered for an alias (case-insensitive)
    pub fn schema_for_alias(&self, alias: &str) -> Option<&str> {
        if let Some(ref own) = self.schema_alias {
            if own.eq_ignore_ascii_case(alias) {
                return Some(&self.schema_name);
            }
        }
        self.aliases.get(&alias.to_lowercase()).map(|s| s.as_str())
    }

    /// Canonicalize a raw reference.
    ///
    /// - `Name` becomes `CurrentSchema.Name`
    /// - `alias:Name` becomes `ReferencedSchema.Name`
    /// - `Schema.Name` is returned unchanged
    pub fn resolve(&self, raw: &str) -> Result<QualifiedName> {
        let raw = raw.trim();
        match names::split_alias(raw) {
            (Some(alias), local) => {
                let schema = self
                    .schema_for_alias(alias)
                    .ok_or_else(|| Error::UnresolvedAlias(alias.to_string()))?;
                Ok(QualifiedName::new(schema, local))
            }
            (None, _) => match names::split_full_name(raw) {
                (Some(schema), item) if !schema.is_empty() => Ok(QualifiedName::new(schema, item)),
                (_, item) => Ok(QualifiedName::new(self.schema_name.as_str(), item)),
            },
        }
    }

    /// Referenced schemas, deduplicated by name, in declaration order
    pub fn references(&self) -> impl Iterator<Item = &SchemaReference> {
        self.references.values()
    }
}
