//! Limits and constraints for ECSchema processing
//!
//! This module defines limits that keep a single parse session from
//! exhausting resources on hostile or runaway input (deeply nested markup,
//! huge files, self-referencing struct classes).

use crate::error::{Error, Result};

/// Global limits configuration
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum element nesting depth of a schema document
    pub max_xml_depth: usize,

    /// Maximum XML file size in bytes
    pub max_xml_size: usize,

    /// Maximum number of attributes per element
    pub max_attributes: usize,

    /// Maximum number of top-level schema items
    pub max_schema_items: usize,

    /// Maximum number of property declarations per class
    pub max_properties: usize,

    /// Maximum nesting of struct values inside a custom-attribute instance
    pub max_struct_depth: usize,

    /// Maximum length of a base-class chain when resolving class definitions
    pub max_inheritance_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_xml_depth: 256,
            max_xml_size: 64 * 1024 * 1024, // 64 MB
            max_attributes: 256,
            max_schema_items: 100_000,
            max_properties: 10_000,
            max_struct_depth: 64,
            max_inheritance_depth: 64,
        }
    }
}

impl Limits {
    /// Create a new Limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits (more restrictive)
    pub fn strict() -> Self {
        Self {
            max_xml_depth: 64,
            max_xml_size: 8 * 1024 * 1024, // 8 MB
            max_attributes: 64,
            max_schema_items: 10_000,
            max_properties: 1_000,
            max_struct_depth: 16,
            max_inheritance_depth: 16,
        }
    }

    /// Create permissive limits (less restrictive, use with caution)
    pub fn permissive() -> Self {
        Self {
            max_xml_depth: 4096,
            max_xml_size: 1024 * 1024 * 1024, // 1 GB
            max_attributes: 4096,
            max_schema_items: 10_000_000,
            max_properties: 1_000_000,
            max_struct_depth: 1024,
            max_inheritance_depth: 1024,
        }
    }

    /// Check if XML depth is within limits
    pub fn check_xml_depth(&self, depth: usize) -> Result<()> {
        check("XML depth", depth, self.max_xml_depth)
    }

    /// Check if XML size is within limits
    pub fn check_xml_size(&self, size: usize) -> Result<()> {
        if size > self.max_xml_size {
            Err(Error::LimitExceeded(format!(
                "XML size {} bytes exceeds maximum {} bytes",
                size, self.max_xml_size
            )))
        } else {
            Ok(())
        }
    }

    /// Check if number of attributes is within limits
    pub fn check_attributes(&self, count: usize) -> Result<()> {
        check("Attribute count", count, self.max_attributes)
    }

    /// Check if number of schema items is within limits
    pub fn check_schema_items(&self, count: usize) -> Result<()> {
        check("Schema item count", count, self.max_schema_items)
    }

    /// Check if number of properties on one class is within limits
    pub fn check_properties(&self, count: usize) -> Result<()> {
        check("Property count", count, self.max_properties)
    }

    /// Check if struct value nesting is within limits
    pub fn check_struct_depth(&self, depth: usize) -> Result<()> {
        check("Struct value depth", depth, self.max_struct_depth)
    }

    /// Check if a base-class chain is within limits
    pub fn check_inheritance_depth(&self, depth: usize) -> Result<()> {
        check("Base class chain length", depth, self.max_inheritance_depth)
    }
}

fn check(what: &str, value: usize, max: usize) -> Result<()> {
    if value > max {
        Err(Error::LimitExceeded(format!(
            "{} {} exceeds maximum {}",
            what, value, max
        )))
    } else {
        Ok(())
    }
}
