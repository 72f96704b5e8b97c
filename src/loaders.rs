//! Resource loading utilities
//!
//! This module reads schema files from disk before they are handed to the
//! XML layer, enforcing the configured size limit.

use crate::error::{Error, Result};
use crate::limits::Limits;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Resource loader for schema files
#[derive(Debug, Default)]
pub struct Loader {
    /// Resource limits
    limits: Limits,
}

impl Loader {
    /// Create a new loader with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Load a file as bytes
    pub fn load_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        // Check the size before reading the whole file into memory
        let metadata = fs::metadata(path).map_err(|e| {
            Error::Resource(format!("Failed to read file '{}': {}", path.display(), e))
        })?;
        self.limits
            .check_xml_size(usize::try_from(metadata.len()).unwrap_or(usize::MAX))?;

        let content = fs::read(path).map_err(|e| {
            Error::Resource(format!("Failed to read file '{}': {}", path.display(), e))
        })?;
        self.limits.check_xml_size(content.len())?;

        debug!(path = %path.display(), bytes = content.len(), "loaded schema file");
        Ok(content)
    }
}
