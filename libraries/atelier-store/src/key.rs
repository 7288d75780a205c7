//! Validated object keys
//!
//! The keyspace is flat: a key is a bare filename (typically a minted
//! uuid plus the original extension). Validation happens once at
//! construction so the store implementations never touch raw strings.

use crate::error::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque object key (flat filename, no directories)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Validate and wrap a raw key
    ///
    /// Rejects empty keys, path separators, traversal components, and
    /// control characters. Everything else is accepted as-is.
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();

        if key.is_empty() {
            return Err(StoreError::InvalidKey("empty key".to_string()));
        }
        if key.contains('/') || key.contains('\\') {
            return Err(StoreError::InvalidKey(format!(
                "key contains path separator: {key}"
            )));
        }
        if key == "." || key == ".." {
            return Err(StoreError::InvalidKey(format!(
                "key is a traversal component: {key}"
            )));
        }
        if key.chars().any(char::is_control) {
            return Err(StoreError::InvalidKey(
                "key contains control characters".to_string(),
            ));
        }

        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercased extension of the key, if any
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.0)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
