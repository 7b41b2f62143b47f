//! # Delimiter
//!
//! The separator joining path segments into flat keys. Flat keys must not
//! contain the delimiter inside a single segment; that is left to callers
//! and not checked here.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Separator used when no other delimiter is configured.
pub const DEFAULT_DELIMITER: &str = "__";

/// A validated, non-empty flat-key separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Delimiter(String);

impl Delimiter {
    /// Build a delimiter, rejecting the empty string.
    pub fn new(delimiter: impl Into<String>) -> Result<Self, ConfigError> {
        let delimiter = delimiter.into();
        if delimiter.is_empty() {
            return Err(ConfigError::EmptyDelimiter);
        }
        Ok(Self(delimiter))
    }

    /// The separator text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split `key` at the first occurrence of the delimiter.
    ///
    /// Returns `(base, remainder)`; the remainder is empty when the key
    /// does not contain the delimiter.
    pub fn split_first<'k>(&self, key: &'k str) -> (&'k str, &'k str) {
        key.split_once(self.0.as_str()).unwrap_or((key, ""))
    }
}

impl Default for Delimiter {
    fn default() -> Self {
        Self(DEFAULT_DELIMITER.to_string())
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Delimiter {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Delimiter> for String {
    fn from(value: Delimiter) -> Self {
        value.0
    }
}

impl AsRef<str> for Delimiter {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
