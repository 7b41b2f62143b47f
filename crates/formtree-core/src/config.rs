//! Form transport configuration.
//!
//! Controls how nested values are projected onto flat keys: the delimiter
//! joining path segments and the prefix every submitted key carries.
//! Defaults match what browsers send for a form named `form`
//! (`form__name`, `form__pets__0__name`). Override via environment
//! variables, a JSON/YAML file, or explicit construction.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::delimiter::Delimiter;
use crate::document::load_document;
use crate::error::ConfigError;

/// Prefix used when none is configured.
pub const DEFAULT_PREFIX: &str = "form";

/// Delimiter and prefix for one form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormConfig {
    /// Separator between path segments in flat keys.
    pub delimiter: Delimiter,
    /// Leading segment of every submitted key. Empty means no prefix.
    pub prefix: String,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            delimiter: Delimiter::default(),
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

impl FormConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `FORMTREE_DELIMITER` (default: `__`, must not be empty)
    /// - `FORMTREE_PREFIX` (default: `form`, may be empty)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|var| std::env::var(var).ok())
    }

    fn from_vars(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(raw) = get("FORMTREE_DELIMITER") {
            config.delimiter = Delimiter::new(raw).map_err(|e| ConfigError::InvalidEnv {
                var: "FORMTREE_DELIMITER".to_string(),
                reason: e.to_string(),
            })?;
        }
        if let Some(prefix) = get("FORMTREE_PREFIX") {
            config.prefix = prefix;
        }
        Ok(config)
    }

    /// Load configuration from a JSON or YAML file. Missing fields keep
    /// their defaults; unknown fields are rejected.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let value = load_document(path)?;
        serde_json::from_value(value).map_err(|e| ConfigError::Invalid {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// The text every submitted key starts with (`form__`), or an empty
    /// string when no prefix is configured.
    pub fn key_prefix(&self) -> String {
        if self.prefix.is_empty() {
            String::new()
        } else {
            format!("{}{}", self.prefix, self.delimiter)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = FormConfig::default();
        assert_eq!(cfg.delimiter.as_str(), "__");
        assert_eq!(cfg.prefix, "form");
        assert_eq!(cfg.key_prefix(), "form__");
    }

    #[test]
    fn empty_prefix_has_no_key_prefix() {
        let cfg = FormConfig {
            prefix: String::new(),
            ..FormConfig::default()
        };
        assert_eq!(cfg.key_prefix(), "");
    }

    #[test]
    fn vars_override_defaults() {
        let cfg = FormConfig::from_vars(|var| match var {
            "FORMTREE_DELIMITER" => Some(".".to_string()),
            "FORMTREE_PREFIX" => Some("signup".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(cfg.key_prefix(), "signup.");
    }

    #[test]
    fn vars_absent_use_defaults() {
        let cfg = FormConfig::from_vars(|_| None).unwrap();
        assert_eq!(cfg, FormConfig::default());
    }

    #[test]
    fn empty_delimiter_var_rejected() {
        let result = FormConfig::from_vars(|var| {
            (var == "FORMTREE_DELIMITER").then(String::new)
        });
        assert!(matches!(result, Err(ConfigError::InvalidEnv { .. })));
    }

    #[test]
    fn from_yaml_file_partial() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("formtree.yaml");
        std::fs::write(&path, "delimiter: '-'\n").unwrap();
        let cfg = FormConfig::from_file(&path).unwrap();
        assert_eq!(cfg.delimiter.as_str(), "-");
        assert_eq!(cfg.prefix, "form");
    }

    #[test]
    fn from_file_rejects_unknown_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("formtree.json");
        std::fs::write(&path, r#"{"delimeter": "-"}"#).unwrap();
        let err = FormConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn from_file_rejects_empty_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("formtree.json");
        std::fs::write(&path, r#"{"delimiter": ""}"#).unwrap();
        assert!(FormConfig::from_file(&path).is_err());
    }
}
