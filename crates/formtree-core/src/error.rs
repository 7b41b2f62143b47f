//! # Error Types
//!
//! Errors raised while configuring formtree or loading documents from disk.
//! Both are configuration-time failures: they indicate a bad setup, never
//! bad user data. Data-time validation errors live in `formtree-schema`.

use thiserror::Error;

/// Invalid delimiter or form configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The flat-key delimiter must contain at least one character.
    #[error("delimiter must not be empty")]
    EmptyDelimiter,

    /// An environment variable held a value that could not be used.
    #[error("invalid value for {var}: {reason}")]
    InvalidEnv {
        /// Name of the environment variable.
        var: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The configuration document could not be loaded.
    #[error("config document error: {0}")]
    Document(#[from] DocumentError),

    /// The configuration document had the wrong shape.
    #[error("invalid config in '{path}': {reason}")]
    Invalid {
        /// Path of the configuration file.
        path: String,
        /// Deserialization failure.
        reason: String,
    },
}

/// A JSON or YAML document could not be read or parsed.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The file could not be read.
    #[error("cannot read '{path}': {source}")]
    Read {
        /// Path of the document.
        path: String,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },

    /// The content was not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The content was not valid YAML.
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The YAML content used a construct with no JSON equivalent.
    #[error("YAML-to-JSON conversion failed: {0}")]
    Conversion(String),
}
