//! # formtree-cli: Command-Line Interface
//!
//! Thin clap front end over `formtree-schema`. Every subcommand loads a
//! schema document, reads its input, and prints a JSON report on stdout.
//!
//! ## Subcommands
//!
//! - `validate`: validate a JSON/YAML document, print data and errors
//! - `flatten`: validate, then print the flat mapping or query string
//! - `deepen`: rebuild nested input from a flat mapping or query string
//! - `template`: print the blank default instance and its field slots
//!
//! ## Exit codes
//!
//! `0` on success, `1` when the input is invalid or a command fails. Errors
//! are reported through `tracing`.
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers here build reports from
//!   domain types and only the `run_*` functions touch stdout.

pub mod template;
pub mod transcode;
pub mod validate;

use std::path::Path;

use anyhow::Context;
use formtree_core::{load_document, Delimiter, FlatMap, FormConfig};
use formtree_schema::{Registry, Schema};
use serde::Serialize;
use serde_json::Value;

/// Build the effective form configuration.
///
/// A `--config` file replaces the environment (`FORMTREE_DELIMITER`,
/// `FORMTREE_PREFIX`); explicit flags override either.
pub fn resolve_config(
    config_path: Option<&Path>,
    delimiter: Option<&str>,
    prefix: Option<&str>,
) -> anyhow::Result<FormConfig> {
    let mut config = match config_path {
        Some(path) => FormConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => FormConfig::from_env().context("invalid formtree environment")?,
    };
    if let Some(d) = delimiter {
        config.delimiter = Delimiter::new(d).context("invalid --delimiter")?;
    }
    if let Some(p) = prefix {
        config.prefix = p.to_string();
    }
    tracing::debug!(
        delimiter = %config.delimiter,
        prefix = %config.prefix,
        "resolved form configuration"
    );
    Ok(config)
}

/// Load a schema document through the standard registry.
pub fn load_schema(path: &Path) -> anyhow::Result<Schema> {
    Registry::standard()
        .load_file(path)
        .with_context(|| format!("failed to load schema from {}", path.display()))
}

/// Read a JSON or YAML input document.
pub fn load_input(path: &Path) -> anyhow::Result<Value> {
    load_document(path).with_context(|| format!("failed to read input from {}", path.display()))
}

/// Read a flat mapping: a JSON or YAML object with scalar values.
pub fn load_flat(path: &Path) -> anyhow::Result<FlatMap> {
    match load_input(path)? {
        Value::Object(map) => Ok(map.into_iter().collect()),
        other => anyhow::bail!(
            "flat input in {} must be an object, got {}",
            path.display(),
            kind_name(&other)
        ),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Pretty-print a report on stdout.
pub fn print_json<T: Serialize>(report: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(report).context("failed to serialize report")?;
    println!("{text}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn flags_override_config_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "delimiter: \".\"\nprefix: signup").unwrap();

        let config = resolve_config(Some(file.path()), None, None).unwrap();
        assert_eq!(config.key_prefix(), "signup.");

        let config = resolve_config(Some(file.path()), Some("::"), Some("")).unwrap();
        assert_eq!(config.delimiter.as_str(), "::");
        assert_eq!(config.key_prefix(), "");
    }

    #[test]
    fn empty_delimiter_flag_rejected() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{{}}").unwrap();
        assert!(resolve_config(Some(file.path()), Some(""), None).is_err());
    }

    #[test]
    fn flat_input_must_be_object() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "[1, 2]").unwrap();
        let err = load_flat(file.path()).unwrap_err();
        assert!(err.to_string().contains("must be an object, got an array"));
    }

    #[test]
    fn missing_schema_has_context() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_schema(&dir.path().join("nope.json")).unwrap_err();
        assert!(err.to_string().starts_with("failed to load schema from"));
    }
}
