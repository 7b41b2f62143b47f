//! # Validate Subcommand
//!
//! Validates one JSON/YAML document against a schema document and prints
//! the canonical data together with every error.
//!
//! ```text
//! formtree validate --schema signup.yaml submission.json [--strict]
//! ```

use std::path::PathBuf;

use clap::Args;
use formtree_core::FormConfig;
use formtree_schema::{FieldError, Schema};
use serde::Serialize;
use serde_json::Value;

use crate::{load_input, load_schema, print_json};

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Schema document (JSON or YAML).
    #[arg(long)]
    pub schema: PathBuf,

    /// Document to validate (JSON or YAML).
    pub input: PathBuf,

    /// Stop at the first error.
    #[arg(long)]
    pub strict: bool,
}

/// Output of a validation run.
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    /// Canonical value, null when invalid.
    pub data: Value,
    /// Errors in pre-order. At most one in strict mode.
    pub errors: Vec<FieldError>,
    /// Errors shaped like the data; omitted in strict mode or when valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_tree: Option<Value>,
}

/// Validate `raw` and build the report.
pub fn validation_report(schema: &Schema, raw: Value, strict: bool) -> ValidationReport {
    if strict {
        return match schema.check(&raw) {
            Ok(data) => ValidationReport {
                valid: true,
                data,
                errors: Vec::new(),
                error_tree: None,
            },
            Err(first) => ValidationReport {
                valid: false,
                data: Value::Null,
                errors: vec![first],
                error_tree: None,
            },
        };
    }
    let instance = schema.instantiate(raw);
    ValidationReport {
        valid: instance.is_valid(),
        data: instance.data(),
        errors: instance.errors().collect(),
        error_tree: instance.error_tree(),
    }
}

/// Run the validate subcommand.
pub fn run_validate(args: &ValidateArgs, _config: &FormConfig) -> anyhow::Result<u8> {
    let schema = load_schema(&args.schema)?;
    let raw = load_input(&args.input)?;
    let report = validation_report(&schema, raw, args.strict);

    for error in &report.errors {
        tracing::info!(path = %error.path, "{}", error.error);
    }
    print_json(&report)?;

    if report.valid {
        tracing::info!(input = %args.input.display(), "input is valid");
        Ok(0)
    } else {
        tracing::warn!(
            input = %args.input.display(),
            errors = report.errors.len(),
            "input is invalid"
        );
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formtree_schema::Registry;
    use serde_json::json;

    fn person() -> Schema {
        Registry::standard()
            .load(&json!({
                "type": "dict",
                "fields": {
                    "name": {"type": "string", "min_length": 1},
                    "age": {"type": "integer", "min": 0}
                }
            }))
            .unwrap()
    }

    #[test]
    fn report_valid() {
        let report = validation_report(&person(), json!({"name": "Ann", "age": "30"}), false);
        assert!(report.valid);
        assert_eq!(report.data, json!({"name": "Ann", "age": 30}));
        assert!(report.errors.is_empty());
        assert!(report.error_tree.is_none());
    }

    #[test]
    fn report_collects_all_errors() {
        let report = validation_report(&person(), json!({"name": "", "age": "-4"}), false);
        assert!(!report.valid);
        assert_eq!(report.data, Value::Null);
        assert_eq!(report.errors.len(), 2);
        assert_eq!(
            report.error_tree,
            Some(json!({"age": "Must be at least 0", "name": "Must be longer than 1"}))
        );
    }

    #[test]
    fn strict_report_has_first_error_only() {
        let report = validation_report(&person(), json!({"name": "", "age": "-4"}), true);
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].path.to_string(), "/age");
    }

    #[test]
    fn report_serializes_paths_and_messages() {
        let report = validation_report(&person(), json!({"name": "Ann", "age": "x"}), false);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(
            value["errors"],
            json!([{"path": ["age"], "error": "Must be a number"}])
        );
    }

    #[test]
    fn run_returns_one_for_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("schema.json");
        let input = dir.path().join("input.yaml");
        std::fs::write(&schema, r#"{"type": "integer", "max": 5}"#).unwrap();
        std::fs::write(&input, "9\n").unwrap();

        let args = ValidateArgs { schema, input, strict: false };
        assert_eq!(run_validate(&args, &FormConfig::default()).unwrap(), 1);
    }
}
