//! # Flatten / Deepen Subcommands
//!
//! ```text
//! formtree flatten --schema S INPUT [--form] [--query]
//! formtree deepen  --schema S (FLAT | --query QS) [--form] [--validate]
//! ```
//!
//! `--form` applies the configured prefix (`form__...`). Flat input for
//! `deepen` is either a JSON/YAML object or an urlencoded query string.

use std::path::PathBuf;

use clap::Args;
use formtree_core::{encode_query, parse_query, FlatMap, FormConfig};
use formtree_schema::{Deepened, FieldError, Form, Schema};
use serde::Serialize;
use serde_json::Value;

use crate::{load_flat, load_input, load_schema, print_json};

/// Arguments for the flatten subcommand.
#[derive(Args, Debug)]
pub struct FlattenArgs {
    /// Schema document (JSON or YAML).
    #[arg(long)]
    pub schema: PathBuf,

    /// Nested document to flatten (JSON or YAML).
    pub input: PathBuf,

    /// Prefix keys with the form prefix.
    #[arg(long)]
    pub form: bool,

    /// Print an urlencoded query string instead of JSON.
    #[arg(long)]
    pub query: bool,
}

/// Arguments for the deepen subcommand.
#[derive(Args, Debug)]
pub struct DeepenArgs {
    /// Schema document (JSON or YAML).
    #[arg(long)]
    pub schema: PathBuf,

    /// Flat mapping (JSON or YAML object).
    #[arg(required_unless_present = "query")]
    pub flat: Option<PathBuf>,

    /// Urlencoded query string to deepen instead of a file.
    #[arg(long, conflicts_with = "flat")]
    pub query: Option<String>,

    /// Expect keys carrying the form prefix.
    #[arg(long)]
    pub form: bool,

    /// Validate the rebuilt value and report errors.
    #[arg(long)]
    pub validate: bool,
}

/// Validate `raw` and flatten the resulting instance.
///
/// Returns the flat mapping and whether the input was valid. Invalid
/// leaves are left out of the mapping.
pub fn flatten_value(schema: &Schema, raw: Value, config: &FormConfig, form: bool) -> (FlatMap, bool) {
    let instance = schema.instantiate(raw);
    let flat = if form {
        Form::new(schema.clone(), config.clone()).to_flat(&instance)
    } else {
        instance.to_flat_map(&config.delimiter)
    };
    (flat, instance.is_valid())
}

/// Output of the deepen subcommand.
#[derive(Debug, Serialize)]
pub struct DeepenReport {
    /// Nested value rebuilt from the flat input.
    pub value: Value,
    /// Flat keys no field consumed.
    pub unconsumed: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

/// Deepen a flat mapping, optionally validating the result.
pub fn deepen_report(
    schema: &Schema,
    flat: &FlatMap,
    config: &FormConfig,
    form: bool,
    validate: bool,
) -> DeepenReport {
    let Deepened { value, unconsumed } = if form {
        Form::new(schema.clone(), config.clone()).unflat(flat)
    } else {
        schema.deepen_detailed(flat, &config.delimiter)
    };

    let mut report = DeepenReport {
        value,
        unconsumed,
        valid: None,
        data: None,
        errors: None,
    };
    if validate {
        let instance = schema.instantiate(report.value.clone());
        report.valid = Some(instance.is_valid());
        report.data = Some(instance.data());
        report.errors = Some(instance.errors().collect());
    }
    report
}

/// Run the flatten subcommand.
pub fn run_flatten(args: &FlattenArgs, config: &FormConfig) -> anyhow::Result<u8> {
    let schema = load_schema(&args.schema)?;
    let raw = load_input(&args.input)?;
    let (flat, valid) = flatten_value(&schema, raw, config, args.form);

    if args.query {
        println!("{}", encode_query(&flat));
    } else {
        print_json(&flat)?;
    }

    if valid {
        Ok(0)
    } else {
        tracing::warn!(input = %args.input.display(), "input is invalid; failing leaves omitted");
        Ok(1)
    }
}

/// Run the deepen subcommand.
pub fn run_deepen(args: &DeepenArgs, config: &FormConfig) -> anyhow::Result<u8> {
    let schema = load_schema(&args.schema)?;
    let flat = match (&args.flat, &args.query) {
        (_, Some(query)) => parse_query(query),
        (Some(path), None) => load_flat(path)?,
        (None, None) => anyhow::bail!("either a flat input file or --query is required"),
    };

    let report = deepen_report(&schema, &flat, config, args.form, args.validate);
    if !report.unconsumed.is_empty() {
        tracing::warn!(keys = ?report.unconsumed, "flat keys were not consumed by the schema");
    }
    print_json(&report)?;

    Ok(match report.valid {
        Some(false) => 1,
        _ => 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use formtree_core::Delimiter;
    use formtree_schema::Registry;
    use serde_json::json;

    fn tuple_dict() -> Schema {
        Registry::standard()
            .load(&json!({
                "type": "dict",
                "fields": {
                    "a": {"type": "integer", "max": 90, "required": false},
                    "b": "string",
                    "c": {
                        "type": "tuple",
                        "items": [
                            {"type": "integer", "max": 90, "required": false},
                            "string",
                            {"type": "integer", "max": 90, "required": false}
                        ]
                    }
                }
            }))
            .unwrap()
    }

    fn flat(value: Value) -> FlatMap {
        match value {
            Value::Object(map) => map.into_iter().collect(),
            _ => FlatMap::new(),
        }
    }

    #[test]
    fn flatten_plain_and_prefixed() {
        let raw = json!({"b": "kuku", "c": [null, "Lorem", 78]});
        let config = FormConfig::default();

        let (plain, valid) = flatten_value(&tuple_dict(), raw.clone(), &config, false);
        assert!(valid);
        assert_eq!(plain, flat(json!({"b": "kuku", "c__1": "Lorem", "c__2": 78})));

        let (prefixed, _) = flatten_value(&tuple_dict(), raw, &config, true);
        assert_eq!(
            prefixed,
            flat(json!({"form__b": "kuku", "form__c__1": "Lorem", "form__c__2": 78}))
        );
    }

    #[test]
    fn flatten_invalid_omits_failing_leaf() {
        let raw = json!({"b": "kuku", "c": [1, "Lorem", 91]});
        let (out, valid) = flatten_value(&tuple_dict(), raw, &FormConfig::default(), false);
        assert!(!valid);
        assert_eq!(out, flat(json!({"b": "kuku", "c__0": 1, "c__1": "Lorem"})));
    }

    #[test]
    fn deepen_query_string_with_form_prefix() {
        let query = "form__b=kuku&form__c__1=Lorem&form__c__2=78&submit=Go";
        let report = deepen_report(
            &tuple_dict(),
            &parse_query(query),
            &FormConfig::default(),
            true,
            true,
        );
        assert_eq!(report.value, json!({"a": null, "b": "kuku", "c": [null, "Lorem", "78"]}));
        assert_eq!(report.unconsumed, vec!["submit"]);
        assert_eq!(report.valid, Some(true));
        assert_eq!(report.data, Some(json!({"a": null, "b": "kuku", "c": [null, "Lorem", 78]})));
    }

    #[test]
    fn deepen_custom_delimiter_without_validation() {
        let config = FormConfig {
            delimiter: Delimiter::new(".").unwrap(),
            ..FormConfig::default()
        };
        let report = deepen_report(
            &tuple_dict(),
            &flat(json!({"b": "x", "c.0": 95, "c.7": 1})),
            &config,
            false,
            false,
        );
        assert_eq!(report.value, json!({"a": null, "b": "x", "c": [95, null, null]}));
        assert_eq!(report.unconsumed, vec!["c.7"]);
        assert!(report.valid.is_none());

        let serialized = serde_json::to_value(&report).unwrap();
        assert!(serialized.get("errors").is_none());
    }

    #[test]
    fn run_deepen_reads_query_flag() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("schema.yaml");
        std::fs::write(&schema, "type: list\nitem: integer\n").unwrap();

        let args = DeepenArgs {
            schema,
            flat: None,
            query: Some("0=1&1=x".to_string()),
            form: false,
            validate: true,
        };
        assert_eq!(run_deepen(&args, &FormConfig::default()).unwrap(), 1);
    }
}
