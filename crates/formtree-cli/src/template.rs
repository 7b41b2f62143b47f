//! # Template Subcommand
//!
//! Prints what a renderer needs for an empty form: the structural default
//! value and one slot per input, keyed with the configured prefix.

use std::path::PathBuf;

use clap::Args;
use formtree_core::FormConfig;
use formtree_schema::{FieldSlot, Form, Schema};
use serde::Serialize;
use serde_json::Value;

use crate::{load_schema, print_json};

/// Arguments for the template subcommand.
#[derive(Args, Debug)]
pub struct TemplateArgs {
    /// Schema document (JSON or YAML).
    #[arg(long)]
    pub schema: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct TemplateReport {
    /// Default value tree (lists hold one template row).
    pub default: Value,
    pub slots: Vec<FieldSlot>,
}

pub fn template_report(schema: &Schema, config: &FormConfig) -> TemplateReport {
    let form = Form::new(schema.clone(), config.clone());
    let blank = form.blank();
    TemplateReport {
        default: blank.data(),
        slots: form.slots(&blank),
    }
}

/// Run the template subcommand.
pub fn run_template(args: &TemplateArgs, config: &FormConfig) -> anyhow::Result<u8> {
    let schema = load_schema(&args.schema)?;
    let report = template_report(&schema, config);
    tracing::debug!(slots = report.slots.len(), "built form template");
    print_json(&report)?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use formtree_schema::Registry;
    use serde_json::json;

    #[test]
    fn template_lists_every_input() {
        let schema = Registry::standard()
            .load(&json!({
                "type": "dict",
                "fields": {
                    "name": "string",
                    "pets": {"type": "list", "item": {"type": "tuple", "items": ["string", "boolean"]}}
                }
            }))
            .unwrap();
        let report = template_report(&schema, &FormConfig::default());

        assert_eq!(report.default, json!({"name": null, "pets": [[null, null]]}));
        let keys: Vec<&str> = report.slots.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["form__name", "form__pets__0__0", "form__pets__0__1"]);
        assert!(report.slots.iter().all(|s| s.error.is_none() && s.value.is_null()));
    }
}
