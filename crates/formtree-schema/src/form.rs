//! # Form Binding
//!
//! Ties a [`Schema`] to the flat, prefixed keys a browser submits. A form
//! named `form` with the default delimiter receives keys such as
//! `form__name` and `form__pets__0__kind`; [`Form::bind`] strips the prefix,
//! deepens, and validates in one step.
//!
//! Renderers get two views of an instance: [`Form::to_flat`] for hidden
//! inputs and query strings, and [`Form::slots`] for one entry per leaf
//! input, including the template row of an empty list.

use formtree_core::{join_key, Delimiter, FlatMap, FormConfig};
use serde::Serialize;
use serde_json::Value;

use crate::instance::{Content, Instance};
use crate::node::Schema;
use crate::transcode::Deepened;

/// A schema bound to a transport configuration.
#[derive(Debug, Clone)]
pub struct Form {
    schema: Schema,
    config: FormConfig,
}

/// Result of [`Form::bind`].
#[derive(Debug, Clone)]
pub struct BoundForm {
    /// Validated instance tree.
    pub instance: Instance,
    /// Submitted keys that did not reach any field, sorted.
    pub unconsumed: Vec<String>,
}

impl BoundForm {
    /// Returns true if the submission validated without errors.
    pub fn is_valid(&self) -> bool {
        self.instance.is_valid()
    }
}

/// One leaf input as a renderer needs it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSlot {
    /// Full flat key, prefix included.
    pub key: String,
    /// Canonical value, null if absent, failing, or not yet validated.
    pub value: Value,
    /// Submitted value, for redisplay.
    pub raw: Value,
    /// Error message for this input.
    pub error: Option<String>,
    pub required: bool,
}

impl Form {
    pub fn new(schema: Schema, config: FormConfig) -> Self {
        Self { schema, config }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    fn delimiter(&self) -> &Delimiter {
        &self.config.delimiter
    }

    /// Strip the form prefix from submitted keys and deepen the rest.
    ///
    /// Keys that do not carry the prefix are reported unconsumed together
    /// with the keys the schema itself did not use.
    pub fn unflat(&self, submitted: &FlatMap) -> Deepened {
        let key_prefix = self.config.key_prefix();
        let mut own = FlatMap::new();
        let mut foreign = Vec::new();

        for (key, value) in submitted {
            let stripped = if key_prefix.is_empty() {
                Some(key.as_str())
            } else if *key == self.config.prefix {
                Some("")
            } else {
                key.strip_prefix(key_prefix.as_str())
            };
            match stripped {
                Some(rest) => {
                    own.insert(rest.to_string(), value.clone());
                }
                None => foreign.push(key.clone()),
            }
        }

        let mut deepened = self.schema.deepen_detailed(&own, self.delimiter());
        for key in &mut deepened.unconsumed {
            *key = join_key(&self.config.prefix, key, self.delimiter());
        }
        deepened.unconsumed.extend(foreign);
        deepened.unconsumed.sort();
        deepened
    }

    /// Unflatten and validate a submission.
    pub fn bind(&self, submitted: &FlatMap) -> BoundForm {
        let Deepened { value, unconsumed } = self.unflat(submitted);
        let instance = self.schema.instantiate(value);
        tracing::debug!(
            valid = instance.is_valid(),
            unconsumed = unconsumed.len(),
            "bound form submission"
        );
        BoundForm { instance, unconsumed }
    }

    /// Structurally complete, unvalidated instance for a first render.
    pub fn blank(&self) -> Instance {
        self.schema.default_instance()
    }

    /// Flatten an instance into prefixed keys.
    pub fn to_flat(&self, instance: &Instance) -> FlatMap {
        instance
            .flatten(self.delimiter())
            .into_iter()
            .map(|(key, value)| (join_key(&self.config.prefix, &key, self.delimiter()), value))
            .collect()
    }

    /// Leaf inputs of an instance, keyed with the form prefix.
    pub fn slots(&self, instance: &Instance) -> Vec<FieldSlot> {
        instance.slots(&self.config.prefix, self.delimiter())
    }
}

impl Instance {
    /// One [`FieldSlot`] per leaf, in pre-order, with keys under `id`.
    ///
    /// Composites without children (unvalidated, empty list, or failed
    /// shape check) contribute their structural default instead, so every
    /// input can still be drawn.
    pub fn slots(&self, id: &str, delimiter: &Delimiter) -> Vec<FieldSlot> {
        let mut out = Vec::new();
        self.collect_slots(id, delimiter, &mut out);
        out
    }

    fn collect_slots(&self, key: &str, delimiter: &Delimiter, out: &mut Vec<FieldSlot>) {
        match self.content() {
            Content::Leaf(_) => out.push(FieldSlot {
                key: key.to_string(),
                value: self.data(),
                raw: self.raw().clone(),
                error: self.error().map(ToString::to_string),
                required: self.schema().is_required(),
            }),
            Content::Items(items) if !items.is_empty() => {
                for (i, child) in items.iter().enumerate() {
                    child.collect_slots(&join_key(key, &i.to_string(), delimiter), delimiter, out);
                }
            }
            Content::Fields(fields) if !fields.is_empty() => {
                for (name, child) in fields {
                    child.collect_slots(&join_key(key, name, delimiter), delimiter, out);
                }
            }
            Content::Items(_) | Content::Fields(_) => {
                let defaults = self.schema().default_instance();
                if defaults.children().is_empty() {
                    return;
                }
                defaults.collect_slots(key, delimiter, out);
            }
        }
    }
}
