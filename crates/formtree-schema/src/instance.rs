//! # Validator Instances
//!
//! An [`Instance`] is one validation run of a [`Schema`] over one raw
//! input. It keeps the raw value, the validated content (scalar value or
//! child instances), and at most one error raised by this node itself.
//!
//! ## Error model
//!
//! Errors are never stored twice. A composite whose children failed keeps
//! no error of its own; [`Instance::errors`] walks the tree and yields
//! every node's own error in depth-first pre-order, each with its path.
//! [`Instance::data`] of a composite with any failing descendant is null,
//! while the children keep their partial results for inspection.
//!
//! ## Lifecycle
//!
//! `Pending` (bound, not yet validated) → `Absent` (optional node with
//! blank input) or `Checked`. Validation runs at most once.

use std::collections::BTreeMap;

use formtree_core::{FieldPath, Segment};
use serde_json::{Map, Value};

use crate::error::{FieldError, ValidationError};
use crate::node::Schema;
use crate::scalar::is_blank;

/// Where an instance is in its single validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Bound to input but not validated.
    Pending,
    /// Optional node with blank input; validation short-circuited.
    Absent,
    /// Validation ran.
    Checked,
}

/// Validated content of an instance.
#[derive(Debug, Clone)]
pub enum Content {
    /// Canonical scalar value (null until validated).
    Leaf(Value),
    /// Child instances of a tuple or list, in position order.
    Items(Vec<Instance>),
    /// Child instances of a dict, in name order.
    Fields(BTreeMap<String, Instance>),
}

/// One validation run bound to one raw input.
#[derive(Debug, Clone)]
pub struct Instance {
    schema: Schema,
    raw: Value,
    state: State,
    content: Content,
    error: Option<ValidationError>,
}

impl Instance {
    pub(crate) fn pending(schema: Schema, raw: Value, content: Content) -> Self {
        Self {
            schema,
            raw,
            state: State::Pending,
            content,
            error: None,
        }
    }

    /// Run the validation pass. Does nothing if it already ran.
    pub fn validate(&mut self) {
        if self.state != State::Pending {
            return;
        }
        if !self.schema.is_required() && is_blank(&self.raw) {
            self.state = State::Absent;
            return;
        }
        match self.schema.run(&self.raw) {
            Ok(content) => self.content = content,
            Err(e) => self.error = Some(e),
        }
        self.state = State::Checked;
    }

    /// The schema this instance validates against.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The untouched input.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Lifecycle state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Returns true if the node was optional and given no input.
    pub fn is_absent(&self) -> bool {
        self.state == State::Absent
    }

    /// Validated content (or the kind's default before validation).
    pub fn content(&self) -> &Content {
        &self.content
    }

    /// This node's own error, not including children.
    pub fn error(&self) -> Option<&ValidationError> {
        self.error.as_ref()
    }

    /// Child instances of a tuple or list.
    pub fn items(&self) -> &[Instance] {
        match &self.content {
            Content::Items(items) => items,
            _ => &[],
        }
    }

    /// Child instance of a dict by field name.
    pub fn field(&self, name: &str) -> Option<&Instance> {
        match &self.content {
            Content::Fields(fields) => fields.get(name),
            _ => None,
        }
    }

    /// Direct children paired with the path segment addressing them.
    pub fn children(&self) -> Vec<(Segment, &Instance)> {
        match &self.content {
            Content::Leaf(_) => Vec::new(),
            Content::Items(items) => items
                .iter()
                .enumerate()
                .map(|(i, child)| (Segment::Index(i), child))
                .collect(),
            Content::Fields(fields) => fields
                .iter()
                .map(|(name, child)| (Segment::Name(name.clone()), child))
                .collect(),
        }
    }

    /// Returns true if this node or any descendant has an error.
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Returns true once validated with no error anywhere in the subtree.
    pub fn is_valid(&self) -> bool {
        self.state != State::Pending && !self.has_errors()
    }

    /// The canonical value tree.
    ///
    /// Null for absent nodes, nodes with their own error, and composites
    /// with a failing descendant.
    pub fn data(&self) -> Value {
        if self.state == State::Absent || self.error.is_some() {
            return Value::Null;
        }
        match &self.content {
            Content::Leaf(value) => value.clone(),
            Content::Items(items) => {
                if items.iter().any(Instance::has_errors) {
                    Value::Null
                } else {
                    Value::Array(items.iter().map(Instance::data).collect())
                }
            }
            Content::Fields(fields) => {
                if fields.values().any(Instance::has_errors) {
                    Value::Null
                } else {
                    Value::Object(
                        fields
                            .iter()
                            .map(|(name, child)| (name.clone(), child.data()))
                            .collect(),
                    )
                }
            }
        }
    }

    /// Lazy depth-first, pre-order walk over every error in the subtree.
    pub fn errors(&self) -> Errors<'_> {
        Errors {
            stack: vec![(FieldPath::root(), self)],
        }
    }

    /// Error messages in pre-order, without paths.
    pub fn messages(&self) -> Vec<String> {
        self.errors().map(|e| e.message()).collect()
    }

    /// Errors shaped like the data: a message string at a failing node,
    /// an array (tuple/list) or object (dict) of child error trees where
    /// descendants failed, `None` for a valid subtree.
    ///
    /// Arrays hold null at valid positions; objects list failing names only.
    pub fn error_tree(&self) -> Option<Value> {
        if let Some(e) = &self.error {
            return Some(Value::String(e.to_string()));
        }
        match &self.content {
            Content::Leaf(_) => None,
            Content::Items(items) => {
                let trees: Vec<Option<Value>> = items.iter().map(Instance::error_tree).collect();
                if trees.iter().all(Option::is_none) {
                    return None;
                }
                Some(Value::Array(
                    trees.into_iter().map(|t| t.unwrap_or(Value::Null)).collect(),
                ))
            }
            Content::Fields(fields) => {
                let failing: Map<String, Value> = fields
                    .iter()
                    .filter_map(|(name, child)| child.error_tree().map(|t| (name.clone(), t)))
                    .collect();
                (!failing.is_empty()).then_some(Value::Object(failing))
            }
        }
    }
}

/// Iterator returned by [`Instance::errors`].
#[derive(Debug)]
pub struct Errors<'a> {
    stack: Vec<(FieldPath, &'a Instance)>,
}

impl Iterator for Errors<'_> {
    type Item = FieldError;

    fn next(&mut self) -> Option<FieldError> {
        while let Some((path, node)) = self.stack.pop() {
            let children = node.children();
            for (segment, child) in children.into_iter().rev() {
                self.stack.push((path.child(segment), child));
            }
            if let Some(error) = &node.error {
                return Some(FieldError::new(path, error.clone()));
            }
        }
        None
    }
}
