//! # Schema Nodes
//!
//! A [`Schema`] is a configured, reusable validator type: one node kind,
//! its constraints, the child schemas it composes, and whether input is
//! required. It is built once and shared; cloning a `Schema` clones a
//! handle, and every validation run allocates its own [`Instance`] tree.
//!
//! ## Invariants
//!
//! - Nodes are immutable after construction. `Schema` is `Send + Sync`,
//!   so one schema can validate independent inputs on many threads.
//! - A composite can only reference schemas that already exist, so every
//!   schema tree is finite and acyclic. Recursion depth during validation
//!   equals schema depth.
//! - Tuple arity is the length of its child list and never changes.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use formtree_core::{FieldPath, Segment};
use serde_json::{Map, Value};

use crate::error::{FieldError, SchemaError, ValidationError};
use crate::instance::{Content, Instance};
use crate::scalar::{is_blank, truthiness, IntegerRules, StringRules};

/// The closed set of node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    /// Text leaf.
    String,
    /// Integer leaf.
    Integer,
    /// Truthiness leaf.
    Boolean,
    /// Fixed-arity ordered composite.
    Tuple,
    /// Variable-length homogeneous composite.
    List,
    /// Named composite.
    Dict,
}

impl Kind {
    /// Every kind, in declaration order.
    pub const ALL: [Kind; 6] = [
        Kind::String,
        Kind::Integer,
        Kind::Boolean,
        Kind::Tuple,
        Kind::List,
        Kind::Dict,
    ];

    /// The type name used in schema documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Integer => "integer",
            Kind::Boolean => "boolean",
            Kind::Tuple => "tuple",
            Kind::List => "list",
            Kind::Dict => "dict",
        }
    }

    /// Returns true for tuple, list, and dict.
    pub fn is_composite(&self) -> bool {
        matches!(self, Kind::Tuple | Kind::List | Kind::Dict)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| SchemaError::UnknownSchemaType(s.to_string()))
    }
}

/// Kind-specific configuration of a node.
#[derive(Debug, Clone)]
pub enum NodeSpec {
    /// Text leaf constraints.
    String(StringRules),
    /// Integer leaf constraints.
    Integer(IntegerRules),
    /// Truthiness leaf; takes no constraints.
    Boolean,
    /// Per-position child types. The length is the arity.
    Tuple(Vec<Schema>),
    /// Element type.
    List(Schema),
    /// Child type per field name, name-ordered.
    Dict(BTreeMap<String, Schema>),
}

impl NodeSpec {
    /// The kind this configuration belongs to.
    pub fn kind(&self) -> Kind {
        match self {
            NodeSpec::String(_) => Kind::String,
            NodeSpec::Integer(_) => Kind::Integer,
            NodeSpec::Boolean => Kind::Boolean,
            NodeSpec::Tuple(_) => Kind::Tuple,
            NodeSpec::List(_) => Kind::List,
            NodeSpec::Dict(_) => Kind::Dict,
        }
    }
}

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) required: bool,
    pub(crate) spec: NodeSpec,
}

/// A configured, immutable validator type.
#[derive(Debug, Clone)]
pub struct Schema(Arc<Node>);

impl Schema {
    /// Wrap a node configuration.
    pub fn new(spec: NodeSpec, required: bool) -> Self {
        Self(Arc::new(Node { required, spec }))
    }

    /// Node kind.
    pub fn kind(&self) -> Kind {
        self.0.spec.kind()
    }

    /// Whether blank input is an error (`true`) or marks the node absent.
    pub fn is_required(&self) -> bool {
        self.0.required
    }

    /// Kind-specific configuration.
    pub fn spec(&self) -> &NodeSpec {
        &self.0.spec
    }

    /// Tuple arity, or `None` for other kinds.
    pub fn arity(&self) -> Option<usize> {
        match &self.0.spec {
            NodeSpec::Tuple(items) => Some(items.len()),
            _ => None,
        }
    }

    /// Returns true if both handles point at the same node.
    pub fn ptr_eq(&self, other: &Schema) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Bind raw input without validating it yet.
    ///
    /// The instance starts at the kind's empty default (null, empty
    /// sequence, empty mapping) until [`Instance::validate`] runs.
    pub fn bind(&self, raw: Value) -> Instance {
        Instance::pending(self.clone(), raw, self.empty_content())
    }

    /// Bind raw input and validate it immediately.
    pub fn instantiate(&self, raw: Value) -> Instance {
        let mut instance = self.bind(raw);
        instance.validate();
        instance
    }

    /// An unvalidated, structurally complete instance with no input.
    ///
    /// Tuples hold one default child per position, lists a single default
    /// child (a template row), dicts one default child per field.
    pub fn default_instance(&self) -> Instance {
        Instance::pending(self.clone(), Value::Null, self.default_content())
    }

    /// Validate in strict mode: return the canonical value, or abort at the
    /// first failing node in pre-order.
    pub fn check(&self, raw: &Value) -> Result<Value, FieldError> {
        let mut path = FieldPath::root();
        let result = self.check_at(raw, &mut path);
        if let Err(e) = &result {
            tracing::debug!(path = %e.path, error = %e.error, "strict validation failed");
        }
        result
    }

    fn check_at(&self, raw: &Value, path: &mut FieldPath) -> Result<Value, FieldError> {
        if !self.0.required && is_blank(raw) {
            return Ok(Value::Null);
        }
        let fail = |path: &FieldPath, error| FieldError::new(path.clone(), error);

        match &self.0.spec {
            NodeSpec::String(rules) => rules.check(raw).map_err(|e| fail(path, e)),
            NodeSpec::Integer(rules) => rules.check(raw).map_err(|e| fail(path, e)),
            NodeSpec::Boolean => Ok(Value::Bool(truthiness(raw))),
            NodeSpec::Tuple(items) => {
                let values = raw
                    .as_array()
                    .ok_or_else(|| fail(path, ValidationError::NotIterable))?;
                if values.len() != items.len() {
                    return Err(fail(
                        path,
                        ValidationError::ArityMismatch {
                            expected: items.len(),
                            actual: values.len(),
                        },
                    ));
                }
                let mut out = Vec::with_capacity(items.len());
                for (i, (schema, value)) in items.iter().zip(values).enumerate() {
                    path.push(Segment::Index(i));
                    out.push(schema.check_at(value, path)?);
                    path.pop();
                }
                Ok(Value::Array(out))
            }
            NodeSpec::List(item) => {
                let values = raw
                    .as_array()
                    .ok_or_else(|| fail(path, ValidationError::NotIterable))?;
                let mut out = Vec::with_capacity(values.len());
                for (i, value) in values.iter().enumerate() {
                    path.push(Segment::Index(i));
                    out.push(item.check_at(value, path)?);
                    path.pop();
                }
                Ok(Value::Array(out))
            }
            NodeSpec::Dict(fields) => {
                let object = raw
                    .as_object()
                    .ok_or_else(|| fail(path, ValidationError::WrongShape))?;
                let mut out = Map::new();
                for (name, schema) in fields {
                    path.push(Segment::Name(name.clone()));
                    let value = schema.check_at(object.get(name).unwrap_or(&Value::Null), path)?;
                    path.pop();
                    out.insert(name.clone(), value);
                }
                Ok(Value::Object(out))
            }
        }
    }

    pub(crate) fn empty_content(&self) -> Content {
        match &self.0.spec {
            NodeSpec::String(_) | NodeSpec::Integer(_) | NodeSpec::Boolean => {
                Content::Leaf(Value::Null)
            }
            NodeSpec::Tuple(_) | NodeSpec::List(_) => Content::Items(Vec::new()),
            NodeSpec::Dict(_) => Content::Fields(BTreeMap::new()),
        }
    }

    pub(crate) fn default_content(&self) -> Content {
        match &self.0.spec {
            NodeSpec::String(_) | NodeSpec::Integer(_) | NodeSpec::Boolean => {
                Content::Leaf(Value::Null)
            }
            NodeSpec::Tuple(items) => {
                Content::Items(items.iter().map(Schema::default_instance).collect())
            }
            NodeSpec::List(item) => Content::Items(vec![item.default_instance()]),
            NodeSpec::Dict(fields) => Content::Fields(
                fields
                    .iter()
                    .map(|(name, schema)| (name.clone(), schema.default_instance()))
                    .collect(),
            ),
        }
    }

    /// Run one validation pass over `raw`, producing this node's content or
    /// its own error. Child failures stay on the children.
    pub(crate) fn run(&self, raw: &Value) -> Result<Content, ValidationError> {
        match &self.0.spec {
            NodeSpec::String(rules) => rules.check(raw).map(Content::Leaf),
            NodeSpec::Integer(rules) => rules.check(raw).map(Content::Leaf),
            NodeSpec::Boolean => Ok(Content::Leaf(Value::Bool(truthiness(raw)))),
            NodeSpec::Tuple(items) => {
                let values = raw.as_array().ok_or(ValidationError::NotIterable)?;
                if values.len() != items.len() {
                    return Err(ValidationError::ArityMismatch {
                        expected: items.len(),
                        actual: values.len(),
                    });
                }
                Ok(Content::Items(
                    items
                        .iter()
                        .zip(values)
                        .map(|(schema, value)| schema.instantiate(value.clone()))
                        .collect(),
                ))
            }
            NodeSpec::List(item) => {
                let values = raw.as_array().ok_or(ValidationError::NotIterable)?;
                Ok(Content::Items(
                    values.iter().map(|v| item.instantiate(v.clone())).collect(),
                ))
            }
            NodeSpec::Dict(fields) => {
                let object = raw.as_object().ok_or(ValidationError::WrongShape)?;
                Ok(Content::Fields(
                    fields
                        .iter()
                        .map(|(name, schema)| {
                            let value = object.get(name).cloned().unwrap_or(Value::Null);
                            (name.clone(), schema.instantiate(value))
                        })
                        .collect(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn int(required: bool, max: Option<i64>) -> Schema {
        Schema::new(NodeSpec::Integer(IntegerRules::new(None, max).unwrap()), required)
    }

    fn text() -> Schema {
        Schema::new(NodeSpec::String(StringRules::default()), true)
    }

    #[test]
    fn kind_names_round_trip() {
        for kind in Kind::ALL {
            assert_eq!(kind.as_str().parse::<Kind>().unwrap(), kind);
        }
        assert!(matches!(
            "Date".parse::<Kind>(),
            Err(SchemaError::UnknownSchemaType(_))
        ));
    }

    #[test]
    fn schema_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Schema>();
    }

    #[test]
    fn clone_shares_node() {
        let a = text();
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&text()));
    }

    #[test]
    fn strict_check_returns_value() {
        let tuple = Schema::new(NodeSpec::Tuple(vec![int(false, Some(90)), text(), int(false, Some(90))]), true);
        assert_eq!(
            tuple.check(&json!([10, "sdfsdf", "30"])).unwrap(),
            json!([10, "sdfsdf", 30])
        );
    }

    #[test]
    fn strict_check_stops_at_first_error_with_path() {
        let tuple = Schema::new(NodeSpec::Tuple(vec![int(true, Some(90)), text(), int(true, Some(90))]), true);
        let err = tuple.check(&json!([91, 5, 92])).unwrap_err();
        assert_eq!(err.path.to_string(), "/0");
        assert_eq!(err.error, ValidationError::above(90));
    }

    #[test]
    fn strict_check_optional_blank_is_null() {
        assert_eq!(int(false, None).check(&json!("")).unwrap(), Value::Null);
        assert_eq!(int(false, None).check(&Value::Null).unwrap(), Value::Null);
        assert!(int(true, None).check(&Value::Null).is_err());
    }

    #[test]
    fn arity_reported() {
        let tuple = Schema::new(NodeSpec::Tuple(vec![text(), text()]), true);
        assert_eq!(tuple.arity(), Some(2));
        assert_eq!(text().arity(), None);
        let err = tuple.check(&json!(["a"])).unwrap_err();
        assert!(err.path.is_root());
        assert_eq!(err.error, ValidationError::ArityMismatch { expected: 2, actual: 1 });
    }
}
