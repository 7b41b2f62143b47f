//! # Schema Registry
//!
//! Maps type names to constructor functions and resolves schema documents
//! (JSON or YAML) into [`Schema`] trees.
//!
//! ## Document shape
//!
//! ```yaml
//! type: dict
//! required: true          # optional, defaults to true
//! fields:
//!   name: { type: string, min_length: 1 }
//!   age:  { type: integer, min: 0, required: false }
//!   tags: { type: list, item: string }
//!   pos:  { type: tuple, items: [integer, integer] }
//! ```
//!
//! A bare type name (`string`) is shorthand for `{ type: string }`. `type`
//! and `required` are read by the registry; every other key is handed to
//! the constructor, which rejects keys it does not know.
//!
//! Lookup is typed: an unregistered name is a [`SchemaError::UnknownSchemaType`],
//! never a fallback.

use std::collections::BTreeMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::SchemaError;
use crate::node::{Kind, NodeSpec, Schema};
use crate::scalar::{IntegerRules, StringRules};

/// Constructor arguments: the document object minus `type` and `required`.
pub type Arguments = Map<String, Value>;

/// Builds a node configuration from arguments. Composite constructors use
/// the registry to resolve their child documents.
pub type Constructor = fn(&Registry, &Arguments) -> Result<NodeSpec, SchemaError>;

/// Name → constructor table.
#[derive(Clone)]
pub struct Registry {
    constructors: BTreeMap<String, Constructor>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("names", &self.names())
            .finish()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::standard()
    }
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }

    /// A registry with one constructor per built-in [`Kind`].
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for kind in Kind::ALL {
            let ctor: Constructor = match kind {
                Kind::String => string_spec,
                Kind::Integer => integer_spec,
                Kind::Boolean => boolean_spec,
                Kind::Tuple => tuple_spec,
                Kind::List => list_spec,
                Kind::Dict => dict_spec,
            };
            registry.constructors.insert(kind.as_str().to_string(), ctor);
        }
        registry
    }

    /// Add a constructor under `name`.
    ///
    /// # Errors
    ///
    /// `SchemaError::DuplicateSchemaType` if the name is taken.
    pub fn register(&mut self, name: impl Into<String>, ctor: Constructor) -> Result<(), SchemaError> {
        let name = name.into();
        if self.constructors.contains_key(&name) {
            return Err(SchemaError::DuplicateSchemaType(name));
        }
        tracing::debug!(name = %name, "registered schema type");
        self.constructors.insert(name, ctor);
        Ok(())
    }

    /// Returns true if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }

    /// Build a schema by type name.
    ///
    /// # Errors
    ///
    /// `SchemaError::UnknownSchemaType` for unregistered names, or whatever
    /// the constructor rejects.
    pub fn create(&self, name: &str, required: bool, args: &Arguments) -> Result<Schema, SchemaError> {
        let ctor = self
            .constructors
            .get(name)
            .ok_or_else(|| SchemaError::UnknownSchemaType(name.to_string()))?;
        Ok(Schema::new(ctor(self, args)?, required))
    }

    /// Resolve a schema document.
    pub fn load(&self, document: &Value) -> Result<Schema, SchemaError> {
        match document {
            Value::String(name) => self.create(name, true, &Arguments::new()),
            Value::Object(object) => {
                let mut args = object.clone();
                let name = match args.remove("type") {
                    Some(Value::String(name)) => name,
                    Some(other) => {
                        return Err(SchemaError::InvalidDocument(format!(
                            "'type' must be a string, got {other}"
                        )))
                    }
                    None => {
                        return Err(SchemaError::MissingConfiguration {
                            kind: "schema".to_string(),
                            field: "type",
                        })
                    }
                };
                let required = match args.remove("required") {
                    None => true,
                    Some(Value::Bool(b)) => b,
                    Some(other) => {
                        return Err(SchemaError::InvalidArguments {
                            kind: name,
                            reason: format!("'required' must be a boolean, got {other}"),
                        })
                    }
                };
                self.create(&name, required, &args)
            }
            other => Err(SchemaError::InvalidDocument(format!(
                "expected a type name or an object, got {other}"
            ))),
        }
    }

    /// Read and resolve a schema document from a `.json`, `.yaml` or `.yml` file.
    pub fn load_file(&self, path: &Path) -> Result<Schema, SchemaError> {
        let document = formtree_core::load_document(path)?;
        self.load(&document)
    }
}

fn parse_args<T: DeserializeOwned>(kind: &str, args: &Arguments) -> Result<T, SchemaError> {
    serde_json::from_value(Value::Object(args.clone())).map_err(|e| SchemaError::InvalidArguments {
        kind: kind.to_string(),
        reason: e.to_string(),
    })
}

fn require<'a>(kind: Kind, args: &'a Arguments, field: &'static str) -> Result<&'a Value, SchemaError> {
    args.get(field).ok_or_else(|| SchemaError::MissingConfiguration {
        kind: kind.as_str().to_string(),
        field,
    })
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct StringArgs {
    min_length: Option<usize>,
    max_length: Option<usize>,
    pattern: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct IntegerArgs {
    min: Option<i64>,
    max: Option<i64>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct NoArgs {}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TupleArgs {
    items: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ListArgs {
    item: Value,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DictArgs {
    fields: Map<String, Value>,
}

fn string_spec(_: &Registry, args: &Arguments) -> Result<NodeSpec, SchemaError> {
    let a: StringArgs = parse_args("string", args)?;
    let rules = StringRules::new(a.min_length, a.max_length, a.pattern.as_deref())?;
    Ok(NodeSpec::String(rules))
}

fn integer_spec(_: &Registry, args: &Arguments) -> Result<NodeSpec, SchemaError> {
    let a: IntegerArgs = parse_args("integer", args)?;
    Ok(NodeSpec::Integer(IntegerRules::new(a.min, a.max)?))
}

fn boolean_spec(_: &Registry, args: &Arguments) -> Result<NodeSpec, SchemaError> {
    let NoArgs {} = parse_args("boolean", args)?;
    Ok(NodeSpec::Boolean)
}

fn tuple_spec(registry: &Registry, args: &Arguments) -> Result<NodeSpec, SchemaError> {
    require(Kind::Tuple, args, "items")?;
    let a: TupleArgs = parse_args("tuple", args)?;
    let items = a
        .items
        .iter()
        .map(|doc| registry.load(doc))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(NodeSpec::Tuple(items))
}

fn list_spec(registry: &Registry, args: &Arguments) -> Result<NodeSpec, SchemaError> {
    require(Kind::List, args, "item")?;
    let a: ListArgs = parse_args("list", args)?;
    Ok(NodeSpec::List(registry.load(&a.item)?))
}

fn dict_spec(registry: &Registry, args: &Arguments) -> Result<NodeSpec, SchemaError> {
    require(Kind::Dict, args, "fields")?;
    let a: DictArgs = parse_args("dict", args)?;
    let fields = a
        .fields
        .iter()
        .map(|(name, doc)| Ok((name.clone(), registry.load(doc)?)))
        .collect::<Result<BTreeMap<_, _>, SchemaError>>()?;
    Ok(NodeSpec::Dict(fields))
}
