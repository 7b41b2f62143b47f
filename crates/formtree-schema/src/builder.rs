//! # Schema Builders
//!
//! Typed construction of [`Schema`] trees in code. Each entry point returns
//! a small builder; `optional()` flips `required` off, and `build()`
//! validates the configuration.
//!
//! ```
//! use formtree_schema::builder::{dict, integer, string};
//!
//! let person = dict()
//!     .field("name", string().min_length(1).build()?)
//!     .field("age", integer().min(0).optional().build()?)
//!     .build()?;
//! assert!(person.instantiate(serde_json::json!({"name": "Ann"})).is_valid());
//! # Ok::<(), formtree_schema::SchemaError>(())
//! ```

use std::collections::BTreeMap;

use crate::error::SchemaError;
use crate::node::{NodeSpec, Schema};
use crate::scalar::{IntegerRules, StringRules};

/// Start a `string` schema.
pub fn string() -> StringBuilder {
    StringBuilder::default()
}

/// Start an `integer` schema.
pub fn integer() -> IntegerBuilder {
    IntegerBuilder::default()
}

/// Start a `boolean` schema.
pub fn boolean() -> BooleanBuilder {
    BooleanBuilder { required: true }
}

/// Start a `tuple` schema over the given positional child types.
pub fn tuple(items: impl IntoIterator<Item = Schema>) -> TupleBuilder {
    TupleBuilder {
        items: items.into_iter().collect(),
        required: true,
    }
}

/// Start a `list` schema with the given element type.
pub fn list(item: Schema) -> ListBuilder {
    ListBuilder { item, required: true }
}

/// Start an empty `dict` schema.
pub fn dict() -> DictBuilder {
    DictBuilder {
        fields: Vec::new(),
        required: true,
    }
}

/// Builder for `string` nodes.
#[derive(Debug, Clone)]
pub struct StringBuilder {
    min_length: Option<usize>,
    max_length: Option<usize>,
    pattern: Option<String>,
    required: bool,
}

impl Default for StringBuilder {
    fn default() -> Self {
        Self {
            min_length: None,
            max_length: None,
            pattern: None,
            required: true,
        }
    }
}

impl StringBuilder {
    pub fn min_length(mut self, n: usize) -> Self {
        self.min_length = Some(n);
        self
    }

    pub fn max_length(mut self, n: usize) -> Self {
        self.max_length = Some(n);
        self
    }

    /// Pattern the entire input must match.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// # Errors
    ///
    /// Fails on an invalid pattern or `min_length > max_length`.
    pub fn build(self) -> Result<Schema, SchemaError> {
        let rules = StringRules::new(self.min_length, self.max_length, self.pattern.as_deref())?;
        Ok(Schema::new(NodeSpec::String(rules), self.required))
    }
}

/// Builder for `integer` nodes.
#[derive(Debug, Clone)]
pub struct IntegerBuilder {
    min: Option<i64>,
    max: Option<i64>,
    required: bool,
}

impl Default for IntegerBuilder {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            required: true,
        }
    }
}

impl IntegerBuilder {
    /// Inclusive lower bound.
    pub fn min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    /// Inclusive upper bound.
    pub fn max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// # Errors
    ///
    /// Fails if `min > max`.
    pub fn build(self) -> Result<Schema, SchemaError> {
        let rules = IntegerRules::new(self.min, self.max)?;
        Ok(Schema::new(NodeSpec::Integer(rules), self.required))
    }
}

/// Builder for `boolean` nodes.
#[derive(Debug, Clone)]
pub struct BooleanBuilder {
    required: bool,
}

impl BooleanBuilder {
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn build(self) -> Result<Schema, SchemaError> {
        Ok(Schema::new(NodeSpec::Boolean, self.required))
    }
}

/// Builder for `tuple` nodes.
#[derive(Debug, Clone)]
pub struct TupleBuilder {
    items: Vec<Schema>,
    required: bool,
}

impl TupleBuilder {
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn build(self) -> Result<Schema, SchemaError> {
        Ok(Schema::new(NodeSpec::Tuple(self.items), self.required))
    }
}

/// Builder for `list` nodes.
#[derive(Debug, Clone)]
pub struct ListBuilder {
    item: Schema,
    required: bool,
}

impl ListBuilder {
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn build(self) -> Result<Schema, SchemaError> {
        Ok(Schema::new(NodeSpec::List(self.item), self.required))
    }
}

/// Declarative builder for `dict` nodes: ordered `(name, type)` pairs.
///
/// Declaration order does not matter for the result; fields are stored
/// name-ordered. A repeated name fails at `build()`.
#[derive(Debug, Clone)]
pub struct DictBuilder {
    fields: Vec<(String, Schema)>,
    required: bool,
}

impl DictBuilder {
    /// Declare a field.
    pub fn field(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.fields.push((name.into(), schema));
        self
    }

    /// Declare several fields at once.
    pub fn fields<N: Into<String>>(mut self, fields: impl IntoIterator<Item = (N, Schema)>) -> Self {
        self.fields
            .extend(fields.into_iter().map(|(name, schema)| (name.into(), schema)));
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// # Errors
    ///
    /// `SchemaError::DuplicateField` if a name was declared twice.
    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut fields = BTreeMap::new();
        for (name, schema) in self.fields {
            if fields.contains_key(&name) {
                return Err(SchemaError::DuplicateField(name));
            }
            fields.insert(name, schema);
        }
        Ok(Schema::new(NodeSpec::Dict(fields), self.required))
    }
}
