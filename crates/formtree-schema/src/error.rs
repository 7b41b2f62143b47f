//! # Error Types
//!
//! Two families:
//!
//! - [`ValidationError`]: data-time. Raised by a node while checking one
//!   raw value, captured on that node and only ever surfaced through the
//!   instance's aggregated error iterator (or as the first failure in
//!   strict mode). The `Display` text is the human-readable message shown
//!   next to the offending field.
//! - [`SchemaError`]: configuration-time. Unknown type names, bad
//!   arguments, invalid patterns. These indicate a programming error and
//!   are returned immediately from schema construction.

use std::fmt;

use formtree_core::{DocumentError, FieldPath};
use serde::Serialize;
use thiserror::Error;

/// Which end of a range a bound constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bound {
    /// Lower bound.
    Min,
    /// Upper bound.
    Max,
}

/// Integer bound, rendered as `at least` / `at most`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RangeBound(pub Bound);

impl fmt::Display for RangeBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Bound::Min => f.write_str("at least"),
            Bound::Max => f.write_str("at most"),
        }
    }
}

/// String length bound, rendered as `longer` / `shorter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LengthBound(pub Bound);

impl fmt::Display for LengthBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Bound::Min => f.write_str("longer"),
            Bound::Max => f.write_str("shorter"),
        }
    }
}

/// The primitive a scalar node tried to coerce its input into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expected {
    /// An integer.
    Number,
    /// A string.
    Text,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Number => f.write_str("a number"),
            Expected::Text => f.write_str("a string"),
        }
    }
}

/// A data-time failure detected at one node.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A tuple or list was given something other than a sequence.
    #[error("Must be iterable")]
    NotIterable,

    /// A tuple was given a sequence of the wrong length.
    #[error("Must be iterable of length {expected}")]
    ArityMismatch {
        /// Configured arity.
        expected: usize,
        /// Length of the input sequence.
        actual: usize,
    },

    /// A scalar could not be coerced to its type.
    #[error("Must be {expected}")]
    TypeCoercion {
        /// Target primitive.
        expected: Expected,
    },

    /// An integer fell outside its configured bounds.
    #[error("Must be {bound} {limit}")]
    Range {
        /// Which bound was violated.
        bound: RangeBound,
        /// Configured limit.
        limit: i64,
    },

    /// A string was shorter or longer than allowed.
    #[error("Must be {bound} than {limit}")]
    Length {
        /// Which bound was violated.
        bound: LengthBound,
        /// Configured limit, in characters.
        limit: usize,
    },

    /// A string did not match its pattern over its whole length.
    #[error("Must match pattern {pattern}")]
    PatternMismatch {
        /// The pattern as configured (unanchored).
        pattern: String,
    },

    /// A dict was given something other than a mapping.
    #[error("Must be a mapping")]
    WrongShape,
}

impl ValidationError {
    /// Stable machine-readable category.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::NotIterable => "not_iterable",
            ValidationError::ArityMismatch { .. } => "arity_mismatch",
            ValidationError::TypeCoercion { .. } => "type_coercion",
            ValidationError::Range { .. } => "range",
            ValidationError::Length { .. } => "length",
            ValidationError::PatternMismatch { .. } => "pattern_mismatch",
            ValidationError::WrongShape => "wrong_shape",
        }
    }

    pub(crate) fn below(limit: i64) -> Self {
        ValidationError::Range { bound: RangeBound(Bound::Min), limit }
    }

    pub(crate) fn above(limit: i64) -> Self {
        ValidationError::Range { bound: RangeBound(Bound::Max), limit }
    }

    pub(crate) fn too_short(limit: usize) -> Self {
        ValidationError::Length { bound: LengthBound(Bound::Min), limit }
    }

    pub(crate) fn too_long(limit: usize) -> Self {
        ValidationError::Length { bound: LengthBound(Bound::Max), limit }
    }
}

impl Serialize for ValidationError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A validation error together with the path of the node that raised it.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{path}: {error}")]
pub struct FieldError {
    /// Path from the validated root to the failing node.
    pub path: FieldPath,
    /// What went wrong.
    pub error: ValidationError,
}

impl FieldError {
    /// Attach a path to an error.
    pub fn new(path: FieldPath, error: ValidationError) -> Self {
        Self { path, error }
    }

    /// The human-readable message.
    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

/// A configuration-time failure while building a schema.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// No constructor is registered under this type name.
    #[error("no such schema type: '{0}'")]
    UnknownSchemaType(String),

    /// A constructor is already registered under this type name.
    #[error("schema type '{0}' is already registered")]
    DuplicateSchemaType(String),

    /// A schema document omitted a mandatory field.
    #[error("{kind} schema is missing required configuration '{field}'")]
    MissingConfiguration {
        /// Type name being configured.
        kind: String,
        /// The missing field.
        field: &'static str,
    },

    /// Constructor arguments had the wrong shape or unknown keys.
    #[error("invalid arguments for {kind} schema: {reason}")]
    InvalidArguments {
        /// Type name being configured.
        kind: String,
        /// Deserialization failure.
        reason: String,
    },

    /// A string pattern failed to compile.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern as configured.
        pattern: String,
        /// Compiler message.
        reason: String,
    },

    /// A lower bound is greater than its upper bound.
    #[error("{kind} schema has min {min} greater than max {max}")]
    InvalidBounds {
        /// Type name being configured.
        kind: &'static str,
        /// Configured lower bound.
        min: String,
        /// Configured upper bound.
        max: String,
    },

    /// A dict builder received the same field name twice.
    #[error("field '{0}' declared more than once")]
    DuplicateField(String),

    /// A schema document was not an object or a type name.
    #[error("invalid schema document: {0}")]
    InvalidDocument(String),

    /// A schema document could not be loaded.
    #[error("schema document error: {0}")]
    Document(#[from] DocumentError),
}
