//! # Scalar Validators
//!
//! Leaf checks for the `string`, `integer`, and `boolean` node kinds. Each
//! takes one raw JSON value and returns either the canonical value or a
//! single [`ValidationError`]. Constraint structs are immutable once built;
//! anything that can be wrong with them (bad pattern, inverted bounds) is
//! rejected at construction.

use regex::Regex;
use serde_json::Value;

use crate::error::{Expected, SchemaError, ValidationError};

/// A compiled whole-input pattern.
///
/// The source pattern is wrapped as `\A(?:pattern)\z`, so a match always
/// spans the entire input (`ab` matches `a|ab`).
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    anchored: Regex,
}

impl Pattern {
    /// Compile `source` for full-string matching.
    pub fn new(source: &str) -> Result<Self, SchemaError> {
        let anchored = Regex::new(&format!(r"\A(?:{source})\z")).map_err(|e| {
            SchemaError::InvalidPattern {
                pattern: source.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self {
            source: source.to_string(),
            anchored,
        })
    }

    /// The pattern as configured.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns true if the whole of `input` matches.
    pub fn is_full_match(&self, input: &str) -> bool {
        self.anchored.is_match(input)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// Constraints for a `string` node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringRules {
    /// Minimum length in characters.
    pub min_length: Option<usize>,
    /// Maximum length in characters.
    pub max_length: Option<usize>,
    /// Pattern the entire string must match.
    pub pattern: Option<Pattern>,
}

impl StringRules {
    /// Build string constraints, compiling the pattern if given.
    ///
    /// # Errors
    ///
    /// `SchemaError::InvalidPattern` if the pattern does not compile,
    /// `SchemaError::InvalidBounds` if `min_length > max_length`.
    pub fn new(
        min_length: Option<usize>,
        max_length: Option<usize>,
        pattern: Option<&str>,
    ) -> Result<Self, SchemaError> {
        if let (Some(min), Some(max)) = (min_length, max_length) {
            if min > max {
                return Err(SchemaError::InvalidBounds {
                    kind: "string",
                    min: min.to_string(),
                    max: max.to_string(),
                });
            }
        }
        Ok(Self {
            min_length,
            max_length,
            pattern: pattern.map(Pattern::new).transpose()?,
        })
    }

    /// Check one raw value.
    pub fn check(&self, raw: &Value) -> Result<Value, ValidationError> {
        let Value::String(s) = raw else {
            return Err(ValidationError::TypeCoercion { expected: Expected::Text });
        };
        let len = s.chars().count();

        if let Some(min) = self.min_length {
            if len < min {
                return Err(ValidationError::too_short(min));
            }
        }
        if let Some(max) = self.max_length {
            if len > max {
                return Err(ValidationError::too_long(max));
            }
        }
        if let Some(pattern) = &self.pattern {
            if !pattern.is_full_match(s) {
                return Err(ValidationError::PatternMismatch {
                    pattern: pattern.as_str().to_string(),
                });
            }
        }

        Ok(Value::String(s.clone()))
    }
}

/// Constraints for an `integer` node. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntegerRules {
    /// Smallest accepted value.
    pub min: Option<i64>,
    /// Largest accepted value.
    pub max: Option<i64>,
}

impl IntegerRules {
    /// Build integer constraints.
    ///
    /// # Errors
    ///
    /// `SchemaError::InvalidBounds` if `min > max`.
    pub fn new(min: Option<i64>, max: Option<i64>) -> Result<Self, SchemaError> {
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                return Err(SchemaError::InvalidBounds {
                    kind: "integer",
                    min: lo.to_string(),
                    max: hi.to_string(),
                });
            }
        }
        Ok(Self { min, max })
    }

    /// Check one raw value.
    pub fn check(&self, raw: &Value) -> Result<Value, ValidationError> {
        let i = coerce_integer(raw)
            .ok_or(ValidationError::TypeCoercion { expected: Expected::Number })?;

        if let Some(min) = self.min {
            if i < min {
                return Err(ValidationError::below(min));
            }
        }
        if let Some(max) = self.max {
            if i > max {
                return Err(ValidationError::above(max));
            }
        }

        Ok(Value::from(i))
    }
}

/// Coerce a raw value to an `i64`.
///
/// Accepts integers, floats with no fractional part, decimal strings
/// (surrounding whitespace ignored, optional sign) and booleans (0/1).
pub fn coerce_integer(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64().or_else(|| {
            let f = n.as_f64()?;
            let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
            (f.is_finite() && f.fract() == 0.0 && in_range).then_some(f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Truthiness of a raw value, used by `boolean` nodes.
///
/// Null, `false`, zero, and empty strings/sequences/mappings are false;
/// everything else is true.
pub fn truthiness(raw: &Value) -> bool {
    match raw {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Returns true if `raw` counts as "no input" for an optional node:
/// null, or an empty string (an untouched form field).
pub fn is_blank(raw: &Value) -> bool {
    match raw {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
