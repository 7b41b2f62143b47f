//! # Field Paths
//!
//! Addresses a node inside a nested value by positional and named segments.
//! The same path identifies a value in the data tree, its error in the
//! error tree, and its flat key on the wire.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::delimiter::Delimiter;

/// One step into a composite value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Segment {
    /// Position inside a tuple or list.
    Index(usize),
    /// Field name inside a dict.
    Name(String),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Index(i) => write!(f, "{i}"),
            Segment::Name(n) => f.write_str(n),
        }
    }
}

/// Path from the root of a value to one of its nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(Vec<Segment>);

impl FieldPath {
    /// The empty path, addressing the root.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Returns true if this path addresses the root.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The segments of the path, root first.
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if this path has no segments.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a segment in place.
    pub fn push(&mut self, segment: Segment) {
        self.0.push(segment);
    }

    /// Remove the last segment in place.
    pub fn pop(&mut self) -> Option<Segment> {
        self.0.pop()
    }

    /// A new path one segment deeper.
    pub fn child(&self, segment: Segment) -> Self {
        let mut next = self.clone();
        next.push(segment);
        next
    }

    /// Render as the flat key the addressed leaf uses.
    pub fn to_flat_key(&self, delimiter: &Delimiter) -> String {
        self.0
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(delimiter.as_str())
    }
}

impl From<Vec<Segment>> for FieldPath {
    fn from(segments: Vec<Segment>) -> Self {
        Self(segments)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(root)");
        }
        for segment in &self.0 {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}
