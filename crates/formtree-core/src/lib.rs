//! # formtree-core: Flat Representation Primitives
//!
//! This crate holds the pieces of formtree that do not know anything about
//! schemas: how a nested value is addressed, how a single-level key/value
//! mapping is split back into groups, and how the delimiter and form prefix
//! are configured. `formtree-schema` builds the validator engine on top.
//!
//! ## Key Design Principles
//!
//! 1. **`Delimiter` newtype.** A separator is validated once (non-empty) and
//!    then passed around by reference. There is no way to group a flat
//!    mapping on an empty separator.
//!
//! 2. **Sorted flat mappings.** `FlatMap` is a `BTreeMap`, so grouping and
//!    encoding always walk keys in the same order.
//!
//! 3. **Paths are data.** `FieldPath` addresses an error by index/name
//!    segments and renders either as a pointer (`/pets/0/name`) or as the
//!    flat key the same field uses on the wire (`pets__0__name`).
//!
//! ## Crate Policy
//!
//! - No dependencies on other `formtree-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod config;
pub mod delimiter;
pub mod document;
pub mod error;
pub mod flat;
pub mod path;

// Re-export primary types for ergonomic imports.
pub use config::FormConfig;
pub use delimiter::{Delimiter, DEFAULT_DELIMITER};
pub use document::{load_document, parse_document, DocumentFormat};
pub use error::{ConfigError, DocumentError};
pub use flat::{encode_query, group_by_key, join_key, parse_query, FlatMap};
pub use path::{FieldPath, Segment};
