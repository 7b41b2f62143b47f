//! # formtree-schema: Recursive Validator Engine
//!
//! Declares schemas out of scalar nodes (`string`, `integer`, `boolean`)
//! and composite nodes (`tuple`, `list`, `dict`), validates untrusted input
//! against them, and converts between nested values and flat form mappings.
//!
//! ## Data Flow
//!
//! ```text
//! raw input ──instantiate──▶ Instance tree ──data()──▶ value tree
//!                                 │         └─errors()─▶ FieldError stream
//!                                 └─flatten()─▶ flat pairs
//! flat map ──deepen()──▶ raw input (fed to a fresh validation pass)
//! ```
//!
//! ## Key Design Principles
//!
//! 1. **Types vs. instances.** A [`Schema`] is immutable and shared; an
//!    [`Instance`] is one validation run and is discarded afterwards.
//!
//! 2. **Errors stay where they happen.** Each node keeps at most its own
//!    error. Aggregation is a read-only walk ([`Instance::errors`]), so a
//!    failing child never duplicates its message on the parent.
//!
//! 3. **Closed kinds, open names.** The six node kinds are the
//!    [`NodeSpec`] enum. The [`Registry`] maps type names to constructors,
//!    so schema documents can name custom types built from those kinds.
//!
//! 4. **Two validation modes.** [`Schema::instantiate`] never fails and
//!    records every error; [`Schema::check`] stops at the first one.
//!
//! ## Crate Policy
//!
//! - Depends only on `formtree-core` among workspace crates.
//! - No I/O except [`Registry::load_file`].
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod builder;
pub mod error;
pub mod form;
pub mod instance;
pub mod node;
pub mod registry;
pub mod scalar;
pub mod transcode;

// Re-export primary types for ergonomic imports.
pub use error::{Bound, Expected, FieldError, LengthBound, RangeBound, SchemaError, ValidationError};
pub use form::{BoundForm, FieldSlot, Form};
pub use instance::{Content, Errors, Instance, State};
pub use node::{Kind, NodeSpec, Schema};
pub use registry::{Arguments, Constructor, Registry};
pub use scalar::{IntegerRules, Pattern, StringRules};
pub use transcode::Deepened;
