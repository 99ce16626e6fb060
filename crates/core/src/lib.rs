//! asl-core: Amazon States Language definition compiler.
//!
//! Compiles a nested configuration document (JSON or TOML) describing a
//! state machine into canonical ASL JSON plus a content identifier.
//!
//! # Pipeline
//!
//! 1. [`pass1_schema`] checks field kinds against the registry and fills
//!    defaults, producing a [`FieldMap`] tree.
//! 2. [`pass2_states`] reads each block into a typed [`StateNode`].
//! 3. [`pass3_assemble`] gathers states into name-keyed collections and
//!    enforces name uniqueness and the Parallel depth ceiling.
//! 4. [`pass4_serialize`] renders the canonical document.
//!
//! [`compile()`] runs all four passes.

/// `Version` emitted when the configuration does not set one.
pub const ASL_VERSION: &str = "1.0";
/// Deepest collection level (root is 0) that may still contain Parallel
/// states.
pub const MAX_PARALLEL_DEPTH: usize = 5;

pub mod ast;
pub mod compile;
pub mod error;
pub mod field;
pub mod identity;
pub mod pass1_schema;
pub mod pass2_states;
pub mod pass3_assemble;
pub mod pass4_serialize;
pub mod path;
pub mod source;

// ── Convenience re-exports: key types ────────────────────────────────

pub use ast::{Branch, StateMachineDefinition, StateNode, StateType};
pub use compile::CompiledDefinition;
pub use error::{CompileError, ErrorKind, Frame};
pub use field::{FieldMap, FieldValue};
pub use path::{normalize_path, PathExpr};
pub use source::{DocumentFormat, FileSystemProvider, InMemoryProvider, SourceProvider};

// ── Convenience re-exports: pipeline entry points ────────────────────

pub use compile::{compile, compile_fields, compile_path, compile_str, compile_with_provider};
pub use identity::definition_id;
pub use pass1_schema::check_definition;
pub use pass3_assemble::{assemble_definition, assemble_states};
pub use pass4_serialize::{render, serialize};
