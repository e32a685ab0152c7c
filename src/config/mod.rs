// src/config/mod.rs

//! Workflows file loading and validation.
//!
//! Responsibilities:
//! - Define the TOML/JSON-backed data model (`model.rs`).
//! - Load a workflows file from disk (`loader.rs`).
//! - Validate file-level invariants and per-workflow DAGs (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{FileFormat, load_and_validate, load_from_path, load_from_str};
pub use model::{DagSpec, RawWorkflowsFile, TaskSpec, WorkflowSpec, WorkflowsFile};
pub use validate::validate_workflows;
