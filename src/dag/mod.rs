// src/dag/mod.rs

//! DAG representation and per-task state.
//!
//! - [`graph`] holds the immutable task DAG and its dependents index.
//! - [`state_tracker`] replays activity events into per-task outcome
//!   sequences, answering "complete / in flight / untouched".

pub mod graph;
pub mod state_tracker;

pub use graph::DagGraph;
pub use state_tracker::{TaskState, TaskStateTracker};
