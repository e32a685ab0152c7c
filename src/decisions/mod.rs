// src/decisions/mod.rs

//! Decision intents and their rendering into backend decision records.
//!
//! The engine only ever builds [`DecisionIntent`]s; [`emit::render`] is the
//! single place that knows the backend's record shape.

pub mod emit;
pub mod intent;

pub use emit::{Decision, DecisionType, render};
pub use intent::{DecisionIntent, ScheduleActivity};
