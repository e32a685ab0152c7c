// src/engine/mod.rs

//! Decision-building engine for DAG workflows.
//!
//! One decision round is a pure function of the workflow's DAG, the full
//! event history and the round cursors:
//! - [`core`] drives the round: builds the replay index and task tracker,
//!   extracts the window and picks the readiness or the error path.
//! - [`event_handlers`] advance readiness from execution-started and
//!   activity-completed events, schedule the ready frontier and detect
//!   completion.
//! - [`error_path`] triages error-class events into a single fail or cancel
//!   decision, including decision-rejection recovery.

use std::fmt;

pub mod core;
pub mod error_path;
pub mod event_handlers;

pub use self::core::{DagDecisionBuilder, RoundContext, RoundOutcome};

/// Options that alter how a DAG workflow resolves its rounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineOptions {
    /// On a cancellation request, cancel in-flight activities before
    /// cancelling the execution.
    pub cancel_in_flight_activities: bool,
}

/// How a decision round resolved. Derived per round, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundResolution {
    /// New activities were scheduled.
    Scheduling,
    /// Every task completed; the execution is being completed.
    Completing,
    /// Error events were summarised into a fail decision.
    Failing,
    /// A cancellation request is being honoured.
    Cancelling,
    /// Error events were present but all of them were absorbed; a later
    /// round re-derives the outcome.
    Deferred,
    /// Nothing to do this round.
    Idle,
}

impl fmt::Display for RoundResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RoundResolution::Scheduling => "scheduling",
            RoundResolution::Completing => "completing",
            RoundResolution::Failing => "failing",
            RoundResolution::Cancelling => "cancelling",
            RoundResolution::Deferred => "deferred",
            RoundResolution::Idle => "idle",
        };
        f.write_str(s)
    }
}
