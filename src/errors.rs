// src/errors.rs

//! Crate-wide error types.
//!
//! - [`SpecError`]: a workflow spec that cannot be turned into a DAG.
//! - [`HistoryError`]: the event history breaks the backend's ordering
//!   contract (missing boundary events, dangling back-references).
//! - [`DeciderError`]: a decision round failed fatally.
//! - [`ConfigError`]: the workflows file could not be loaded.
//!
//! Domain failures (an activity failed, the execution timed out) are *not*
//! errors; they become decisions.

use thiserror::Error;

use crate::history::EventType;
use crate::types::TaskId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    #[error("duplicate task id '{0}'")]
    DuplicateTask(TaskId),

    #[error("task '{task}' has unknown dependency '{dependency}'")]
    UnknownDependency { task: TaskId, dependency: TaskId },

    #[error("task '{0}' cannot depend on itself")]
    SelfDependency(TaskId),

    #[error("cycle detected in task DAG involving task '{0}'")]
    Cycle(TaskId),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("event {event_id} not found in history")]
    MissingEvent { event_id: u64 },

    #[error(
        "decision round ending at event {started_event_id} is not bounded by \
         DecisionTaskScheduled/DecisionTaskStarted (found {found})"
    )]
    MissingBoundary { started_event_id: u64, found: String },

    #[error("event {event_id} ({event_type:?}) has no attributes")]
    MissingAttributes { event_id: u64, event_type: EventType },

    #[error("event {event_id} references event {reference}, which is not a matching event")]
    UnresolvedReference { event_id: u64, reference: u64 },

    #[error("event {event_id} refers to activity '{activity_id}', which is not in the workflow")]
    UnknownActivity { event_id: u64, activity_id: String },

    #[error("history does not start with a WorkflowExecutionStarted event")]
    MissingStartEvent,

    #[error(
        "task '{task}' scheduled again at event {event_id} after completing at event \
         {completed_event_id}"
    )]
    RescheduledAfterCompletion {
        task: TaskId,
        event_id: u64,
        completed_event_id: u64,
    },
}

#[derive(Error, Debug)]
pub enum DeciderError {
    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(
        "decision rejected at event {event_id} was made by this decider ('{identity}'); \
         round started at event {started_event_id}"
    )]
    RejectedOwnDecision {
        event_id: u64,
        identity: String,
        started_event_id: u64,
    },

    #[error("decision rejected at event {event_id} with unrecognised cause '{cause}'")]
    UnrecognisedRejectionCause { event_id: u64, cause: String },

    #[error("task '{task}' is ready but was already scheduled (last event {event_id})")]
    AlreadyScheduled { task: TaskId, event_id: u64 },

    #[error("event {event_id} carries an invalid JSON payload")]
    InvalidPayload {
        event_id: u64,
        #[source]
        source: serde_json::Error,
    },

    #[error("no workflow configured for '{name}' (version {version})")]
    UnknownWorkflow { name: String, version: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Invalid(String),

    #[error("workflow '{workflow}' is invalid: {source}")]
    Spec {
        workflow: String,
        #[source]
        source: SpecError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DeciderError>;
