// src/history/mod.rs

//! Event history replay.
//!
//! - [`event`] models the backend's history events.
//! - [`index`] builds per-round lookup tables (event id → event, activity
//!   event → scheduling event).
//! - [`window`] extracts the events that are new in the current round.

pub mod event;
pub mod index;
pub mod window;

use serde::{Deserialize, Serialize};

use crate::types::WorkflowType;

pub use event::{
    ActivityTaskOutcomeAttributes, ActivityTaskScheduledAttributes, ActivityTimeoutType,
    DecisionRejectedAttributes, DecisionTaskCompletedAttributes, DecisionTaskStartedAttributes,
    EventType, HistoryEvent, WorkflowExecutionStartedAttributes,
};
pub use index::{EventIndex, link_outcomes, linked_scheduled_event};
pub use window::{RoundWindow, window};

/// Identity of one workflow execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowExecution {
    pub workflow_id: String,
    pub run_id: String,
}

/// One leased decision round, as handed over by the polling component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionTask {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_execution: Option<WorkflowExecution>,

    pub workflow_type: WorkflowType,

    /// Full ordered history of the execution.
    pub events: Vec<HistoryEvent>,

    /// Event id of this round's `DecisionTaskStarted` event.
    pub started_event_id: u64,

    /// Event id of the previous round's `DecisionTaskStarted` event. The
    /// backend sends `0` when there was none; any id not in the history is
    /// treated the same way.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_started_event_id: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_task_parses_poll_response() {
        let json = r#"{
            "taskToken": "tok",
            "workflowExecution": {"workflowId": "wf", "runId": "run"},
            "workflowType": {"name": "ingest", "version": "1.0"},
            "startedEventId": 3,
            "previousStartedEventId": 0,
            "events": [
                {"eventId": 1, "eventType": "WorkflowExecutionStarted",
                 "workflowExecutionStartedEventAttributes": {"input": "{}"}},
                {"eventId": 2, "eventType": "DecisionTaskScheduled"},
                {"eventId": 3, "eventType": "DecisionTaskStarted",
                 "decisionTaskStartedEventAttributes": {"scheduledEventId": 2, "identity": "w1"}}
            ]
        }"#;

        let task: DecisionTask = serde_json::from_str(json).unwrap();
        assert_eq!(task.workflow_type, WorkflowType::new("ingest", "1.0"));
        assert_eq!(task.events.len(), 3);
        assert_eq!(task.previous_started_event_id, Some(0));
        assert_eq!(
            task.events[2].decision_started().unwrap().identity.as_deref(),
            Some("w1")
        );
    }
}
