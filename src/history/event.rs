// src/history/event.rs

//! Event history model, as delivered by the orchestration backend.
//!
//! Events mirror the backend's wire shape: an `eventId`, an `eventType` tag
//! and one `<eventType>EventAttributes` object. Only the attribute objects the
//! decider reads are modelled; anything else is ignored on deserialization.

use serde::{Deserialize, Serialize};

use crate::errors::HistoryError;
use crate::types::{ActivityType, TaskList, WorkflowType};

/// Event type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EventType {
    ActivityTaskCancelRequested,
    ActivityTaskCanceled,
    ActivityTaskCompleted,
    ActivityTaskFailed,
    ActivityTaskScheduled,
    ActivityTaskStarted,
    ActivityTaskTimedOut,
    CancelTimerFailed,
    CancelWorkflowExecutionFailed,
    ChildWorkflowExecutionCanceled,
    ChildWorkflowExecutionCompleted,
    ChildWorkflowExecutionFailed,
    ChildWorkflowExecutionStarted,
    ChildWorkflowExecutionTerminated,
    ChildWorkflowExecutionTimedOut,
    CompleteWorkflowExecutionFailed,
    ContinueAsNewWorkflowExecutionFailed,
    DecisionTaskCompleted,
    DecisionTaskScheduled,
    DecisionTaskStarted,
    DecisionTaskTimedOut,
    ExternalWorkflowExecutionCancelRequested,
    ExternalWorkflowExecutionSignaled,
    FailWorkflowExecutionFailed,
    LambdaFunctionCompleted,
    LambdaFunctionFailed,
    LambdaFunctionScheduled,
    LambdaFunctionStarted,
    LambdaFunctionTimedOut,
    MarkerRecorded,
    RecordMarkerFailed,
    RequestCancelActivityTaskFailed,
    RequestCancelExternalWorkflowExecutionFailed,
    RequestCancelExternalWorkflowExecutionInitiated,
    ScheduleActivityTaskFailed,
    ScheduleLambdaFunctionFailed,
    SignalExternalWorkflowExecutionFailed,
    SignalExternalWorkflowExecutionInitiated,
    StartChildWorkflowExecutionFailed,
    StartChildWorkflowExecutionInitiated,
    StartLambdaFunctionFailed,
    StartTimerFailed,
    TimerCanceled,
    TimerFired,
    TimerStarted,
    WorkflowExecutionCancelRequested,
    WorkflowExecutionCanceled,
    WorkflowExecutionCompleted,
    WorkflowExecutionContinuedAsNew,
    WorkflowExecutionFailed,
    WorkflowExecutionSignaled,
    WorkflowExecutionStarted,
    WorkflowExecutionTerminated,
    WorkflowExecutionTimedOut,
    /// Any event type this crate does not know about.
    #[default]
    #[serde(other)]
    Unknown,
}

impl EventType {
    /// Events that belong to one attempt of an activity task and can be
    /// traced back to its `ActivityTaskScheduled` event.
    pub fn is_activity_outcome(self) -> bool {
        matches!(
            self,
            EventType::ActivityTaskScheduled
                | EventType::ActivityTaskStarted
                | EventType::ActivityTaskCompleted
                | EventType::ActivityTaskFailed
                | EventType::ActivityTaskTimedOut
                | EventType::ActivityTaskCanceled
        )
    }

    /// Backend rejections of a decision submitted in an earlier round.
    pub fn is_decision_rejection(self) -> bool {
        matches!(
            self,
            EventType::ScheduleActivityTaskFailed
                | EventType::RequestCancelActivityTaskFailed
                | EventType::StartTimerFailed
                | EventType::CancelTimerFailed
                | EventType::StartChildWorkflowExecutionFailed
                | EventType::SignalExternalWorkflowExecutionFailed
                | EventType::RequestCancelExternalWorkflowExecutionFailed
                | EventType::CancelWorkflowExecutionFailed
                | EventType::CompleteWorkflowExecutionFailed
                | EventType::ContinueAsNewWorkflowExecutionFailed
                | EventType::FailWorkflowExecutionFailed
        )
    }

    /// Events that divert a round onto the error path.
    ///
    /// A DAG workflow never starts timers or markers itself, so timer and
    /// marker events are treated as exceptional too.
    pub fn is_error_class(self) -> bool {
        self.is_decision_rejection()
            || matches!(
                self,
                EventType::ActivityTaskFailed
                    | EventType::ActivityTaskTimedOut
                    | EventType::DecisionTaskTimedOut
                    | EventType::RecordMarkerFailed
                    | EventType::TimerCanceled
                    | EventType::TimerFired
                    | EventType::WorkflowExecutionCancelRequested
                    | EventType::WorkflowExecutionFailed
                    | EventType::WorkflowExecutionTerminated
                    | EventType::WorkflowExecutionTimedOut
            )
    }
}

/// Activity timeout kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityTimeoutType {
    StartToClose,
    ScheduleToStart,
    ScheduleToClose,
    Heartbeat,
}

impl ActivityTimeoutType {
    /// Whether the timeout happened while a worker held the activity, as
    /// opposed to while it sat in the queue.
    pub fn is_attributed_to_activity(self) -> bool {
        matches!(
            self,
            ActivityTimeoutType::StartToClose | ActivityTimeoutType::Heartbeat
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowExecutionStartedAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_type: Option<WorkflowType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_list: Option<TaskList>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionTaskStartedAttributes {
    pub scheduled_event_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionTaskCompletedAttributes {
    pub scheduled_event_id: u64,
    pub started_event_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityTaskScheduledAttributes {
    pub activity_id: String,
    pub activity_type: ActivityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(default)]
    pub decision_task_completed_event_id: u64,
}

/// Attributes shared by every activity event after scheduling: a back
/// reference to the scheduling event, plus optional payloads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityTaskOutcomeAttributes {
    pub scheduled_event_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_event_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_type: Option<ActivityTimeoutType>,
}

/// Attributes of every `*Failed` decision-rejection event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRejectedAttributes {
    pub cause: String,
    pub decision_task_completed_event_id: u64,
}

/// One event of an execution's history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEvent {
    pub event_id: u64,
    pub event_type: EventType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_execution_started_event_attributes: Option<WorkflowExecutionStartedAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision_task_started_event_attributes: Option<DecisionTaskStartedAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision_task_completed_event_attributes: Option<DecisionTaskCompletedAttributes>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_task_scheduled_event_attributes: Option<ActivityTaskScheduledAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_task_started_event_attributes: Option<ActivityTaskOutcomeAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_task_completed_event_attributes: Option<ActivityTaskOutcomeAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_task_failed_event_attributes: Option<ActivityTaskOutcomeAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_task_timed_out_event_attributes: Option<ActivityTaskOutcomeAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_task_canceled_event_attributes: Option<ActivityTaskOutcomeAttributes>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_activity_task_failed_event_attributes: Option<DecisionRejectedAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_cancel_activity_task_failed_event_attributes: Option<DecisionRejectedAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_timer_failed_event_attributes: Option<DecisionRejectedAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_timer_failed_event_attributes: Option<DecisionRejectedAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_child_workflow_execution_failed_event_attributes: Option<DecisionRejectedAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal_external_workflow_execution_failed_event_attributes:
        Option<DecisionRejectedAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_cancel_external_workflow_execution_failed_event_attributes:
        Option<DecisionRejectedAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_workflow_execution_failed_event_attributes: Option<DecisionRejectedAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complete_workflow_execution_failed_event_attributes: Option<DecisionRejectedAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continue_as_new_workflow_execution_failed_event_attributes:
        Option<DecisionRejectedAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_workflow_execution_failed_event_attributes: Option<DecisionRejectedAttributes>,
}

impl HistoryEvent {
    /// A bare event with no attributes.
    pub fn new(event_id: u64, event_type: EventType) -> Self {
        Self {
            event_id,
            event_type,
            ..Self::default()
        }
    }

    fn missing_attributes(&self) -> HistoryError {
        HistoryError::MissingAttributes {
            event_id: self.event_id,
            event_type: self.event_type,
        }
    }

    /// Attributes of a `WorkflowExecutionStarted` event.
    pub fn execution_started(&self) -> Result<&WorkflowExecutionStartedAttributes, HistoryError> {
        match self.event_type {
            EventType::WorkflowExecutionStarted => Ok(self
                .workflow_execution_started_event_attributes
                .as_ref()
                .unwrap_or(&EMPTY_STARTED_ATTRIBUTES)),
            _ => Err(self.missing_attributes()),
        }
    }

    pub fn decision_started(&self) -> Result<&DecisionTaskStartedAttributes, HistoryError> {
        self.decision_task_started_event_attributes
            .as_ref()
            .filter(|_| self.event_type == EventType::DecisionTaskStarted)
            .ok_or_else(|| self.missing_attributes())
    }

    pub fn decision_completed(&self) -> Result<&DecisionTaskCompletedAttributes, HistoryError> {
        self.decision_task_completed_event_attributes
            .as_ref()
            .filter(|_| self.event_type == EventType::DecisionTaskCompleted)
            .ok_or_else(|| self.missing_attributes())
    }

    pub fn activity_scheduled(&self) -> Result<&ActivityTaskScheduledAttributes, HistoryError> {
        self.activity_task_scheduled_event_attributes
            .as_ref()
            .filter(|_| self.event_type == EventType::ActivityTaskScheduled)
            .ok_or_else(|| self.missing_attributes())
    }

    /// Attributes of a post-scheduling activity event (started, completed,
    /// failed, timed-out or canceled).
    pub fn activity_outcome(&self) -> Result<&ActivityTaskOutcomeAttributes, HistoryError> {
        let attrs = match self.event_type {
            EventType::ActivityTaskStarted => self.activity_task_started_event_attributes.as_ref(),
            EventType::ActivityTaskCompleted => {
                self.activity_task_completed_event_attributes.as_ref()
            }
            EventType::ActivityTaskFailed => self.activity_task_failed_event_attributes.as_ref(),
            EventType::ActivityTaskTimedOut => {
                self.activity_task_timed_out_event_attributes.as_ref()
            }
            EventType::ActivityTaskCanceled => {
                self.activity_task_canceled_event_attributes.as_ref()
            }
            _ => None,
        };
        attrs.ok_or_else(|| self.missing_attributes())
    }

    /// The `ActivityTaskScheduled` event this activity event belongs to.
    /// A scheduling event refers to itself.
    pub fn scheduled_event_id(&self) -> Result<u64, HistoryError> {
        if self.event_type == EventType::ActivityTaskScheduled {
            return Ok(self.event_id);
        }
        Ok(self.activity_outcome()?.scheduled_event_id)
    }

    /// Attributes of a decision-rejection event.
    pub fn decision_rejected(&self) -> Result<&DecisionRejectedAttributes, HistoryError> {
        let attrs = match self.event_type {
            EventType::ScheduleActivityTaskFailed => {
                self.schedule_activity_task_failed_event_attributes.as_ref()
            }
            EventType::RequestCancelActivityTaskFailed => {
                self.request_cancel_activity_task_failed_event_attributes.as_ref()
            }
            EventType::StartTimerFailed => self.start_timer_failed_event_attributes.as_ref(),
            EventType::CancelTimerFailed => self.cancel_timer_failed_event_attributes.as_ref(),
            EventType::StartChildWorkflowExecutionFailed => {
                self.start_child_workflow_execution_failed_event_attributes.as_ref()
            }
            EventType::SignalExternalWorkflowExecutionFailed => {
                self.signal_external_workflow_execution_failed_event_attributes.as_ref()
            }
            EventType::RequestCancelExternalWorkflowExecutionFailed => {
                self.request_cancel_external_workflow_execution_failed_event_attributes.as_ref()
            }
            EventType::CancelWorkflowExecutionFailed => {
                self.cancel_workflow_execution_failed_event_attributes.as_ref()
            }
            EventType::CompleteWorkflowExecutionFailed => {
                self.complete_workflow_execution_failed_event_attributes.as_ref()
            }
            EventType::ContinueAsNewWorkflowExecutionFailed => {
                self.continue_as_new_workflow_execution_failed_event_attributes.as_ref()
            }
            EventType::FailWorkflowExecutionFailed => {
                self.fail_workflow_execution_failed_event_attributes.as_ref()
            }
            _ => None,
        };
        attrs.ok_or_else(|| self.missing_attributes())
    }

    /// Mutable slot for the attributes of a decision-rejection event type.
    ///
    /// Returns `None` for event types that are not decision rejections.
    pub fn decision_rejected_slot(
        &mut self,
    ) -> Option<&mut Option<DecisionRejectedAttributes>> {
        let slot = match self.event_type {
            EventType::ScheduleActivityTaskFailed => {
                &mut self.schedule_activity_task_failed_event_attributes
            }
            EventType::RequestCancelActivityTaskFailed => {
                &mut self.request_cancel_activity_task_failed_event_attributes
            }
            EventType::StartTimerFailed => &mut self.start_timer_failed_event_attributes,
            EventType::CancelTimerFailed => &mut self.cancel_timer_failed_event_attributes,
            EventType::StartChildWorkflowExecutionFailed => {
                &mut self.start_child_workflow_execution_failed_event_attributes
            }
            EventType::SignalExternalWorkflowExecutionFailed => {
                &mut self.signal_external_workflow_execution_failed_event_attributes
            }
            EventType::RequestCancelExternalWorkflowExecutionFailed => {
                &mut self.request_cancel_external_workflow_execution_failed_event_attributes
            }
            EventType::CancelWorkflowExecutionFailed => {
                &mut self.cancel_workflow_execution_failed_event_attributes
            }
            EventType::CompleteWorkflowExecutionFailed => {
                &mut self.complete_workflow_execution_failed_event_attributes
            }
            EventType::ContinueAsNewWorkflowExecutionFailed => {
                &mut self.continue_as_new_workflow_execution_failed_event_attributes
            }
            EventType::FailWorkflowExecutionFailed => {
                &mut self.fail_workflow_execution_failed_event_attributes
            }
            _ => return None,
        };
        Some(slot)
    }

    /// Mutable slot for the attributes of a post-scheduling activity event.
    pub fn activity_outcome_slot(&mut self) -> Option<&mut Option<ActivityTaskOutcomeAttributes>> {
        let slot = match self.event_type {
            EventType::ActivityTaskStarted => &mut self.activity_task_started_event_attributes,
            EventType::ActivityTaskCompleted => &mut self.activity_task_completed_event_attributes,
            EventType::ActivityTaskFailed => &mut self.activity_task_failed_event_attributes,
            EventType::ActivityTaskTimedOut => &mut self.activity_task_timed_out_event_attributes,
            EventType::ActivityTaskCanceled => &mut self.activity_task_canceled_event_attributes,
            _ => return None,
        };
        Some(slot)
    }
}

static EMPTY_STARTED_ATTRIBUTES: WorkflowExecutionStartedAttributes =
    WorkflowExecutionStartedAttributes {
        input: None,
        workflow_type: None,
        task_list: None,
    };
