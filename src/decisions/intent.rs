// src/decisions/intent.rs

//! Decision intents: what a round wants the backend to do, before rendering.

use serde_json::{Map, Value};

use crate::config::model::TaskSpec;
use crate::types::{ActivityType, TaskId};

/// Schedule one activity for a DAG task.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleActivity {
    pub activity_id: TaskId,
    pub activity_type: ActivityType,
    /// Per-task entry of the execution input, if any.
    pub input: Option<Value>,
    pub heartbeat_timeout: Option<u64>,
    pub start_to_close_timeout: Option<u64>,
    pub task_list: Option<String>,
    pub priority: Option<i32>,
}

impl ScheduleActivity {
    /// Copy scheduling attributes from a task spec. Optional attributes stay
    /// `None` unless the spec sets them.
    pub fn from_task_spec(spec: &TaskSpec, input: Option<Value>) -> Self {
        Self {
            activity_id: spec.id.clone(),
            activity_type: spec.activity_type.clone(),
            input,
            heartbeat_timeout: spec.heartbeat,
            start_to_close_timeout: spec.timeout,
            task_list: spec.task_list.clone(),
            priority: spec.priority,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DecisionIntent {
    ScheduleActivity(ScheduleActivity),
    RequestCancelActivity {
        activity_id: TaskId,
    },
    /// Complete the execution with the aggregated task results, keyed by task
    /// id. `None` when no task produced a result.
    CompleteExecution {
        result: Option<Map<String, Value>>,
    },
    FailExecution {
        reason: Option<String>,
        details: Option<String>,
    },
    CancelExecution {
        details: Option<String>,
    },
}

impl DecisionIntent {
    /// Whether this intent closes the execution.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DecisionIntent::CompleteExecution { .. }
                | DecisionIntent::FailExecution { .. }
                | DecisionIntent::CancelExecution { .. }
        )
    }
}
