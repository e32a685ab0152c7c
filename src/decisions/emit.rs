// src/decisions/emit.rs

//! Rendering of decision intents into backend decision records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::decisions::intent::{DecisionIntent, ScheduleActivity};
use crate::types::{ActivityType, TaskList};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionType {
    ScheduleActivityTask,
    RequestCancelActivityTask,
    CompleteWorkflowExecution,
    FailWorkflowExecution,
    CancelWorkflowExecution,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleActivityTaskAttributes {
    pub activity_id: String,
    pub activity_type: ActivityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heartbeat_timeout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_to_close_timeout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_list: Option<TaskList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_priority: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestCancelActivityTaskAttributes {
    pub activity_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteWorkflowExecutionAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailWorkflowExecutionAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelWorkflowExecutionAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// A backend decision record: `decisionType` plus the matching attributes
/// object. Attribute objects that would be empty are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub decision_type: DecisionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_activity_task_decision_attributes: Option<ScheduleActivityTaskAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_cancel_activity_task_decision_attributes:
        Option<RequestCancelActivityTaskAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complete_workflow_execution_decision_attributes:
        Option<CompleteWorkflowExecutionAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_workflow_execution_decision_attributes: Option<FailWorkflowExecutionAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_workflow_execution_decision_attributes: Option<CancelWorkflowExecutionAttributes>,
}

impl Decision {
    fn bare(decision_type: DecisionType) -> Self {
        Self {
            decision_type,
            schedule_activity_task_decision_attributes: None,
            request_cancel_activity_task_decision_attributes: None,
            complete_workflow_execution_decision_attributes: None,
            fail_workflow_execution_decision_attributes: None,
            cancel_workflow_execution_decision_attributes: None,
        }
    }
}

/// Render intents into decision records, preserving order.
pub fn render(intents: &[DecisionIntent]) -> Vec<Decision> {
    intents.iter().map(render_one).collect()
}

fn render_one(intent: &DecisionIntent) -> Decision {
    match intent {
        DecisionIntent::ScheduleActivity(schedule) => Decision {
            schedule_activity_task_decision_attributes: Some(render_schedule(schedule)),
            ..Decision::bare(DecisionType::ScheduleActivityTask)
        },
        DecisionIntent::RequestCancelActivity { activity_id } => Decision {
            request_cancel_activity_task_decision_attributes: Some(
                RequestCancelActivityTaskAttributes {
                    activity_id: activity_id.clone(),
                },
            ),
            ..Decision::bare(DecisionType::RequestCancelActivityTask)
        },
        DecisionIntent::CompleteExecution { result } => Decision {
            complete_workflow_execution_decision_attributes: result.as_ref().map(|map| {
                CompleteWorkflowExecutionAttributes {
                    result: Some(Value::Object(map.clone()).to_string()),
                }
            }),
            ..Decision::bare(DecisionType::CompleteWorkflowExecution)
        },
        DecisionIntent::FailExecution { reason, details } => Decision {
            fail_workflow_execution_decision_attributes: (reason.is_some() || details.is_some())
                .then(|| FailWorkflowExecutionAttributes {
                    reason: reason.clone(),
                    details: details.clone(),
                }),
            ..Decision::bare(DecisionType::FailWorkflowExecution)
        },
        DecisionIntent::CancelExecution { details } => Decision {
            cancel_workflow_execution_decision_attributes: details.as_ref().map(|d| {
                CancelWorkflowExecutionAttributes {
                    details: Some(d.clone()),
                }
            }),
            ..Decision::bare(DecisionType::CancelWorkflowExecution)
        },
    }
}

fn render_schedule(schedule: &ScheduleActivity) -> ScheduleActivityTaskAttributes {
    ScheduleActivityTaskAttributes {
        activity_id: schedule.activity_id.clone(),
        activity_type: schedule.activity_type.clone(),
        input: schedule.input.as_ref().map(Value::to_string),
        heartbeat_timeout: schedule.heartbeat_timeout.map(|s| s.to_string()),
        start_to_close_timeout: schedule.start_to_close_timeout.map(|s| s.to_string()),
        task_list: schedule
            .task_list
            .as_ref()
            .map(|name| TaskList { name: name.clone() }),
        task_priority: schedule.priority.map(|p| p.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn schedule_renders_only_defined_attributes() {
        let intent = DecisionIntent::ScheduleActivity(ScheduleActivity {
            activity_id: "A".into(),
            activity_type: ActivityType::new("a", "1"),
            input: Some(json!({"k": [1, 2]})),
            heartbeat_timeout: Some(30),
            start_to_close_timeout: None,
            task_list: Some("fast".into()),
            priority: None,
        });

        let rendered = serde_json::to_value(render(&[intent])).unwrap();
        assert_eq!(
            rendered,
            json!([{
                "decisionType": "ScheduleActivityTask",
                "scheduleActivityTaskDecisionAttributes": {
                    "activityId": "A",
                    "activityType": {"name": "a", "version": "1"},
                    "input": "{\"k\":[1,2]}",
                    "heartbeatTimeout": "30",
                    "taskList": {"name": "fast"}
                }
            }])
        );
    }

    #[test]
    fn complete_without_result_has_no_attributes() {
        let rendered =
            serde_json::to_value(render(&[DecisionIntent::CompleteExecution { result: None }]))
                .unwrap();
        assert_eq!(rendered, json!([{"decisionType": "CompleteWorkflowExecution"}]));
    }

    #[test]
    fn complete_result_is_a_json_string() {
        let mut map = serde_json::Map::new();
        map.insert("A".into(), json!({"x": 1}));
        let decisions = render(&[DecisionIntent::CompleteExecution { result: Some(map) }]);

        let attrs = decisions[0]
            .complete_workflow_execution_decision_attributes
            .as_ref()
            .unwrap();
        assert_eq!(attrs.result.as_deref(), Some(r#"{"A":{"x":1}}"#));
    }

    #[test]
    fn fail_and_cancel_shapes() {
        let decisions = render(&[
            DecisionIntent::FailExecution {
                reason: None,
                details: Some("1 activities failed".into()),
            },
            DecisionIntent::RequestCancelActivity {
                activity_id: "B".into(),
            },
            DecisionIntent::CancelExecution { details: None },
        ]);

        assert_eq!(
            serde_json::to_value(&decisions).unwrap(),
            json!([
                {
                    "decisionType": "FailWorkflowExecution",
                    "failWorkflowExecutionDecisionAttributes": {"details": "1 activities failed"}
                },
                {
                    "decisionType": "RequestCancelActivityTask",
                    "requestCancelActivityTaskDecisionAttributes": {"activityId": "B"}
                },
                {"decisionType": "CancelWorkflowExecution"}
            ])
        );
    }
}
