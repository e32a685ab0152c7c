#![allow(dead_code)]

use std::collections::HashMap;

use dagdecider::config::model::{DagSpec, TaskSpec, WorkflowSpec};
use dagdecider::history::{
    ActivityTaskOutcomeAttributes, ActivityTaskScheduledAttributes, ActivityTimeoutType,
    DecisionRejectedAttributes, DecisionTask, DecisionTaskCompletedAttributes,
    DecisionTaskStartedAttributes, EventType, HistoryEvent, WorkflowExecutionStartedAttributes,
};
use dagdecider::types::{ActivityType, WorkflowType};
use dagdecider::workflow::{DagWorkflow, Decider, build_workflow};
use serde_json::Value;

/// Builder for an execution history, assigning event ids in order.
///
/// Activity events refer back to the most recent scheduling event of the
/// same activity id; decision rejections refer to the most recent
/// `DecisionTaskCompleted`.
#[derive(Debug, Clone)]
pub struct HistoryBuilder {
    workflow_type: WorkflowType,
    events: Vec<HistoryEvent>,
    scheduled: HashMap<String, u64>,
    started: HashMap<String, u64>,
    decision_scheduled: Option<u64>,
    decision_started: Option<u64>,
    previous_decision_started: Option<u64>,
    decision_completed: Option<u64>,
}

impl HistoryBuilder {
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            workflow_type: WorkflowType::new(name, version),
            events: Vec::new(),
            scheduled: HashMap::new(),
            started: HashMap::new(),
            decision_scheduled: None,
            decision_started: None,
            previous_decision_started: None,
            decision_completed: None,
        }
    }

    fn next_id(&self) -> u64 {
        self.events.len() as u64 + 1
    }

    fn push(&mut self, event: HistoryEvent) -> u64 {
        let id = event.event_id;
        self.events.push(event);
        id
    }

    /// `WorkflowExecutionStarted`, with `input` serialized to a JSON string.
    pub fn workflow_started(mut self, input: Option<Value>) -> Self {
        let mut event = HistoryEvent::new(self.next_id(), EventType::WorkflowExecutionStarted);
        event.workflow_execution_started_event_attributes =
            Some(WorkflowExecutionStartedAttributes {
                input: input.map(|v| v.to_string()),
                workflow_type: Some(self.workflow_type.clone()),
                task_list: None,
            });
        self.push(event);
        self
    }

    /// `DecisionTaskScheduled` then `DecisionTaskStarted` for `identity`,
    /// opening a new decision round.
    pub fn decision_round(mut self, identity: &str) -> Self {
        let scheduled = self.push(HistoryEvent::new(
            self.next_id(),
            EventType::DecisionTaskScheduled,
        ));

        let mut started = HistoryEvent::new(self.next_id(), EventType::DecisionTaskStarted);
        started.decision_task_started_event_attributes = Some(DecisionTaskStartedAttributes {
            scheduled_event_id: scheduled,
            identity: Some(identity.to_string()),
        });
        let started = self.push(started);

        self.decision_scheduled = Some(scheduled);
        self.previous_decision_started = self.decision_started.replace(started);
        self
    }

    /// `DecisionTaskCompleted` for the current round.
    pub fn decision_completed(mut self) -> Self {
        let mut event = HistoryEvent::new(self.next_id(), EventType::DecisionTaskCompleted);
        event.decision_task_completed_event_attributes = Some(DecisionTaskCompletedAttributes {
            scheduled_event_id: self.decision_scheduled.unwrap_or_default(),
            started_event_id: self.decision_started.unwrap_or_default(),
            execution_context: None,
        });
        self.decision_completed = Some(self.push(event));
        self
    }

    pub fn activity_scheduled(mut self, activity_id: &str) -> Self {
        let mut event = HistoryEvent::new(self.next_id(), EventType::ActivityTaskScheduled);
        event.activity_task_scheduled_event_attributes = Some(ActivityTaskScheduledAttributes {
            activity_id: activity_id.to_string(),
            activity_type: ActivityType::new(activity_id, "1"),
            input: None,
            decision_task_completed_event_id: self.decision_completed.unwrap_or_default(),
        });
        let id = self.push(event);
        self.scheduled.insert(activity_id.to_string(), id);
        self.started.remove(activity_id);
        self
    }

    pub fn activity_started(mut self, activity_id: &str) -> Self {
        let id = self.push_outcome(EventType::ActivityTaskStarted, activity_id, |_| {});
        self.started.insert(activity_id.to_string(), id);
        self
    }

    /// `ActivityTaskCompleted`, with `result` serialized to a JSON string.
    pub fn activity_completed(mut self, activity_id: &str, result: Option<Value>) -> Self {
        self.push_outcome(EventType::ActivityTaskCompleted, activity_id, |attrs| {
            attrs.result = result.map(|v| v.to_string());
        });
        self
    }

    pub fn activity_failed(mut self, activity_id: &str, reason: &str) -> Self {
        self.push_outcome(EventType::ActivityTaskFailed, activity_id, |attrs| {
            attrs.reason = Some(reason.to_string());
        });
        self
    }

    pub fn activity_timed_out(mut self, activity_id: &str, timeout: ActivityTimeoutType) -> Self {
        self.push_outcome(EventType::ActivityTaskTimedOut, activity_id, |attrs| {
            attrs.timeout_type = Some(timeout);
        });
        self
    }

    pub fn activity_canceled(mut self, activity_id: &str) -> Self {
        self.push_outcome(EventType::ActivityTaskCanceled, activity_id, |_| {});
        self
    }

    /// A rejection of `event_type` with `cause`, referring to the most recent
    /// `DecisionTaskCompleted`.
    pub fn decision_rejected(mut self, event_type: EventType, cause: &str) -> Self {
        let completed = self
            .decision_completed
            .expect("decision_rejected needs a prior decision_completed");
        let mut event = HistoryEvent::new(self.next_id(), event_type);
        let slot = event
            .decision_rejected_slot()
            .expect("event type is not a decision rejection");
        *slot = Some(DecisionRejectedAttributes {
            cause: cause.to_string(),
            decision_task_completed_event_id: completed,
        });
        self.push(event);
        self
    }

    pub fn cancel_requested(self) -> Self {
        self.event(EventType::WorkflowExecutionCancelRequested)
    }

    /// An attribute-less event of any type.
    pub fn event(mut self, event_type: EventType) -> Self {
        let event = HistoryEvent::new(self.next_id(), event_type);
        self.push(event);
        self
    }

    fn push_outcome(
        &mut self,
        event_type: EventType,
        activity_id: &str,
        fill: impl FnOnce(&mut ActivityTaskOutcomeAttributes),
    ) -> u64 {
        let scheduled_event_id = *self
            .scheduled
            .get(activity_id)
            .unwrap_or_else(|| panic!("activity '{activity_id}' was never scheduled"));

        let mut attrs = ActivityTaskOutcomeAttributes {
            scheduled_event_id,
            started_event_id: self.started.get(activity_id).copied(),
            ..Default::default()
        };
        fill(&mut attrs);

        let mut event = HistoryEvent::new(self.next_id(), event_type);
        if let Some(slot) = event.activity_outcome_slot() {
            *slot = Some(attrs);
        }
        self.push(event)
    }

    pub fn last_event_id(&self) -> u64 {
        self.events.last().map(|e| e.event_id).unwrap_or_default()
    }

    /// The event ids of the current and previous `DecisionTaskStarted`.
    pub fn cursors(&self) -> (Option<u64>, Option<u64>) {
        (self.decision_started, self.previous_decision_started)
    }

    pub fn events(&self) -> &[HistoryEvent] {
        &self.events
    }

    /// Decision task for the current round, cursors taken from the last two
    /// `decision_round` calls.
    pub fn task(&self) -> DecisionTask {
        self.task_with_previous(self.previous_decision_started)
    }

    /// Decision task for the current round with an explicit previous cursor.
    pub fn task_with_previous(&self, previous_started_event_id: Option<u64>) -> DecisionTask {
        DecisionTask {
            task_token: Some("token".to_string()),
            workflow_execution: None,
            workflow_type: self.workflow_type.clone(),
            events: self.events.clone(),
            started_event_id: self
                .decision_started
                .expect("task() needs a prior decision_round"),
            previous_started_event_id,
        }
    }
}

/// Builder for a DAG workflow spec.
#[derive(Debug, Clone)]
pub struct WorkflowSpecBuilder {
    spec: DagSpec,
}

impl WorkflowSpecBuilder {
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            spec: DagSpec {
                name: name.to_string(),
                version: version.to_string(),
                description: None,
                cancel_in_flight_activities: false,
                tasks: Vec::new(),
            },
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.spec.description = Some(description.to_string());
        self
    }

    pub fn cancel_in_flight_activities(mut self, enabled: bool) -> Self {
        self.spec.cancel_in_flight_activities = enabled;
        self
    }

    pub fn task(mut self, task: TaskSpec) -> Self {
        self.spec.tasks.push(task);
        self
    }

    pub fn build_dag(self) -> DagSpec {
        self.spec
    }

    pub fn build(self) -> WorkflowSpec {
        WorkflowSpec::Dag(self.spec)
    }

    pub fn build_workflow(self) -> DagWorkflow {
        DagWorkflow::new(self.spec).expect("Failed to build valid workflow from builder")
    }

    /// A decider with just this workflow registered.
    pub fn build_decider(self) -> Decider {
        let mut decider = Decider::new();
        decider.register(
            build_workflow(self.build()).expect("Failed to build valid workflow from builder"),
        );
        decider
    }
}

/// Builder for `TaskSpec`.
#[derive(Debug, Clone)]
pub struct TaskSpecBuilder {
    task: TaskSpec,
}

impl TaskSpecBuilder {
    /// A task whose activity type is named after its id, version `"1"`.
    pub fn new(id: &str) -> Self {
        Self {
            task: TaskSpec::new(id, ActivityType::new(id, "1")),
        }
    }

    pub fn activity_type(mut self, name: &str, version: &str) -> Self {
        self.task.activity_type = ActivityType::new(name, version);
        self
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.task.dependencies.push(dep.to_string());
        self
    }

    pub fn heartbeat(mut self, seconds: u64) -> Self {
        self.task.heartbeat = Some(seconds);
        self
    }

    pub fn timeout(mut self, seconds: u64) -> Self {
        self.task.timeout = Some(seconds);
        self
    }

    pub fn task_list(mut self, name: &str) -> Self {
        self.task.task_list = Some(name.to_string());
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.task.priority = Some(priority);
        self
    }

    pub fn build(self) -> TaskSpec {
        self.task
    }
}
