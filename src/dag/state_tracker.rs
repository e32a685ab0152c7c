// src/dag/state_tracker.rs

//! Per-task outcome sequences, rebuilt from the full history every round.

use std::collections::HashMap;

use tracing::trace;

use crate::dag::DagGraph;
use crate::errors::HistoryError;
use crate::history::{EventIndex, EventType, HistoryEvent, linked_scheduled_event};
use crate::types::TaskId;

/// Derived state of one task in the current execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Never scheduled.
    Untouched,
    /// Scheduled or started, no outcome yet.
    InFlight,
    Completed,
    /// Failed, timed-out or canceled.
    Unsuccessful,
}

/// Ordered outcome events per DAG task, for the task's most recent attempt.
#[derive(Debug)]
pub struct TaskStateTracker<'h> {
    outcomes: HashMap<TaskId, Vec<&'h HistoryEvent>>,
}

impl<'h> TaskStateTracker<'h> {
    /// Empty sequences for every task in the graph.
    pub fn new(graph: &DagGraph) -> Self {
        let outcomes = graph.tasks().map(|t| (t.to_string(), Vec::new())).collect();
        Self { outcomes }
    }

    /// Populate a tracker from the entire history.
    ///
    /// `links` maps each activity event to its scheduling event (see
    /// [`crate::history::link_outcomes`]).
    pub fn from_history(
        graph: &DagGraph,
        index: &EventIndex<'h>,
        links: &HashMap<u64, u64>,
    ) -> Result<Self, HistoryError> {
        let mut tracker = Self::new(graph);

        for event in index.events() {
            if !event.event_type.is_activity_outcome() {
                continue;
            }
            let scheduled_event_id = linked_scheduled_event(links, event)?;
            let scheduled = index.require(scheduled_event_id)?;
            let activity_id = &scheduled.activity_scheduled()?.activity_id;

            if !tracker.outcomes.contains_key(activity_id) {
                return Err(HistoryError::UnknownActivity {
                    event_id: event.event_id,
                    activity_id: activity_id.clone(),
                });
            }
            tracker.record(activity_id, event)?;
        }

        Ok(tracker)
    }

    /// Append an outcome event to a task's sequence.
    ///
    /// A scheduling event opens a new attempt and discards the previous
    /// attempt's events. A completed task must never be scheduled again.
    /// Unknown task ids are ignored.
    pub fn record(&mut self, task: &str, event: &'h HistoryEvent) -> Result<(), HistoryError> {
        let Some(events) = self.outcomes.get_mut(task) else {
            return Ok(());
        };

        if event.event_type == EventType::ActivityTaskScheduled {
            if let Some(completed) = events
                .last()
                .filter(|e| e.event_type == EventType::ActivityTaskCompleted)
            {
                return Err(HistoryError::RescheduledAfterCompletion {
                    task: task.to_string(),
                    event_id: event.event_id,
                    completed_event_id: completed.event_id,
                });
            }
            events.clear();
        }
        trace!(task, event_id = event.event_id, event_type = ?event.event_type, "recorded outcome");
        events.push(event);
        Ok(())
    }

    /// The outcome sequence of a task's most recent attempt.
    pub fn events_of(&self, task: &str) -> &[&'h HistoryEvent] {
        self.outcomes.get(task).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn last_outcome(&self, task: &str) -> Option<&'h HistoryEvent> {
        self.events_of(task).last().copied()
    }

    /// Whether the task's last outcome is `ActivityTaskCompleted`.
    pub fn is_complete(&self, task: &str) -> bool {
        self.last_outcome(task)
            .is_some_and(|e| e.event_type == EventType::ActivityTaskCompleted)
    }

    pub fn state_of(&self, task: &str) -> TaskState {
        match self.last_outcome(task).map(|e| e.event_type) {
            None => TaskState::Untouched,
            Some(EventType::ActivityTaskScheduled | EventType::ActivityTaskStarted) => {
                TaskState::InFlight
            }
            Some(EventType::ActivityTaskCompleted) => TaskState::Completed,
            Some(_) => TaskState::Unsuccessful,
        }
    }

    /// Whether every task in the graph has completed.
    ///
    /// Vacuously true for an empty graph.
    pub fn all_complete(&self, graph: &DagGraph) -> bool {
        graph.tasks().all(|t| self.is_complete(t))
    }

    /// Whether every dependency of `task` has completed.
    pub fn dependencies_satisfied(&self, graph: &DagGraph, task: &str) -> bool {
        graph
            .dependencies_of(task)
            .iter()
            .all(|dep| self.is_complete(dep))
    }
}
