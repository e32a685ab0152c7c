// src/engine/core.rs

//! Pure decision-round driver.
//!
//! [`DagDecisionBuilder::build`] takes one immutable decision task and
//! produces the round's decision intents. It keeps no state between rounds:
//! every round rebuilds the replay index and the per-task outcome sequences
//! from the full history, so replaying a round yields the same decisions.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::dag::{DagGraph, TaskStateTracker};
use crate::decisions::{Decision, DecisionIntent, render};
use crate::engine::{EngineOptions, RoundResolution, error_path, event_handlers};
use crate::errors::{HistoryError, Result};
use crate::history::{
    DecisionTask, EventIndex, HistoryEvent, link_outcomes, linked_scheduled_event, window,
};
use crate::types::TaskId;

/// Per-round working state, threaded through the step functions in
/// [`event_handlers`] and [`error_path`].
#[derive(Debug)]
pub struct RoundContext<'a, 'h> {
    pub graph: &'a DagGraph,
    pub index: &'a EventIndex<'h>,
    /// Activity event id → scheduling event id.
    pub links: &'a HashMap<u64, u64>,
    pub tracker: TaskStateTracker<'h>,
    /// This round's `DecisionTaskStarted` event.
    pub started_event: &'h HistoryEvent,
    /// Tasks that became ready this round.
    pub ready: HashSet<TaskId>,
    /// Error-class events in the window payload, in history order.
    pub errors: Vec<&'h HistoryEvent>,
    pub intents: Vec<DecisionIntent>,
}

impl<'a, 'h> RoundContext<'a, 'h> {
    /// Task id of an activity event, via its scheduling event.
    pub fn activity_id_of(
        &self,
        event: &HistoryEvent,
    ) -> std::result::Result<&'h str, HistoryError> {
        let scheduled_event_id = linked_scheduled_event(self.links, event)?;
        let scheduled = self.index.require(scheduled_event_id)?;
        Ok(scheduled.activity_scheduled()?.activity_id.as_str())
    }
}

/// Result of one decision round.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundOutcome {
    pub intents: Vec<DecisionIntent>,
    pub resolution: RoundResolution,
}

impl RoundOutcome {
    /// Render the intents into backend decision records.
    pub fn decisions(&self) -> Vec<Decision> {
        render(&self.intents)
    }
}

/// Builds the decisions of one round for a DAG workflow.
#[derive(Debug, Clone, Copy)]
pub struct DagDecisionBuilder<'a> {
    graph: &'a DagGraph,
    options: EngineOptions,
}

impl<'a> DagDecisionBuilder<'a> {
    pub fn new(graph: &'a DagGraph, options: EngineOptions) -> Self {
        Self { graph, options }
    }

    /// Run one decision round.
    ///
    /// Error-class events in the window take priority: when any are present
    /// the readiness path is skipped entirely and the round resolves through
    /// [`error_path::resolve`].
    pub fn build(&self, task: &DecisionTask) -> Result<RoundOutcome> {
        let index = EventIndex::new(&task.events);
        let links = link_outcomes(&index)?;
        let tracker = TaskStateTracker::from_history(self.graph, &index, &links)?;

        let window = window(&index, task.started_event_id, task.previous_started_event_id)?;
        let payload = window.payload()?;
        let started_event = window.started_event()?;

        let errors: Vec<&HistoryEvent> = payload
            .iter()
            .filter(|e| e.event_type.is_error_class())
            .collect();

        let mut ctx = RoundContext {
            graph: self.graph,
            index: &index,
            links: &links,
            tracker,
            started_event,
            ready: HashSet::new(),
            errors,
            intents: Vec::new(),
        };

        let resolution = if ctx.errors.is_empty() {
            advance(&mut ctx, payload)?
        } else {
            debug!(count = ctx.errors.len(), "error events in window");
            error_path::resolve(&mut ctx, &self.options)?
        };

        debug_assert!(
            ctx.intents
                .iter()
                .rev()
                .skip(1)
                .all(|intent| !intent.is_terminal()),
            "a terminal decision must close its batch"
        );

        info!(
            %resolution,
            decisions = ctx.intents.len(),
            started_event_id = task.started_event_id,
            previous_started_event_id = task.previous_started_event_id,
            "decision round resolved"
        );

        Ok(RoundOutcome {
            intents: ctx.intents,
            resolution,
        })
    }
}

/// Readiness path: process payload events, schedule the ready frontier, then
/// check for whole-workflow completion.
fn advance<'h>(
    ctx: &mut RoundContext<'_, 'h>,
    payload: &'h [HistoryEvent],
) -> Result<RoundResolution> {
    for event in payload {
        event_handlers::handle_event(ctx, event)?;
    }

    event_handlers::schedule_ready(ctx)?;

    if event_handlers::complete_if_done(ctx)? {
        return Ok(RoundResolution::Completing);
    }

    Ok(if ctx.intents.is_empty() {
        RoundResolution::Idle
    } else {
        RoundResolution::Scheduling
    })
}
