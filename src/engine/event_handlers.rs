// src/engine/event_handlers.rs

//! Readiness-path step functions.

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::decisions::{DecisionIntent, ScheduleActivity};
use crate::engine::RoundContext;
use crate::errors::{DeciderError, HistoryError, Result};
use crate::history::{EventIndex, EventType, HistoryEvent};

/// Advance readiness from one payload event.
///
/// Only the execution-started and activity-completed events move readiness;
/// everything else in a clean window is bookkeeping the tracker has already
/// seen.
pub fn handle_event<'h>(
    ctx: &mut RoundContext<'_, 'h>,
    event: &'h HistoryEvent,
) -> Result<()> {
    match event.event_type {
        EventType::WorkflowExecutionStarted => {
            handle_execution_started(ctx, event);
            Ok(())
        }
        EventType::ActivityTaskCompleted => handle_activity_completed(ctx, event),
        other => {
            trace!(
                event_id = event.event_id,
                event_type = ?other,
                "event does not affect readiness"
            );
            Ok(())
        }
    }
}

/// Every root task becomes ready.
pub fn handle_execution_started(ctx: &mut RoundContext<'_, '_>, event: &HistoryEvent) {
    let roots = ctx.graph.dependents_of(None);
    debug!(event_id = event.event_id, roots = roots.len(), "execution started");
    ctx.ready.extend(roots.iter().cloned());
}

/// Each dependent of the completed task becomes ready once all of its own
/// dependencies have completed.
pub fn handle_activity_completed(
    ctx: &mut RoundContext<'_, '_>,
    event: &HistoryEvent,
) -> Result<()> {
    let task = ctx.activity_id_of(event)?;
    let graph = ctx.graph;

    for dependent in graph.dependents_of(Some(task)) {
        if ctx.tracker.dependencies_satisfied(graph, dependent) {
            debug!(task, dependent = %dependent, "dependent ready");
            ctx.ready.insert(dependent.clone());
        } else {
            trace!(task, dependent = %dependent, "dependent still waiting");
        }
    }

    Ok(())
}

/// Emit one schedule intent per ready task, in spec order.
///
/// A ready task must not have been scheduled before; finding an outcome
/// sequence for it means the history and the DAG disagree.
pub fn schedule_ready(ctx: &mut RoundContext<'_, '_>) -> Result<()> {
    if ctx.ready.is_empty() {
        return Ok(());
    }

    let inputs = execution_inputs(ctx.index)?;
    let graph = ctx.graph;
    let ready = &ctx.ready;

    for spec in graph.task_specs().filter(|s| ready.contains(&s.id)) {
        if let Some(last) = ctx.tracker.last_outcome(&spec.id) {
            return Err(DeciderError::AlreadyScheduled {
                task: spec.id.clone(),
                event_id: last.event_id,
            });
        }

        let input = inputs.as_ref().and_then(|m| m.get(&spec.id)).cloned();
        debug!(task = %spec.id, has_input = input.is_some(), "scheduling activity");
        ctx.intents
            .push(DecisionIntent::ScheduleActivity(ScheduleActivity::from_task_spec(
                spec, input,
            )));
    }

    Ok(())
}

/// If every task has completed, replace the round's intents with a single
/// complete decision. Returns whether it did.
pub fn complete_if_done(ctx: &mut RoundContext<'_, '_>) -> Result<bool> {
    if !ctx.tracker.all_complete(ctx.graph) {
        return Ok(false);
    }

    let result = aggregate_results(ctx)?;
    debug!(
        results = result.as_ref().map_or(0, Map::len),
        "all tasks complete"
    );
    ctx.intents = vec![DecisionIntent::CompleteExecution { result }];
    Ok(true)
}

/// Results of completed tasks keyed by task id, in spec order. Tasks without
/// a result are left out; `None` if none had one.
pub fn aggregate_results(ctx: &RoundContext<'_, '_>) -> Result<Option<Map<String, Value>>> {
    let mut results = Map::new();

    for task in ctx.graph.tasks() {
        let Some(event) = ctx.tracker.last_outcome(task) else {
            continue;
        };
        if event.event_type != EventType::ActivityTaskCompleted {
            continue;
        }
        if let Some(raw) = event.activity_outcome()?.result.as_deref() {
            let value = parse_payload(event.event_id, raw)?;
            results.insert(task.to_string(), value);
        }
    }

    Ok((!results.is_empty()).then_some(results))
}

/// Execution input, as an object keyed by task id.
///
/// The first event of the history must be the execution-started event. An
/// absent or non-object input yields `None`.
fn execution_inputs(index: &EventIndex<'_>) -> Result<Option<Map<String, Value>>> {
    let first = index
        .events()
        .first()
        .filter(|e| e.event_type == EventType::WorkflowExecutionStarted)
        .ok_or(HistoryError::MissingStartEvent)?;

    let Some(raw) = first.execution_started()?.input.as_deref() else {
        return Ok(None);
    };

    match parse_payload(first.event_id, raw)? {
        Value::Object(map) => Ok(Some(map)),
        _ => Ok(None),
    }
}

fn parse_payload(event_id: u64, raw: &str) -> Result<Value> {
    serde_json::from_str(raw).map_err(|source| DeciderError::InvalidPayload { event_id, source })
}
