// src/engine/error_path.rs

//! Error-path resolution.
//!
//! A round whose window contains error-class events never schedules work.
//! A cancellation request wins outright; otherwise every error event is
//! counted into a bucket and the round fails the execution with a summary.
//! Decision rejections go through [`recover_rejection`] first, which can
//! re-emit the rejected decision, absorb it, ignore it, or abort the round.

use tracing::{debug, warn};

use crate::dag::TaskState;
use crate::decisions::DecisionIntent;
use crate::engine::{EngineOptions, RoundContext, RoundResolution, event_handlers};
use crate::errors::{DeciderError, Result};
use crate::history::{EventType, HistoryEvent};

/// Rejection cause: the decision was not permitted for the worker.
pub const OPERATION_NOT_PERMITTED: &str = "OPERATION_NOT_PERMITTED";
/// Rejection cause: new events arrived while the decision was being made.
pub const UNHANDLED_DECISION: &str = "UNHANDLED_DECISION";

/// Error counts per category, in summary order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorBuckets {
    pub activities: usize,
    pub decisions: usize,
    pub timeouts: usize,
    pub other: usize,
}

impl ErrorBuckets {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Human-readable summary, e.g. `"1 activities failed, 2 actions
    /// timed-out"`. Empty buckets are left out.
    pub fn summary(&self) -> String {
        [
            (self.activities, "activities failed"),
            (self.decisions, "decisions failed"),
            (self.timeouts, "actions timed-out"),
            (self.other, "other actions failed"),
        ]
        .iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, label)| format!("{count} {label}"))
        .collect::<Vec<_>>()
        .join(", ")
    }
}

/// What decision-rejection recovery did with one rejection event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Made by another worker's round; nothing to do.
    Ignored,
    /// Counted as a failed decision.
    Absorbed,
    /// The rejected decision was re-emitted and the round is resolved.
    Reemitted(RoundResolution),
}

/// Resolve a round whose window holds error-class events.
pub fn resolve(
    ctx: &mut RoundContext<'_, '_>,
    options: &EngineOptions,
) -> Result<RoundResolution> {
    if let Some(event) = ctx
        .errors
        .iter()
        .find(|e| e.event_type == EventType::WorkflowExecutionCancelRequested)
    {
        debug!(event_id = event.event_id, "cancellation requested");
        cancel(ctx, options);
        return Ok(RoundResolution::Cancelling);
    }

    let mut buckets = ErrorBuckets::default();
    let errors = ctx.errors.clone();

    for event in errors {
        match event.event_type {
            EventType::ActivityTaskFailed => buckets.activities += 1,
            EventType::ActivityTaskTimedOut => {
                let attributed = event
                    .activity_outcome()?
                    .timeout_type
                    .is_some_and(|t| t.is_attributed_to_activity());
                if attributed {
                    buckets.activities += 1;
                } else {
                    buckets.timeouts += 1;
                }
            }
            EventType::DecisionTaskTimedOut | EventType::WorkflowExecutionTimedOut => {
                buckets.timeouts += 1
            }
            kind if kind.is_decision_rejection() => match recover_rejection(ctx, event)? {
                Recovery::Ignored => {}
                Recovery::Absorbed => buckets.decisions += 1,
                Recovery::Reemitted(resolution) => return Ok(resolution),
            },
            _ => buckets.other += 1,
        }
    }

    if buckets.is_empty() {
        debug!("all error events absorbed; deferring");
        return Ok(RoundResolution::Deferred);
    }

    let details = buckets.summary();
    debug!(?buckets, %details, "failing execution");
    ctx.intents = vec![DecisionIntent::FailExecution {
        reason: None,
        details: Some(details),
    }];
    Ok(RoundResolution::Failing)
}

/// Cancel the execution, preceded by cancellation of in-flight activities
/// when enabled.
fn cancel(ctx: &mut RoundContext<'_, '_>, options: &EngineOptions) {
    let mut intents = Vec::new();

    if options.cancel_in_flight_activities {
        for task in ctx.graph.tasks() {
            if ctx.tracker.state_of(task) == TaskState::InFlight {
                intents.push(DecisionIntent::RequestCancelActivity {
                    activity_id: task.to_string(),
                });
            }
        }
    }

    intents.push(DecisionIntent::CancelExecution { details: None });
    ctx.intents = intents;
}

/// Decide what to do about one decision-rejection event.
///
/// - `OPERATION_NOT_PERMITTED`: fatal if the rejected decision came from the
///   worker processing this round, ignored otherwise.
/// - `UNHANDLED_DECISION`: a rejected cancel is re-emitted, a rejected
///   complete is recomputed; anything else is absorbed.
/// - Any other cause is fatal.
pub fn recover_rejection(
    ctx: &mut RoundContext<'_, '_>,
    event: &HistoryEvent,
) -> Result<Recovery> {
    let attrs = event.decision_rejected()?;

    match attrs.cause.as_str() {
        OPERATION_NOT_PERMITTED => {
            let completed = ctx.index.require(attrs.decision_task_completed_event_id)?;
            let rejected_started_id = completed.decision_completed()?.started_event_id;
            let rejected_identity = ctx
                .index
                .require(rejected_started_id)?
                .decision_started()?
                .identity
                .as_deref();
            let current_identity = ctx.started_event.decision_started()?.identity.as_deref();

            if rejected_identity == current_identity {
                return Err(DeciderError::RejectedOwnDecision {
                    event_id: event.event_id,
                    identity: current_identity.unwrap_or_default().to_string(),
                    started_event_id: ctx.started_event.event_id,
                });
            }

            warn!(
                event_id = event.event_id,
                event_type = ?event.event_type,
                rejected_identity,
                "ignoring decision rejected for another worker"
            );
            Ok(Recovery::Ignored)
        }
        UNHANDLED_DECISION => match event.event_type {
            EventType::CancelWorkflowExecutionFailed => {
                warn!(event_id = event.event_id, "cancel decision unhandled; re-emitting");
                ctx.intents = vec![DecisionIntent::CancelExecution { details: None }];
                Ok(Recovery::Reemitted(RoundResolution::Cancelling))
            }
            EventType::CompleteWorkflowExecutionFailed => {
                warn!(event_id = event.event_id, "complete decision unhandled; recomputing");
                ctx.intents.clear();
                let resolution = if event_handlers::complete_if_done(ctx)? {
                    RoundResolution::Completing
                } else {
                    RoundResolution::Deferred
                };
                Ok(Recovery::Reemitted(resolution))
            }
            other => {
                warn!(
                    event_id = event.event_id,
                    event_type = ?other,
                    "decision unhandled; counting as failed"
                );
                Ok(Recovery::Absorbed)
            }
        },
        cause => Err(DeciderError::UnrecognisedRejectionCause {
            event_id: event.event_id,
            cause: cause.to_string(),
        }),
    }
}
