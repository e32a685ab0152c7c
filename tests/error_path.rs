mod common;

use common::*;
use dagdecider::decisions::DecisionType;
use dagdecider::engine::RoundResolution;
use dagdecider::errors::DeciderError;
use dagdecider::history::{ActivityTimeoutType, EventType};
use dagdecider::workflow::Workflow;
use serde_json::json;

fn fail_details(decisions: &[dagdecider::Decision]) -> Option<String> {
    decisions
        .iter()
        .find_map(|d| d.fail_workflow_execution_decision_attributes.as_ref())
        .and_then(|a| a.details.clone())
}

/// A and B in flight after the first round of `fan_in_spec`.
fn both_roots_scheduled() -> HistoryBuilder {
    first_round(None)
        .decision_completed()
        .activity_scheduled("A")
        .activity_scheduled("B")
}

#[test]
fn failure_wins_over_completion_in_the_same_round() {
    init_tracing();
    let workflow = fan_in_spec().build_workflow();

    let h = both_roots_scheduled()
        .activity_completed("A", Some(json!(1)))
        .activity_failed("B", "boom")
        .decision_round("worker-1");

    let round = workflow.make_decisions(&h.task()).unwrap();
    assert_eq!(round.resolution, RoundResolution::Failing);

    let decisions = round.decisions();
    assert_eq!(
        serde_json::to_value(&decisions).unwrap(),
        json!([{
            "decisionType": "FailWorkflowExecution",
            "failWorkflowExecutionDecisionAttributes": {"details": "1 activities failed"}
        }])
    );
}

#[test]
fn cancellation_request_short_circuits_other_errors() {
    let workflow = fan_in_spec().build_workflow();

    let h = both_roots_scheduled()
        .activity_failed("A", "boom")
        .cancel_requested()
        .activity_timed_out("B", ActivityTimeoutType::ScheduleToClose)
        .decision_round("worker-1");

    let round = workflow.make_decisions(&h.task()).unwrap();
    assert_eq!(round.resolution, RoundResolution::Cancelling);
    assert_eq!(
        serde_json::to_value(round.decisions()).unwrap(),
        json!([{"decisionType": "CancelWorkflowExecution"}])
    );
}

#[test]
fn cancellation_can_cancel_in_flight_activities() {
    let workflow = fan_in_spec()
        .cancel_in_flight_activities(true)
        .build_workflow();

    let h = both_roots_scheduled()
        .activity_started("B")
        .activity_started("A")
        .cancel_requested()
        .decision_round("worker-1");

    let decisions = workflow.make_decisions(&h.task()).unwrap().decisions();
    assert_eq!(
        serde_json::to_value(&decisions).unwrap(),
        json!([
            {
                "decisionType": "RequestCancelActivityTask",
                "requestCancelActivityTaskDecisionAttributes": {"activityId": "A"}
            },
            {
                "decisionType": "RequestCancelActivityTask",
                "requestCancelActivityTaskDecisionAttributes": {"activityId": "B"}
            },
            {"decisionType": "CancelWorkflowExecution"}
        ])
    );
}

#[test]
fn completed_activities_are_not_cancelled() {
    let workflow = fan_in_spec()
        .cancel_in_flight_activities(true)
        .build_workflow();

    let h = both_roots_scheduled()
        .activity_completed("A", None)
        .decision_round("worker-1")
        .decision_completed()
        .cancel_requested()
        .decision_round("worker-1");

    let decisions = workflow.make_decisions(&h.task()).unwrap().decisions();
    assert_eq!(
        decision_types(&decisions),
        vec![
            DecisionType::RequestCancelActivityTask,
            DecisionType::CancelWorkflowExecution
        ]
    );
    let cancelled = decisions[0]
        .request_cancel_activity_task_decision_attributes
        .as_ref()
        .map(|a| a.activity_id.as_str());
    assert_eq!(cancelled, Some("B"));
}

#[test]
fn timeouts_are_bucketed_by_kind() {
    let workflow = fan_in_spec().build_workflow();

    let h = both_roots_scheduled()
        .activity_timed_out("A", ActivityTimeoutType::Heartbeat)
        .activity_timed_out("B", ActivityTimeoutType::ScheduleToStart)
        .event(EventType::WorkflowExecutionTimedOut)
        .decision_round("worker-1");

    let decisions = workflow.make_decisions(&h.task()).unwrap().decisions();
    assert_eq!(
        fail_details(&decisions).as_deref(),
        Some("1 activities failed, 2 actions timed-out")
    );
}

#[test]
fn decision_task_timeout_fails_the_execution() {
    let workflow = chain_spec().build_workflow();

    let h = first_round(None)
        .event(EventType::DecisionTaskTimedOut)
        .decision_round("worker-2");

    let decisions = workflow.make_decisions(&h.task()).unwrap().decisions();
    assert_eq!(fail_details(&decisions).as_deref(), Some("1 actions timed-out"));
}

#[test]
fn unclassified_errors_count_as_other() {
    let workflow = chain_spec().build_workflow();

    let h = first_round(None)
        .decision_completed()
        .event(EventType::TimerFired)
        .event(EventType::RecordMarkerFailed)
        .decision_round("worker-1");

    let decisions = workflow.make_decisions(&h.task()).unwrap().decisions();
    assert_eq!(fail_details(&decisions).as_deref(), Some("2 other actions failed"));
}

#[test]
fn rejection_of_own_decision_is_fatal() {
    let workflow = chain_spec().build_workflow();

    let h = first_round(None)
        .decision_completed()
        .decision_rejected(EventType::ScheduleActivityTaskFailed, "OPERATION_NOT_PERMITTED")
        .decision_round("worker-1");
    let rejected_event_id = h.events()[4].event_id;

    let err = workflow.make_decisions(&h.task()).unwrap_err();
    match err {
        DeciderError::RejectedOwnDecision {
            event_id, identity, ..
        } => {
            assert_eq!(event_id, rejected_event_id);
            assert_eq!(identity, "worker-1");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn rejection_from_another_worker_is_ignored() {
    let workflow = chain_spec().build_workflow();

    let h = first_round(None)
        .decision_completed()
        .decision_rejected(EventType::ScheduleActivityTaskFailed, "OPERATION_NOT_PERMITTED")
        .decision_round("worker-2");

    let round = workflow.make_decisions(&h.task()).unwrap();
    assert_eq!(round.resolution, RoundResolution::Deferred);
    assert!(round.decisions().is_empty());
}

#[test]
fn unhandled_cancel_is_reemitted() {
    let workflow = chain_spec().build_workflow();

    let h = first_round(None)
        .decision_completed()
        .decision_rejected(EventType::CancelWorkflowExecutionFailed, "UNHANDLED_DECISION")
        .activity_scheduled("A")
        .activity_failed("A", "boom")
        .decision_round("worker-1");

    let round = workflow.make_decisions(&h.task()).unwrap();
    assert_eq!(round.resolution, RoundResolution::Cancelling);
    assert_eq!(
        decision_types(&round.decisions()),
        vec![DecisionType::CancelWorkflowExecution]
    );
}

#[test]
fn unhandled_complete_is_recomputed() {
    let workflow = WorkflowSpecBuilder::new(WORKFLOW, VERSION)
        .task(TaskSpecBuilder::new("A").build())
        .build_workflow();

    let h = first_round(None)
        .decision_completed()
        .activity_scheduled("A")
        .activity_completed("A", Some(json!({"ok": true})))
        .decision_round("worker-1")
        .decision_completed()
        .decision_rejected(EventType::CompleteWorkflowExecutionFailed, "UNHANDLED_DECISION")
        .decision_round("worker-1");

    let round = workflow.make_decisions(&h.task()).unwrap();
    assert_eq!(round.resolution, RoundResolution::Completing);
    assert_eq!(
        serde_json::to_value(round.decisions()).unwrap(),
        json!([{
            "decisionType": "CompleteWorkflowExecution",
            "completeWorkflowExecutionDecisionAttributes": {"result": "{\"A\":{\"ok\":true}}"}
        }])
    );
}

#[test]
fn unhandled_fail_is_absorbed_as_a_failed_decision() {
    let workflow = chain_spec().build_workflow();

    let h = first_round(None)
        .decision_completed()
        .decision_rejected(EventType::FailWorkflowExecutionFailed, "UNHANDLED_DECISION")
        .decision_round("worker-1");

    let decisions = workflow.make_decisions(&h.task()).unwrap().decisions();
    assert_eq!(fail_details(&decisions).as_deref(), Some("1 decisions failed"));
}

#[test]
fn unrecognised_rejection_cause_is_fatal() {
    let workflow = chain_spec().build_workflow();

    let h = first_round(None)
        .decision_completed()
        .decision_rejected(EventType::ScheduleActivityTaskFailed, "ACTIVITY_TYPE_DEPRECATED")
        .decision_round("worker-2");

    match workflow.make_decisions(&h.task()).unwrap_err() {
        DeciderError::UnrecognisedRejectionCause { cause, .. } => {
            assert_eq!(cause, "ACTIVITY_TYPE_DEPRECATED");
        }
        other => panic!("unexpected error: {other}"),
    }
}
