mod common;

use std::collections::HashSet;

use common::*;
use dagdecider::config::model::DagSpec;
use dagdecider::decisions::DecisionType;
use dagdecider::workflow::{DagWorkflow, Workflow};
use proptest::prelude::*;

// Acyclic by construction: task N may only depend on tasks 0..N-1.
fn dag_strategy(max_tasks: usize) -> impl Strategy<Value = DagSpec> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..num_tasks),
            num_tasks,
        )
        .prop_map(move |raw_deps| {
            let mut builder = WorkflowSpecBuilder::new(WORKFLOW, VERSION);
            for (i, potential_deps) in raw_deps.into_iter().enumerate() {
                let mut task = TaskSpecBuilder::new(&format!("t{i}"));
                let deps: HashSet<usize> = if i == 0 {
                    HashSet::new()
                } else {
                    potential_deps.into_iter().map(|d| d % i).collect()
                };
                let mut deps: Vec<_> = deps.into_iter().collect();
                deps.sort_unstable();
                for dep in deps {
                    task = task.after(&format!("t{dep}"));
                }
                builder = builder.task(task.build());
            }
            builder.build_dag()
        })
    })
}

/// Drive a whole execution, completing every scheduled activity before the
/// next round. Returns the scheduling order and the final history.
fn simulate(workflow: &DagWorkflow) -> (Vec<String>, HistoryBuilder) {
    let mut h = first_round(None);
    let mut order = Vec::new();

    for _ in 0..=workflow.graph().len() {
        let decisions = workflow.make_decisions(&h.task()).unwrap().decisions();
        let scheduled = scheduled_ids(&decisions);
        if scheduled.is_empty() {
            break;
        }

        h = h.decision_completed();
        for id in &scheduled {
            h = h.activity_scheduled(id);
        }
        for id in &scheduled {
            h = h
                .activity_started(id)
                .activity_completed(id, Some(serde_json::json!(id)));
        }
        h = h.decision_round("worker-1");
        order.extend(scheduled);
    }

    (order, h)
}

proptest! {
    #[test]
    fn every_task_runs_once_after_its_dependencies(spec in dag_strategy(8)) {
        let workflow = DagWorkflow::new(spec.clone()).unwrap();
        let (order, h) = simulate(&workflow);

        prop_assert_eq!(order.len(), spec.tasks.len());
        let unique: HashSet<_> = order.iter().collect();
        prop_assert_eq!(unique.len(), order.len());

        for task in &spec.tasks {
            let pos = order.iter().position(|t| t == &task.id).unwrap();
            for dep in &task.dependencies {
                let dep_pos = order.iter().position(|t| t == dep).unwrap();
                prop_assert!(dep_pos < pos, "{} scheduled before its dependency {}", task.id, dep);
            }
        }

        let round = workflow.make_decisions(&h.task()).unwrap();
        prop_assert_eq!(
            decision_types(&round.decisions()),
            vec![DecisionType::CompleteWorkflowExecution]
        );
    }

    #[test]
    fn rounds_are_idempotent(spec in dag_strategy(6)) {
        let workflow = DagWorkflow::new(spec).unwrap();
        let (_, h) = simulate(&workflow);
        let task = h.task();

        let first = serde_json::to_string(&workflow.make_decisions(&task).unwrap().decisions());
        let second = serde_json::to_string(&workflow.make_decisions(&task).unwrap().decisions());
        prop_assert_eq!(first.unwrap(), second.unwrap());
    }
}
