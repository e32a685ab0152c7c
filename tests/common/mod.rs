#![allow(dead_code)]

pub use dagdecider_test_utils::builders::{HistoryBuilder, TaskSpecBuilder, WorkflowSpecBuilder};
pub use dagdecider_test_utils::{decision_types, init_tracing, scheduled_ids};

pub const WORKFLOW: &str = "pipeline";
pub const VERSION: &str = "1.0";

/// A → B.
pub fn chain_spec() -> WorkflowSpecBuilder {
    WorkflowSpecBuilder::new(WORKFLOW, VERSION)
        .task(TaskSpecBuilder::new("A").build())
        .task(TaskSpecBuilder::new("B").after("A").build())
}

/// Roots A and B, C after both.
pub fn fan_in_spec() -> WorkflowSpecBuilder {
    WorkflowSpecBuilder::new(WORKFLOW, VERSION)
        .task(TaskSpecBuilder::new("A").build())
        .task(TaskSpecBuilder::new("B").build())
        .task(TaskSpecBuilder::new("C").after("A").after("B").build())
}

pub fn history() -> HistoryBuilder {
    HistoryBuilder::new(WORKFLOW, VERSION)
}

/// First round of a fresh execution, decided by `worker-1`.
pub fn first_round(input: Option<serde_json::Value>) -> HistoryBuilder {
    history().workflow_started(input).decision_round("worker-1")
}
