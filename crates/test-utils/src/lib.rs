pub mod builders;

use std::sync::Once;

use dagdecider::decisions::{Decision, DecisionType};
use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Decision types, in order.
pub fn decision_types(decisions: &[Decision]) -> Vec<DecisionType> {
    decisions.iter().map(|d| d.decision_type).collect()
}

/// Activity ids of the `ScheduleActivityTask` decisions, in order.
pub fn scheduled_ids(decisions: &[Decision]) -> Vec<String> {
    decisions
        .iter()
        .filter_map(|d| d.schedule_activity_task_decision_attributes.as_ref())
        .map(|a| a.activity_id.clone())
        .collect()
}
