// src/workflow.rs

//! Workflow implementations and the decider registry.
//!
//! A [`Workflow`] turns one decision task into decisions. [`DagWorkflow`] is
//! the DAG implementation; further spec shapes would be additional
//! [`WorkflowSpec`] variants built by [`build_workflow`].
//!
//! [`Decider`] routes decision tasks to workflows by `(name, version)`.
//! Workflows are immutable once built and shared via `Arc`, so a `Decider`
//! can serve rounds for many executions from many threads at once.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::config::model::{DagSpec, WorkflowSpec};
use crate::dag::DagGraph;
use crate::decisions::Decision;
use crate::engine::{DagDecisionBuilder, EngineOptions, RoundOutcome};
use crate::errors::{DeciderError, Result, SpecError};
use crate::history::DecisionTask;
use crate::types::WorkflowType;

/// A configured workflow type that can make decisions.
pub trait Workflow: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn version(&self) -> &str;

    fn description(&self) -> Option<&str> {
        None
    }

    /// Spec-type tag, as used in the workflows file.
    fn spec_type(&self) -> &'static str;

    /// Run one decision round.
    fn make_decisions(&self, task: &DecisionTask) -> Result<RoundOutcome>;

    fn workflow_type(&self) -> WorkflowType {
        WorkflowType::new(self.name(), self.version())
    }
}

/// DAG workflow: the spec plus its prebuilt dependency graph.
#[derive(Debug, Clone)]
pub struct DagWorkflow {
    spec: DagSpec,
    graph: DagGraph,
}

impl DagWorkflow {
    pub const SPEC_TYPE: &'static str = "dag";

    /// Build the dependency graph once; every round reuses it.
    pub fn new(spec: DagSpec) -> std::result::Result<Self, SpecError> {
        let graph = DagGraph::build(&spec.tasks)?;
        Ok(Self { spec, graph })
    }

    pub fn spec(&self) -> &DagSpec {
        &self.spec
    }

    pub fn graph(&self) -> &DagGraph {
        &self.graph
    }

    fn options(&self) -> EngineOptions {
        EngineOptions {
            cancel_in_flight_activities: self.spec.cancel_in_flight_activities,
        }
    }
}

impl Workflow for DagWorkflow {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn version(&self) -> &str {
        &self.spec.version
    }

    fn description(&self) -> Option<&str> {
        self.spec.description.as_deref()
    }

    fn spec_type(&self) -> &'static str {
        Self::SPEC_TYPE
    }

    fn make_decisions(&self, task: &DecisionTask) -> Result<RoundOutcome> {
        DagDecisionBuilder::new(&self.graph, self.options()).build(task)
    }
}

/// Build the workflow implementation selected by the spec's type tag.
pub fn build_workflow(spec: WorkflowSpec) -> std::result::Result<Arc<dyn Workflow>, SpecError> {
    match spec {
        WorkflowSpec::Dag(dag) => Ok(Arc::new(DagWorkflow::new(dag)?)),
    }
}

/// Registry of workflows keyed by workflow type.
#[derive(Debug, Clone, Default)]
pub struct Decider {
    workflows: HashMap<WorkflowType, Arc<dyn Workflow>>,
}

impl Decider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a workflow, returning any previously registered workflow of
    /// the same type.
    pub fn register(&mut self, workflow: Arc<dyn Workflow>) -> Option<Arc<dyn Workflow>> {
        let key = workflow.workflow_type();
        debug!(
            name = %key.name,
            version = %key.version,
            spec_type = workflow.spec_type(),
            "registered workflow"
        );
        self.workflows.insert(key, workflow)
    }

    pub fn get(&self, workflow_type: &WorkflowType) -> Option<&Arc<dyn Workflow>> {
        self.workflows.get(workflow_type)
    }

    pub fn len(&self) -> usize {
        self.workflows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workflows.is_empty()
    }

    /// Registered workflows, sorted by name then version.
    pub fn workflows(&self) -> Vec<&Arc<dyn Workflow>> {
        let mut all: Vec<_> = self.workflows.values().collect();
        all.sort_by(|a, b| (a.name(), a.version()).cmp(&(b.name(), b.version())));
        all
    }

    /// Run one decision round for the task's workflow type.
    pub fn decide_round(&self, task: &DecisionTask) -> Result<RoundOutcome> {
        let workflow =
            self.get(&task.workflow_type)
                .ok_or_else(|| DeciderError::UnknownWorkflow {
                    name: task.workflow_type.name.clone(),
                    version: task.workflow_type.version.clone(),
                })?;
        workflow.make_decisions(task)
    }

    /// Run one decision round and render its decisions.
    pub fn decide(&self, task: &DecisionTask) -> Result<Vec<Decision>> {
        Ok(self.decide_round(task)?.decisions())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::TaskSpec;
    use crate::types::ActivityType;

    fn dag_spec(name: &str, version: &str) -> DagSpec {
        DagSpec {
            name: name.to_string(),
            version: version.to_string(),
            description: Some("test".to_string()),
            cancel_in_flight_activities: false,
            tasks: vec![TaskSpec::new("A", ActivityType::new("a", "1"))],
        }
    }

    #[test]
    fn dag_workflow_exposes_its_spec() {
        let workflow = DagWorkflow::new(dag_spec("ingest", "1.0")).unwrap();
        assert_eq!(workflow.name(), "ingest");
        assert_eq!(workflow.version(), "1.0");
        assert_eq!(workflow.description(), Some("test"));
        assert_eq!(workflow.spec_type(), "dag");
        assert_eq!(workflow.graph().len(), 1);
    }

    #[test]
    fn invalid_spec_is_rejected_on_build() {
        let mut spec = dag_spec("ingest", "1.0");
        spec.tasks[0].dependencies = vec!["missing".to_string()];
        let err = build_workflow(WorkflowSpec::Dag(spec)).unwrap_err();
        assert!(matches!(err, SpecError::UnknownDependency { .. }));
    }

    #[test]
    fn registry_is_keyed_by_name_and_version() {
        let mut decider = Decider::new();
        decider.register(build_workflow(WorkflowSpec::Dag(dag_spec("ingest", "1.0"))).unwrap());
        decider.register(build_workflow(WorkflowSpec::Dag(dag_spec("ingest", "2.0"))).unwrap());

        assert_eq!(decider.len(), 2);
        assert!(decider.get(&WorkflowType::new("ingest", "1.0")).is_some());
        assert!(decider.get(&WorkflowType::new("ingest", "3.0")).is_none());

        let versions: Vec<_> = decider.workflows().iter().map(|w| w.version()).collect();
        assert_eq!(versions, vec!["1.0", "2.0"]);
    }

    #[test]
    fn unknown_workflow_type_is_an_error() {
        let decider = Decider::new();
        let task = DecisionTask {
            task_token: None,
            workflow_execution: None,
            workflow_type: WorkflowType::new("missing", "1"),
            events: Vec::new(),
            started_event_id: 3,
            previous_started_event_id: None,
        };

        let err = decider.decide(&task).unwrap_err();
        assert!(matches!(err, DeciderError::UnknownWorkflow { ref name, .. } if name == "missing"));
    }

    #[test]
    fn decider_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Decider>();
    }
}
