// src/config/validate.rs

use std::collections::HashSet;

use crate::config::model::{RawWorkflowsFile, WorkflowSpec, WorkflowsFile};
use crate::dag::DagGraph;
use crate::errors::ConfigError;
use crate::workflow::{Decider, build_workflow};

impl TryFrom<RawWorkflowsFile> for WorkflowsFile {
    type Error = ConfigError;

    fn try_from(raw: RawWorkflowsFile) -> Result<Self, Self::Error> {
        validate_workflows(&raw)?;
        Ok(WorkflowsFile::new_unchecked(raw.version, raw.workflows))
    }
}

impl WorkflowsFile {
    /// Build every workflow and register it with a new [`Decider`].
    pub fn into_decider(self) -> Result<Decider, ConfigError> {
        let mut decider = Decider::new();
        for spec in self.workflows {
            let name = spec.name().to_string();
            let workflow = build_workflow(spec)
                .map_err(|source| ConfigError::Spec { workflow: name, source })?;
            decider.register(workflow);
        }
        Ok(decider)
    }
}

/// Check file-level invariants and every workflow's DAG.
pub fn validate_workflows(raw: &RawWorkflowsFile) -> Result<(), ConfigError> {
    ensure_has_workflows(raw)?;
    ensure_unique_types(raw)?;
    for spec in &raw.workflows {
        validate_spec(spec)?;
    }
    Ok(())
}

fn ensure_has_workflows(raw: &RawWorkflowsFile) -> Result<(), ConfigError> {
    if raw.workflows.is_empty() {
        return Err(ConfigError::Invalid(
            "workflows file must contain at least one [[workflows]] entry".to_string(),
        ));
    }
    Ok(())
}

fn ensure_unique_types(raw: &RawWorkflowsFile) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for spec in &raw.workflows {
        if !seen.insert((spec.name(), spec.version())) {
            return Err(ConfigError::Invalid(format!(
                "workflow '{}' version '{}' is defined more than once",
                spec.name(),
                spec.version()
            )));
        }
    }
    Ok(())
}

fn validate_spec(spec: &WorkflowSpec) -> Result<(), ConfigError> {
    match spec {
        WorkflowSpec::Dag(dag) => {
            DagGraph::build(&dag.tasks).map_err(|source| ConfigError::Spec {
                workflow: dag.name.clone(),
                source,
            })?;
        }
    }
    Ok(())
}
