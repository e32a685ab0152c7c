// src/config/model.rs

use serde::{Deserialize, Serialize};

use crate::types::{ActivityType, TaskId};

/// Top-level workflows file as read from TOML (or JSON).
///
/// ```toml
/// version = "1.0"
///
/// [[workflows]]
/// spec_type = "dag"
/// name = "ingest"
/// version = "1.0"
///
/// [[workflows.tasks]]
/// id = "fetch"
/// type = { name = "fetch", version = "1.0" }
///
/// [[workflows.tasks]]
/// id = "load"
/// type = { name = "load", version = "1.0" }
/// dependencies = ["fetch"]
/// ```
///
/// This is the unchecked form; see [`WorkflowsFile`] for the validated one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawWorkflowsFile {
    /// File format version.
    #[serde(default = "default_file_version")]
    pub version: String,

    #[serde(default)]
    pub workflows: Vec<WorkflowSpec>,
}

fn default_file_version() -> String {
    "1.0".to_string()
}

/// One workflow type's specification, selected by its `spec_type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "spec_type", rename_all = "lowercase")]
pub enum WorkflowSpec {
    Dag(DagSpec),
}

impl WorkflowSpec {
    pub fn name(&self) -> &str {
        match self {
            WorkflowSpec::Dag(spec) => &spec.name,
        }
    }

    pub fn version(&self) -> &str {
        match self {
            WorkflowSpec::Dag(spec) => &spec.version,
        }
    }
}

/// A DAG of activity tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DagSpec {
    pub name: String,
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// When the execution is cancelled, also request cancellation of every
    /// activity still scheduled or running.
    #[serde(default)]
    pub cancel_in_flight_activities: bool,

    #[serde(default)]
    pub tasks: Vec<TaskSpec>,
}

/// `[[workflows.tasks]]` entry: one schedulable unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Identifier, unique within the workflow; used as the activity id.
    pub id: TaskId,

    /// Activity type to schedule.
    #[serde(rename = "type")]
    pub activity_type: ActivityType,

    /// Tasks that must complete before this one is scheduled.
    #[serde(default)]
    pub dependencies: Vec<TaskId>,

    /// Heartbeat timeout in seconds. `None` means the backend default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heartbeat: Option<u64>,

    /// Start-to-close timeout in seconds. `None` means the backend default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Task list (queue) to schedule on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_list: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
}

impl TaskSpec {
    pub fn new(id: impl Into<TaskId>, activity_type: ActivityType) -> Self {
        Self {
            id: id.into(),
            activity_type,
            dependencies: Vec::new(),
            heartbeat: None,
            timeout: None,
            task_list: None,
            priority: None,
        }
    }
}

/// Validated workflows file.
///
/// Constructed via `TryFrom<RawWorkflowsFile>` (see `config::validate`).
#[derive(Debug, Clone)]
pub struct WorkflowsFile {
    pub version: String,
    pub workflows: Vec<WorkflowSpec>,
}

impl WorkflowsFile {
    pub(crate) fn new_unchecked(version: String, workflows: Vec<WorkflowSpec>) -> Self {
        Self { version, workflows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_toml_with_defaults() {
        let toml = r#"
[[workflows]]
spec_type = "dag"
name = "ingest"
version = "1.0"

[[workflows.tasks]]
id = "fetch"
type = { name = "fetch", version = "2" }
heartbeat = 30
task_list = "fetchers"

[[workflows.tasks]]
id = "load"
type = { name = "load", version = "1" }
dependencies = ["fetch"]
"#;

        let raw: RawWorkflowsFile = toml::from_str(toml).unwrap();
        assert_eq!(raw.version, "1.0");
        assert_eq!(raw.workflows.len(), 1);

        let WorkflowSpec::Dag(dag) = &raw.workflows[0];
        assert_eq!(dag.name, "ingest");
        assert!(!dag.cancel_in_flight_activities);
        assert_eq!(dag.tasks[0].activity_type, ActivityType::new("fetch", "2"));
        assert_eq!(dag.tasks[0].heartbeat, Some(30));
        assert_eq!(dag.tasks[0].timeout, None);
        assert_eq!(dag.tasks[0].task_list.as_deref(), Some("fetchers"));
        assert_eq!(dag.tasks[1].dependencies, vec!["fetch".to_string()]);
    }

    #[test]
    fn unknown_spec_type_is_rejected() {
        let json = r#"{"workflows": [{"spec_type": "steps", "name": "x", "version": "1"}]}"#;
        assert!(serde_json::from_str::<RawWorkflowsFile>(json).is_err());
    }
}
