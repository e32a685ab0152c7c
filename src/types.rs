use serde::{Deserialize, Serialize};

/// Canonical task identifier type used throughout the decider.
///
/// This is the `id` of a task in a workflow spec, and doubles as the backend
/// `activityId` when the task is scheduled.
pub type TaskId = String;

/// Backend activity type reference (`{ "name": ..., "version": ... }`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivityType {
    pub name: String,
    pub version: String,
}

impl ActivityType {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Backend workflow type reference, as carried on a decision task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkflowType {
    pub name: String,
    pub version: String,
}

impl WorkflowType {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Backend task list (queue) reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    pub name: String,
}
