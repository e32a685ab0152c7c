// src/dag/graph.rs

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::TaskSpec;
use crate::errors::SpecError;
use crate::types::TaskId;

/// Internal node structure: stores the task spec plus its direct dependents.
#[derive(Debug, Clone)]
struct DagNode {
    spec: TaskSpec,
    /// Direct dependents: tasks that list this one in `dependencies`.
    dependents: Vec<TaskId>,
}

/// Immutable DAG of tasks with a precomputed dependents index.
///
/// Built once per workflow type and shared read-only by every decision round.
/// Tasks keep their spec order, which is also the order decisions are emitted
/// in.
#[derive(Debug, Clone)]
pub struct DagGraph {
    nodes: Vec<DagNode>,
    positions: HashMap<TaskId, usize>,
    /// Tasks with no dependencies, i.e. `dependents_of(None)`.
    roots: Vec<TaskId>,
}

impl DagGraph {
    /// Build the graph, rejecting duplicate ids, unknown or self
    /// dependencies, and cycles.
    pub fn build(tasks: &[TaskSpec]) -> Result<Self, SpecError> {
        let mut positions = HashMap::with_capacity(tasks.len());
        for (pos, task) in tasks.iter().enumerate() {
            if positions.insert(task.id.clone(), pos).is_some() {
                return Err(SpecError::DuplicateTask(task.id.clone()));
            }
        }

        let mut nodes: Vec<DagNode> = tasks
            .iter()
            .map(|spec| DagNode {
                spec: spec.clone(),
                dependents: Vec::new(),
            })
            .collect();

        // Populate dependents in spec order so the index is deterministic.
        for task in tasks {
            for dep in &task.dependencies {
                if dep == &task.id {
                    return Err(SpecError::SelfDependency(task.id.clone()));
                }
                let Some(&dep_pos) = positions.get(dep) else {
                    return Err(SpecError::UnknownDependency {
                        task: task.id.clone(),
                        dependency: dep.clone(),
                    });
                };
                if !nodes[dep_pos].dependents.contains(&task.id) {
                    nodes[dep_pos].dependents.push(task.id.clone());
                }
            }
        }

        ensure_acyclic(tasks)?;

        let roots = tasks
            .iter()
            .filter(|t| t.dependencies.is_empty())
            .map(|t| t.id.clone())
            .collect();

        Ok(Self {
            nodes,
            positions,
            roots,
        })
    }

    /// All task ids, in spec order.
    pub fn tasks(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.spec.id.as_str())
    }

    /// All task specs, in spec order.
    pub fn task_specs(&self) -> impl Iterator<Item = &TaskSpec> {
        self.nodes.iter().map(|n| &n.spec)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, task: &str) -> bool {
        self.positions.contains_key(task)
    }

    pub fn task(&self, task: &str) -> Option<&TaskSpec> {
        self.positions.get(task).map(|&pos| &self.nodes[pos].spec)
    }

    /// Immediate dependencies of a task.
    pub fn dependencies_of(&self, task: &str) -> &[TaskId] {
        self.task(task)
            .map(|spec| spec.dependencies.as_slice())
            .unwrap_or(&[])
    }

    /// For `None`, the roots (tasks with no dependencies); for a task id, its
    /// direct dependents.
    pub fn dependents_of(&self, task: Option<&str>) -> &[TaskId] {
        match task {
            None => &self.roots,
            Some(task) => self
                .positions
                .get(task)
                .map(|&pos| self.nodes[pos].dependents.as_slice())
                .unwrap_or(&[]),
        }
    }
}

fn ensure_acyclic(tasks: &[TaskSpec]) -> Result<(), SpecError> {
    // Edge direction: dependency -> dependent.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for task in tasks {
        graph.add_node(task.id.as_str());
    }
    for task in tasks {
        for dep in &task.dependencies {
            graph.add_edge(dep.as_str(), task.id.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(SpecError::Cycle(cycle.node_id().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActivityType;

    fn task(id: &str, deps: &[&str]) -> TaskSpec {
        let mut spec = TaskSpec::new(id, ActivityType::new(id, "1"));
        spec.dependencies = deps.iter().map(|d| d.to_string()).collect();
        spec
    }

    #[test]
    fn builds_dependents_index_and_roots() {
        let graph = DagGraph::build(&[
            task("A", &[]),
            task("B", &["A"]),
            task("C", &["A"]),
            task("D", &["B", "C"]),
            task("E", &[]),
        ])
        .unwrap();

        assert_eq!(graph.dependents_of(None), ["A", "E"]);
        assert_eq!(graph.dependents_of(Some("A")), ["B", "C"]);
        assert_eq!(graph.dependents_of(Some("B")), ["D"]);
        assert!(graph.dependents_of(Some("D")).is_empty());
        assert_eq!(graph.dependencies_of("D"), ["B", "C"]);
        assert_eq!(graph.tasks().collect::<Vec<_>>(), ["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn unknown_dependency_is_rejected() {
        let err = DagGraph::build(&[task("A", &["Z"])]).unwrap_err();
        assert_eq!(
            err,
            SpecError::UnknownDependency {
                task: "A".into(),
                dependency: "Z".into()
            }
        );
    }

    #[test]
    fn cycle_is_rejected_explicitly() {
        let err = DagGraph::build(&[task("A", &["C"]), task("B", &["A"]), task("C", &["B"])])
            .unwrap_err();
        assert!(matches!(err, SpecError::Cycle(_)));
    }

    #[test]
    fn self_and_duplicate_tasks_are_rejected() {
        assert_eq!(
            DagGraph::build(&[task("A", &["A"])]).unwrap_err(),
            SpecError::SelfDependency("A".into())
        );
        assert_eq!(
            DagGraph::build(&[task("A", &[]), task("A", &[])]).unwrap_err(),
            SpecError::DuplicateTask("A".into())
        );
    }

    #[test]
    fn empty_dag_has_no_roots() {
        let graph = DagGraph::build(&[]).unwrap();
        assert!(graph.is_empty());
        assert!(graph.dependents_of(None).is_empty());
    }
}
