// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod decisions;
pub mod engine;
pub mod errors;
pub mod history;
pub mod logging;
pub mod types;
pub mod workflow;

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::{CliArgs, Command};
use crate::config::loader::load_and_validate;
use crate::config::model::{WorkflowSpec, WorkflowsFile};
use crate::dag::DagGraph;
use crate::history::DecisionTask;

pub use crate::decisions::Decision;
pub use crate::workflow::{DagWorkflow, Decider, Workflow};

/// High-level entry point used by `main.rs`.
pub fn run(args: CliArgs) -> Result<()> {
    match args.command {
        Command::Check { workflows } => {
            let file = load_workflows(&workflows)?;
            print_check(&file)
        }
        Command::Decide {
            workflows,
            task,
            pretty,
        } => {
            let decider = load_workflows(&workflows)?.into_decider()?;
            let task = read_task(&task)?;
            info!(
                workflow = %task.workflow_type.name,
                version = %task.workflow_type.version,
                events = task.events.len(),
                "deciding"
            );

            let decisions = decider.decide(&task)?;
            let out = if pretty {
                serde_json::to_string_pretty(&decisions)?
            } else {
                serde_json::to_string(&decisions)?
            };
            println!("{out}");
            Ok(())
        }
    }
}

fn load_workflows(path: &Path) -> Result<WorkflowsFile> {
    load_and_validate(path).with_context(|| format!("loading workflows from {}", path.display()))
}

/// Read a decision task from a file, or from stdin for `-`.
fn read_task(source: &str) -> Result<DecisionTask> {
    let contents = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading decision task from stdin")?;
        buf
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("reading decision task from {source}"))?
    };

    serde_json::from_str(&contents).context("parsing decision task")
}

/// Dry-run output: print each workflow's tasks, dependencies and roots.
fn print_check(file: &WorkflowsFile) -> Result<()> {
    println!("dagdecider check");
    println!("  version = {}", file.version);
    println!();

    println!("workflows ({}):", file.workflows.len());
    for spec in &file.workflows {
        match spec {
            WorkflowSpec::Dag(dag) => {
                let graph = DagGraph::build(&dag.tasks)?;
                println!("  - {} (version {}, dag)", dag.name, dag.version);
                if let Some(ref description) = dag.description {
                    println!("      description: {description}");
                }
                if dag.cancel_in_flight_activities {
                    println!("      cancel_in_flight_activities: true");
                }
                println!("      roots: {:?}", graph.dependents_of(None));
                for task in &dag.tasks {
                    println!(
                        "      * {} ({} {})",
                        task.id, task.activity_type.name, task.activity_type.version
                    );
                    if !task.dependencies.is_empty() {
                        println!("          dependencies: {:?}", task.dependencies);
                    }
                    if let Some(heartbeat) = task.heartbeat {
                        println!("          heartbeat: {heartbeat}s");
                    }
                    if let Some(timeout) = task.timeout {
                        println!("          timeout: {timeout}s");
                    }
                    if let Some(ref task_list) = task.task_list {
                        println!("          task_list: {task_list}");
                    }
                    if let Some(priority) = task.priority {
                        println!("          priority: {priority}");
                    }
                }
            }
        }
    }

    debug!("check complete (no decisions made)");
    Ok(())
}
