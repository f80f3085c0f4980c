//! Task dependency graph and its file renderings.
//!
//! Design:
//! - `TaskGraph` is built once from the unfiltered task list, so the topology is
//!   complete even when the published task view is filtered.
//! - Formats only supply text fragments. Node ids, edge resolution and file handling
//!   are shared.

pub mod dot;
pub mod gexf;

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use crate::domain::{ExecutionReport, PublishError, TaskRecord, TaskState};
use crate::ports::Sink;

pub use self::dot::Dot;
pub use self::gexf::Gexf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    /// Position in the task list.
    pub id: usize,
    pub path: String,
    pub module: String,
    pub cached: bool,
}

/// Consumer to dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphEdge {
    pub from: usize,
    pub to: usize,
}

/// Task dependency graph with positional node ids.
///
/// Edges point from the consumer to the task it depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl TaskGraph {
    /// Dependencies outside `tasks` produce no edge. Duplicate paths resolve to the
    /// first occurrence, and each (from, to) pair yields a single edge.
    pub fn from_tasks(tasks: &[TaskRecord]) -> Self {
        let mut ids: HashMap<&str, usize> = HashMap::with_capacity(tasks.len());
        for (id, task) in tasks.iter().enumerate() {
            ids.entry(task.path.as_str()).or_insert(id);
        }

        let nodes = tasks
            .iter()
            .enumerate()
            .map(|(id, task)| GraphNode {
                id,
                path: task.path.to_string(),
                module: task.module.clone(),
                cached: task.state == TaskState::FromCache,
            })
            .collect();

        let mut seen = HashSet::new();
        let mut edges = Vec::new();
        for (from, task) in tasks.iter().enumerate() {
            for dep in &task.dependencies {
                let Some(&to) = ids.get(dep.as_str()) else {
                    continue;
                };
                if seen.insert((from, to)) {
                    edges.push(GraphEdge { from, to });
                }
            }
        }

        Self { nodes, edges }
    }
}

/// Text fragments of one graph file format.
pub trait GraphFormat: Send + Sync {
    const FILE_NAME: &'static str;
    const NAME: &'static str;

    fn header(&self) -> String;
    fn format_node(&self, node: &GraphNode) -> String;
    /// Between the node and the edge sections.
    fn separator(&self) -> String {
        String::new()
    }
    /// `edge_id` counts edges from 0 within one rendering.
    fn format_edge(&self, edge_id: usize, edge: &GraphEdge) -> String;
    fn footer(&self) -> String;
}

/// Full file content of `graph` in `format`.
pub fn render<F: GraphFormat>(format: &F, graph: &TaskGraph) -> String {
    let mut out = format.header();
    for node in &graph.nodes {
        out.push_str(&format.format_node(node));
    }
    out.push_str(&format.separator());
    for (edge_id, edge) in graph.edges.iter().enumerate() {
        out.push_str(&format.format_edge(edge_id, edge));
    }
    out.push_str(&format.footer());
    out
}

/// Writes the dependency graph of every report to `<output_dir>/<F::FILE_NAME>`.
pub struct GraphSink<F> {
    format: F,
    output_dir: PathBuf,
}

impl<F: GraphFormat> GraphSink<F> {
    pub fn new(format: F, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            format,
            output_dir: output_dir.into(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.output_dir.join(F::FILE_NAME)
    }
}

#[async_trait]
impl<F: GraphFormat> Sink for GraphSink<F> {
    fn name(&self) -> &str {
        F::NAME
    }

    async fn publish(&self, report: &ExecutionReport) -> Result<(), PublishError> {
        let graph = TaskGraph::from_tasks(&report.unfiltered_tasks);
        let content = render(&self.format, &graph);
        super::write_output(&self.output_dir, &self.path(), content).await?;
        tracing::info!(
            path = %self.path().display(),
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "task graph written"
        );
        Ok(())
    }
}
