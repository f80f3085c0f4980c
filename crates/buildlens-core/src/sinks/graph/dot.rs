//! Graphviz DOT rendering. Cached tasks are filled green.

use super::{GraphEdge, GraphFormat, GraphNode};

/// Graphviz DOT. Cached tasks are filled pale green.
pub struct Dot;

impl GraphFormat for Dot {
    const FILE_NAME: &'static str = "taskDependency.dot";
    const NAME: &'static str = "dot";

    fn header(&self) -> String {
        "digraph tasks {\n    node [shape=box, style=filled, fillcolor=white];\n".to_string()
    }

    fn format_node(&self, node: &GraphNode) -> String {
        let fill = if node.cached { ", fillcolor=palegreen" } else { "" };
        format!(
            "    {} [label=\"{}\", tooltip=\"{}\"{fill}];\n",
            node.id,
            escape_dot(&node.path),
            escape_dot(&node.module),
        )
    }

    fn format_edge(&self, _edge_id: usize, edge: &GraphEdge) -> String {
        format!("    {} -> {};\n", edge.from, edge.to)
    }

    fn footer(&self) -> String {
        "}\n".to_string()
    }
}

fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TaskRecord, TaskState};
    use crate::sinks::graph::{TaskGraph, render};

    #[test]
    fn renders_digraph() {
        let graph = TaskGraph::from_tasks(&[
            TaskRecord::new(":app:assemble", "app", TaskState::Executed).depends_on(":lib:jar"),
            TaskRecord::new(":lib:jar", "lib", TaskState::FromCache),
        ]);
        let out = render(&Dot, &graph);

        assert!(out.starts_with("digraph tasks {"));
        assert!(out.contains("    0 [label=\":app:assemble\", tooltip=\"app\"];\n"));
        assert!(out.contains("    1 [label=\":lib:jar\", tooltip=\"lib\", fillcolor=palegreen];\n"));
        assert!(out.contains("    0 -> 1;\n"));
        assert!(out.ends_with("}\n"));
    }
}
