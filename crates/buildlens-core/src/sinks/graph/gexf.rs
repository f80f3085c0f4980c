//! GEXF 1.2 rendering, readable by Gephi.

use super::{GraphEdge, GraphFormat, GraphNode};

/// GEXF 1.2 with `module` and `cached` node attributes.
pub struct Gexf;

impl GraphFormat for Gexf {
    const FILE_NAME: &'static str = "gexfTaskDependency.gexf";
    const NAME: &'static str = "gexf";

    fn header(&self) -> String {
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<gexf xmlns=\"http://www.gexf.net/1.2draft\" version=\"1.2\">\n",
            "    <graph mode=\"static\" defaultedgetype=\"directed\">\n",
            "        <attributes class=\"node\">\n",
            "            <attribute id=\"0\" title=\"module\" type=\"string\"/>\n",
            "            <attribute id=\"1\" title=\"cached\" type=\"boolean\"/>\n",
            "        </attributes>\n",
            "        <nodes>\n",
        )
        .to_string()
    }

    fn format_node(&self, node: &GraphNode) -> String {
        format!(
            concat!(
                "            <node id=\"{id}\" label=\"{label}\">\n",
                "                <attvalues>\n",
                "                    <attvalue for=\"0\" value=\"{module}\"/>\n",
                "                    <attvalue for=\"1\" value=\"{cached}\"/>\n",
                "                </attvalues>\n",
                "            </node>\n",
            ),
            id = node.id,
            label = escape_xml(&node.path),
            module = escape_xml(&node.module),
            cached = node.cached,
        )
    }

    fn separator(&self) -> String {
        "        </nodes>\n        <edges>\n".to_string()
    }

    fn format_edge(&self, edge_id: usize, edge: &GraphEdge) -> String {
        format!(
            "            <edge id=\"{edge_id}\" source=\"{}\" target=\"{}\"/>\n",
            edge.from, edge.to
        )
    }

    fn footer(&self) -> String {
        "        </edges>\n    </graph>\n</gexf>\n".to_string()
    }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::graph::{TaskGraph, render};
    use crate::domain::{TaskRecord, TaskState};

    #[test]
    fn renders_nodes_edges_and_attributes() {
        let graph = TaskGraph::from_tasks(&[
            TaskRecord::new(":app:assemble", "app", TaskState::Executed).depends_on(":lib:jar"),
            TaskRecord::new(":lib:jar", "lib", TaskState::FromCache),
        ]);
        let out = render(&Gexf, &graph);

        assert!(out.starts_with("<?xml"));
        assert!(out.contains("<node id=\"0\" label=\":app:assemble\">"));
        assert!(out.contains("<attvalue for=\"0\" value=\"lib\"/>"));
        assert!(out.contains("<attvalue for=\"1\" value=\"true\"/>"));
        assert!(out.contains("<edge id=\"0\" source=\"0\" target=\"1\"/>"));
        assert!(out.trim_end().ends_with("</gexf>"));
    }

    #[test]
    fn edge_ids_count_from_zero() {
        let graph = TaskGraph::from_tasks(&[
            TaskRecord::new(":a", "m", TaskState::Executed).depends_on(":b").depends_on(":c"),
            TaskRecord::new(":b", "m", TaskState::Executed),
            TaskRecord::new(":c", "m", TaskState::Executed),
        ]);
        let out = render(&Gexf, &graph);
        assert!(out.contains("<edge id=\"0\" source=\"0\" target=\"1\"/>"));
        assert!(out.contains("<edge id=\"1\" source=\"0\" target=\"2\"/>"));
    }

    #[test]
    fn labels_are_escaped() {
        assert_eq!(escape_xml("<a & \"b\">"), "&lt;a &amp; &quot;b&quot;&gt;");
    }
}
