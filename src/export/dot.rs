//! DOT emission.
//!
//! Renders the derived graph, not the model: plain topic edges go
//! through a rectangular topic vertex (publisher -> topic -> subscriber),
//! grouped action edges through a heavier purple action vertex
//! (client -> action -> server). Unvalidated nodes render dashed so the
//! picture never hides uncertainty. Output is plain text; running a DOT
//! renderer on it is the caller's business.

use crate::graph::{Graph, GraphEdge};

pub fn render(graph: &Graph) -> String {
    let mut rows: Vec<String> = Vec::new();
    rows.push("digraph deployment {".to_string());
    rows.push("    graph [concentrate=true];".to_string());

    for node in &graph.nodes {
        let style = if node.validated { "solid" } else { "dashed" };
        rows.push(format!(
            "    \"node-{id}\" [label=\"{label}\", color=blue, style={style}];",
            id = escape(node.name.as_str()),
            label = escape(node.name.as_str()),
        ));
    }

    for edge in &graph.edges {
        match edge {
            GraphEdge::Topic(topic) => {
                rows.push(format!(
                    "    \"topic-{id}\" [label=\"{label}\", shape=rectangle, color=red];",
                    id = escape(&topic.topic),
                    label = escape(&topic.topic),
                ));
                for publisher in &topic.publishers {
                    rows.push(format!(
                        "    \"node-{}\" -> \"topic-{}\";",
                        escape(publisher.as_str()),
                        escape(&topic.topic),
                    ));
                }
                for subscriber in &topic.subscribers {
                    rows.push(format!(
                        "    \"topic-{}\" -> \"node-{}\";",
                        escape(&topic.topic),
                        escape(subscriber.as_str()),
                    ));
                }
            }
            GraphEdge::Action(action) => {
                let label = if action.partial {
                    format!(
                        "{}\\n(partial: missing {})",
                        escape(&action.action),
                        action.missing_suffixes.join(", ")
                    )
                } else {
                    escape(&action.action)
                };
                rows.push(format!(
                    "    \"action-{id}\" [label=\"{label}\", shape=rectangle, color=purple];",
                    id = escape(&action.action),
                ));
                for client in &action.clients {
                    rows.push(format!(
                        "    \"node-{}\" -> \"action-{}\" [arrowhead=vee, penwidth=3, color=purple];",
                        escape(client.as_str()),
                        escape(&action.action),
                    ));
                }
                for server in &action.servers {
                    rows.push(format!(
                        "    \"action-{}\" -> \"node-{}\" [arrowhead=vee, penwidth=3, color=purple];",
                        escape(&action.action),
                        escape(server.as_str()),
                    ));
                }
            }
        }
    }

    rows.push("}".to_string());
    rows.push(String::new());
    rows.join("\n")
}

fn escape(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('"', "\\\"")
}
