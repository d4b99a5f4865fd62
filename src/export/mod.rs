//! Exporters: thin format adapters over the reconciled model and the
//! derived graph. No business logic lives here; both inputs are
//! read-only and fully populated by the time they arrive.
//!
//! Structured formats write one document per entity bank
//! (`<base>_nodes.yaml`, `<base>_topics.yaml`, ...); the text format
//! writes a single human-readable listing; DOT captures the graph.

pub mod dot;
pub mod text;

use crate::Result;
use crate::graph::Graph;
use crate::model::{Model, Topic};
use anyhow::Context;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
    Text,
}

/// Write the model banks in each requested format. Returns the written
/// paths in a stable order.
pub fn write_model(
    model: &Model,
    directory: &str,
    base_name: &str,
    formats: &[Format],
) -> Result<Vec<PathBuf>> {
    let directory = Path::new(directory);
    fs::create_dir_all(directory)
        .with_context(|| format!("create output directory {}", directory.display()))?;

    let mut written = Vec::new();
    for format in formats {
        match format {
            Format::Text => {
                let path = directory.join(format!("{base_name}_model.txt"));
                fs::write(&path, text::render_model(model))
                    .with_context(|| format!("write {}", path.display()))?;
                written.push(path);
            }
            Format::Yaml | Format::Json => {
                let topics: Vec<&Topic> = model.topics.values().collect();
                written.push(write_bank(directory, base_name, "nodes", &model.nodes, *format)?);
                written.push(write_bank(directory, base_name, "topics", &topics, *format)?);
                written.push(write_bank(
                    directory,
                    base_name,
                    "services",
                    &model.services,
                    *format,
                )?);
                written.push(write_bank(
                    directory,
                    base_name,
                    "actions",
                    &model.actions,
                    *format,
                )?);
                written.push(write_bank(
                    directory,
                    base_name,
                    "packages",
                    &model.packages,
                    *format,
                )?);
                written.push(write_bank(
                    directory,
                    base_name,
                    "messages",
                    &model.messages,
                    *format,
                )?);
                written.push(write_bank(
                    directory,
                    base_name,
                    "service_types",
                    &model.service_types,
                    *format,
                )?);
                written.push(write_bank(
                    directory,
                    base_name,
                    "action_types",
                    &model.action_types,
                    *format,
                )?);
                written.push(write_bank(
                    directory,
                    base_name,
                    "diagnostics",
                    &model.diagnostics,
                    *format,
                )?);
            }
        }
    }
    Ok(written)
}

/// Write the derived graph as a DOT file.
pub fn write_graph_dot(graph: &Graph, directory: &str, base_name: &str) -> Result<PathBuf> {
    let directory = Path::new(directory);
    fs::create_dir_all(directory)
        .with_context(|| format!("create output directory {}", directory.display()))?;
    let path = directory.join(format!("{base_name}_graph.dot"));
    fs::write(&path, dot::render(graph)).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

fn write_bank<T: Serialize>(
    directory: &Path,
    base_name: &str,
    bank: &str,
    value: &T,
    format: Format,
) -> Result<PathBuf> {
    let (extension, body) = match format {
        Format::Yaml => ("yaml", serde_yaml::to_string(value)?),
        Format::Json => {
            let mut body = serde_json::to_string_pretty(value)?;
            body.push('\n');
            ("json", body)
        }
        Format::Text => unreachable!("text export is a single document"),
    };
    let path = directory.join(format!("{base_name}_{bank}.{extension}"));
    fs::write(&path, body).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::live::{LiveCapture, LiveNode, LiveTopic, TopicRole};
    use crate::reconcile;
    use crate::spec::SpecFile;

    fn sample_model() -> Model {
        let spec: SpecFile = serde_json::from_str(
            r#"{
                "nodes": [{
                    "name": "/talker",
                    "publishes": [{ "name": "/chatter", "construct_type": "std_msgs/String" }]
                }]
            }"#,
        )
        .unwrap();
        let spec = spec.validate_and_build().unwrap();
        let live = LiveCapture {
            nodes: vec![LiveNode {
                name: "/talker".to_string(),
                topics: vec![LiveTopic {
                    name: "/chatter".to_string(),
                    construct_type: "std_msgs/String".to_string(),
                    role: TopicRole::Publish,
                }],
                ..LiveNode::default()
            }],
        };
        reconcile::reconcile(&spec, &live, &Config::default()).unwrap()
    }

    #[test]
    fn writes_one_file_per_bank_and_is_deterministic() {
        let model = sample_model();
        let dir = tempfile::tempdir().unwrap();
        let dir_path = dir.path().to_str().unwrap();

        let written = write_model(&model, dir_path, "snap", &[Format::Yaml]).unwrap();
        assert!(
            written
                .iter()
                .any(|p| p.file_name().unwrap() == "snap_nodes.yaml")
        );
        assert!(
            written
                .iter()
                .any(|p| p.file_name().unwrap() == "snap_diagnostics.yaml")
        );

        let first = fs::read_to_string(dir.path().join("snap_nodes.yaml")).unwrap();
        write_model(&model, dir_path, "snap", &[Format::Yaml]).unwrap();
        let second = fs::read_to_string(dir.path().join("snap_nodes.yaml")).unwrap();
        assert_eq!(first, second);
        assert!(first.contains("/talker"));
    }

    #[test]
    fn dot_file_lands_next_to_the_banks() {
        let model = sample_model();
        let graph = Graph::build(&model);
        let dir = tempfile::tempdir().unwrap();

        let path = write_graph_dot(&graph, dir.path().to_str().unwrap(), "snap").unwrap();
        assert_eq!(path.file_name().unwrap(), "snap_graph.dot");
        let body = fs::read_to_string(path).unwrap();
        assert!(body.contains("digraph deployment {"));
    }
}
