//! Graph builder: a derived, read-only node/edge view over a model.
//!
//! Edges come in two kinds. A topic edge collapses every
//! publisher/subscriber pair on one topic into a single edge annotated
//! with participant counts. An action edge represents a grouped
//! aggregate's full topic set as one relation with per-endpoint roles;
//! a partially observed aggregate keeps its edge, flagged, rather than
//! being omitted. Nodes and edges are ordered by qualified name so the
//! same model always renders the same graph.

use crate::model::{MatchStatus, Model, QualifiedName, TopicKey};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Serialize)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphNode {
    pub name: QualifiedName,
    pub validated: bool,
    pub match_status: MatchStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum GraphEdge {
    Topic(TopicEdge),
    Action(ActionEdge),
}

impl GraphEdge {
    /// Ordering key: topic name or action base name.
    pub fn name(&self) -> &str {
        match self {
            GraphEdge::Topic(edge) => &edge.topic,
            GraphEdge::Action(edge) => &edge.action,
        }
    }
}

/// One edge per topic, multiplicity collapsed into participant counts.
#[derive(Debug, Clone, Serialize)]
pub struct TopicEdge {
    pub topic: String,
    pub construct_type: String,
    pub publishers: Vec<QualifiedName>,
    pub subscribers: Vec<QualifiedName>,
    pub participants: usize,
}

/// One edge per grouped action aggregate.
#[derive(Debug, Clone, Serialize)]
pub struct ActionEdge {
    pub action: String,
    pub construct_type: Option<String>,
    pub servers: Vec<QualifiedName>,
    pub clients: Vec<QualifiedName>,
    /// Some member topics were observed, some are missing.
    pub partial: bool,
    pub missing_suffixes: Vec<String>,
}

impl Graph {
    /// Derive the graph from a reconciled model.
    pub fn build(model: &Model) -> Self {
        let nodes: Vec<GraphNode> = model
            .nodes
            .values()
            .map(|node| GraphNode {
                name: node.name.clone(),
                validated: node.validated,
                match_status: node.match_status,
            })
            .collect();

        // Topics consumed by an aggregate never appear standalone.
        let consumed: BTreeSet<&TopicKey> = model
            .actions
            .values()
            .flat_map(|action| action.topics.values())
            .collect();

        let mut edges: Vec<GraphEdge> = Vec::new();
        for (key, topic) in &model.topics {
            if consumed.contains(key) {
                continue;
            }
            edges.push(GraphEdge::Topic(TopicEdge {
                topic: topic.name.clone(),
                construct_type: topic.construct_type.clone(),
                publishers: topic.publishers.iter().cloned().collect(),
                subscribers: topic.subscribers.iter().cloned().collect(),
                participants: topic.publishers.len() + topic.subscribers.len(),
            }));
        }
        for action in model.actions.values() {
            edges.push(GraphEdge::Action(ActionEdge {
                action: action.name.clone(),
                construct_type: action.construct_type.clone(),
                servers: action.servers.iter().cloned().collect(),
                clients: action.clients.iter().cloned().collect(),
                partial: action.is_partial(),
                missing_suffixes: action.missing_suffixes.clone(),
            }));
        }
        edges.sort_by(|a, b| a.name().cmp(b.name()));

        Graph { nodes, edges }
    }
}
