//! Static spec layer: serde shapes for the workspace spec file plus the
//! validated in-memory structures the reconciliation engine consumes.
//!
//! The spec file is produced by an external workspace crawler and
//! describes everything that *could* run. JSON shape (YAML is accepted
//! with the same field names):
//!
//! {
//!   "packages": [
//!     { "name": "demo_pkg", "version": "1.2.0", "nodes": ["/talker"] }
//!   ],
//!   "nodes": [
//!     {
//!       "name": "/talker",
//!       "package": "demo_pkg",
//!       "publishes": [{ "name": "/chatter", "construct_type": "std_msgs/String" }],
//!       "provides": [{ "name": "/talker/describe", "construct_type": "demo_pkg/Describe" }],
//!       "action_clients": ["/fibonacci"]
//!     }
//!   ],
//!   "messages": [
//!     { "name": "std_msgs/String", "fields": [{ "name": "data", "construct_type": "string" }] }
//!   ]
//! }
//!
//! We keep two representations: `Raw*` (serde-friendly input) and the
//! validated `StaticSpec` (unique names, resolved references).

use crate::Result;
use crate::model::{
    ActionType, Field, MessageType, NodeKind, Package, QualifiedName, ServiceType,
};
use anyhow::{Context, bail};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpecFile {
    #[serde(default)]
    pub packages: Vec<RawPackage>,

    #[serde(default)]
    pub nodes: Vec<RawNodeSpec>,

    #[serde(default)]
    pub messages: Vec<RawMessageType>,

    #[serde(default)]
    pub services: Vec<RawServiceType>,

    #[serde(default)]
    pub actions: Vec<RawActionType>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPackage {
    pub name: String,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub share_path: Option<String>,

    #[serde(default)]
    pub nodes: Vec<String>,

    #[serde(default)]
    pub messages: Vec<String>,

    #[serde(default)]
    pub services: Vec<String>,

    #[serde(default)]
    pub actions: Vec<String>,
}

/// Raw node shape as it appears in the spec file.
#[derive(Debug, Clone, Deserialize)]
pub struct RawNodeSpec {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub package: Option<String>,

    #[serde(default)]
    pub publishes: Vec<RawTopicRef>,

    #[serde(default)]
    pub subscribes: Vec<RawTopicRef>,

    #[serde(default)]
    pub provides: Vec<RawServiceRef>,

    #[serde(default)]
    pub calls: Vec<RawServiceRef>,

    #[serde(default)]
    pub action_servers: Vec<String>,

    #[serde(default)]
    pub action_clients: Vec<String>,

    /// Component names hosted by this node's process container.
    #[serde(default)]
    pub components: Vec<String>,

    /// Manager node for a composable component.
    #[serde(default)]
    pub manager: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTopicRef {
    pub name: String,
    pub construct_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawServiceRef {
    pub name: String,
    pub construct_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawField {
    pub name: String,
    pub construct_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMessageType {
    pub name: String,

    #[serde(default)]
    pub package: Option<String>,

    #[serde(default)]
    pub fields: Vec<RawField>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawServiceType {
    pub name: String,

    #[serde(default)]
    pub package: Option<String>,

    #[serde(default)]
    pub request: Vec<RawField>,

    #[serde(default)]
    pub response: Vec<RawField>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawActionType {
    pub name: String,

    #[serde(default)]
    pub package: Option<String>,

    #[serde(default)]
    pub goal: Vec<RawField>,

    #[serde(default)]
    pub feedback: Vec<RawField>,

    #[serde(default)]
    pub result: Vec<RawField>,
}

/// Flattened, validated node declaration ready for reconciliation.
#[derive(Debug, Clone)]
pub struct NodeSpec {
    pub name: QualifiedName,
    pub package: Option<String>,
    pub kind: NodeKind,
    pub publishes: BTreeMap<String, String>,
    pub subscribes: BTreeMap<String, String>,
    pub provides: BTreeMap<String, String>,
    pub calls: BTreeMap<String, String>,
    pub action_servers: BTreeSet<String>,
    pub action_clients: BTreeSet<String>,
}

/// Validated static spec: everything the workspace declares.
#[derive(Debug, Clone, Default)]
pub struct StaticSpec {
    pub packages: BTreeMap<String, Package>,
    pub nodes: BTreeMap<QualifiedName, NodeSpec>,
    pub messages: BTreeMap<String, MessageType>,
    pub service_types: BTreeMap<String, ServiceType>,
    pub action_types: BTreeMap<String, ActionType>,
}

/// Read a spec file, dispatching on extension (.yaml/.yml vs JSON).
pub fn load(path: &str) -> Result<StaticSpec> {
    let text = fs::read_to_string(path).with_context(|| format!("read spec file {}", path))?;
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    let raw: SpecFile = if matches!(ext, "yaml" | "yml") {
        serde_yaml::from_str(&text).with_context(|| format!("parse spec file {}", path))?
    } else {
        serde_json::from_str(&text).with_context(|| format!("parse spec file {}", path))?
    };
    raw.validate_and_build()
}

impl SpecFile {
    /// Flatten all declarations, ensure unique names, and resolve
    /// cross-references (package membership, component hosting).
    pub fn validate_and_build(&self) -> Result<StaticSpec> {
        // 1) Unique node names.
        let mut nodes = BTreeMap::<QualifiedName, NodeSpec>::new();
        for raw in &self.nodes {
            if raw.name.trim().is_empty() {
                bail!("spec node with empty name");
            }
            let name = QualifiedName::new(&raw.name);
            if nodes.contains_key(&name) {
                bail!("duplicate node name in spec: {}", name);
            }

            let kind = match (&raw.manager, raw.components.is_empty()) {
                (Some(_), false) => {
                    bail!("node {} is both a component and a component manager", name)
                }
                (Some(manager), true) => NodeKind::Component {
                    manager: QualifiedName::new(manager),
                },
                (None, false) => NodeKind::ComponentManager {
                    components: raw.components.iter().map(|c| QualifiedName::new(c)).collect(),
                },
                (None, true) => NodeKind::Plain,
            };

            nodes.insert(
                name.clone(),
                NodeSpec {
                    name,
                    package: raw.package.clone(),
                    kind,
                    publishes: topic_map(&raw.publishes, "publishes", &raw.name)?,
                    subscribes: topic_map(&raw.subscribes, "subscribes", &raw.name)?,
                    provides: service_map(&raw.provides, "provides", &raw.name)?,
                    calls: service_map(&raw.calls, "calls", &raw.name)?,
                    action_servers: raw.action_servers.iter().cloned().collect(),
                    action_clients: raw.action_clients.iter().cloned().collect(),
                },
            );
        }

        // 2) Component hosting references must resolve.
        for node in nodes.values() {
            match &node.kind {
                NodeKind::Component { manager } => {
                    if !nodes.contains_key(manager) {
                        bail!("node {} references unknown manager {}", node.name, manager);
                    }
                }
                NodeKind::ComponentManager { components } => {
                    for component in components {
                        if !nodes.contains_key(component) {
                            bail!(
                                "manager {} references unknown component {}",
                                node.name,
                                component
                            );
                        }
                    }
                }
                NodeKind::Plain => {}
            }
        }

        // 3) Packages: unique names, declared nodes must exist.
        let mut packages = BTreeMap::<String, Package>::new();
        for raw in &self.packages {
            if packages.contains_key(&raw.name) {
                bail!("duplicate package name in spec: {}", raw.name);
            }
            let mut members = Vec::new();
            for node in &raw.nodes {
                let qn = QualifiedName::new(node);
                if !nodes.contains_key(&qn) {
                    bail!("package {} references unknown node {}", raw.name, node);
                }
                members.push(qn);
            }
            packages.insert(
                raw.name.clone(),
                Package {
                    name: raw.name.clone(),
                    version: raw.version.clone(),
                    share_path: raw.share_path.clone(),
                    nodes: members,
                    messages: raw.messages.clone(),
                    services: raw.services.clone(),
                    actions: raw.actions.clone(),
                },
            );
        }

        // 4) Type descriptors, keyed by fully qualified type name.
        let mut messages = BTreeMap::new();
        for raw in &self.messages {
            if messages.contains_key(&raw.name) {
                bail!("duplicate message type in spec: {}", raw.name);
            }
            messages.insert(
                raw.name.clone(),
                MessageType {
                    name: raw.name.clone(),
                    package: raw.package.clone(),
                    fields: fields(&raw.fields),
                },
            );
        }

        let mut service_types = BTreeMap::new();
        for raw in &self.services {
            if service_types.contains_key(&raw.name) {
                bail!("duplicate service type in spec: {}", raw.name);
            }
            service_types.insert(
                raw.name.clone(),
                ServiceType {
                    name: raw.name.clone(),
                    package: raw.package.clone(),
                    request: fields(&raw.request),
                    response: fields(&raw.response),
                },
            );
        }

        let mut action_types = BTreeMap::new();
        for raw in &self.actions {
            if action_types.contains_key(&raw.name) {
                bail!("duplicate action type in spec: {}", raw.name);
            }
            action_types.insert(
                raw.name.clone(),
                ActionType {
                    name: raw.name.clone(),
                    package: raw.package.clone(),
                    goal: fields(&raw.goal),
                    feedback: fields(&raw.feedback),
                    result: fields(&raw.result),
                },
            );
        }

        Ok(StaticSpec {
            packages,
            nodes,
            messages,
            service_types,
            action_types,
        })
    }
}

fn topic_map(refs: &[RawTopicRef], role: &str, node: &str) -> Result<BTreeMap<String, String>> {
    let mut out = BTreeMap::new();
    for r in refs {
        if out
            .insert(r.name.clone(), r.construct_type.clone())
            .is_some()
        {
            bail!("node {} lists topic {} twice under {}", node, r.name, role);
        }
    }
    Ok(out)
}

fn service_map(refs: &[RawServiceRef], role: &str, node: &str) -> Result<BTreeMap<String, String>> {
    let mut out = BTreeMap::new();
    for r in refs {
        if out
            .insert(r.name.clone(), r.construct_type.clone())
            .is_some()
        {
            bail!("node {} lists service {} twice under {}", node, r.name, role);
        }
    }
    Ok(out)
}

fn fields(raw: &[RawField]) -> Vec<Field> {
    raw.iter()
        .map(|f| Field {
            name: f.name.clone(),
            construct_type: f.construct_type.clone(),
        })
        .collect()
}
