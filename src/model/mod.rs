//! Entity metamodel: the reconciled picture of one deployment.
//!
//! Pure data plus invariants, no I/O. The reconciliation engine is the
//! only writer of validation and attribution fields; once it hands a
//! [`Model`] out, the graph builder and exporters treat it as read-only.

pub mod name;

pub use name::QualifiedName;

use crate::error::SnapshotError;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Node,
    Topic,
    Service,
    Action,
    Package,
    Type,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::Node => "node",
            EntityKind::Topic => "topic",
            EntityKind::Service => "service",
            EntityKind::Action => "action",
            EntityKind::Package => "package",
            EntityKind::Type => "type",
        };
        f.write_str(label)
    }
}

/// Where a node landed in the match passes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum MatchStatus {
    /// Declared in the static spec, never observed live.
    DeclaredOnly,
    /// Live record matched a static declaration by exact qualified name.
    Exact,
    /// Live record matched a static declaration above the similarity
    /// threshold.
    Fuzzy { score: f64 },
    /// Observed live with no static counterpart.
    LiveOnly,
}

/// Validation summary exposed to exporters through [`Entity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    /// Static declaration confirmed by live discovery.
    Validated,
    /// Declared or observed, but the two sides never met.
    Unvalidated,
    /// Observed with an incomplete structure (partial action topic set).
    Partial,
}

/// OS process attributed to a node by the reconciliation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessInfo {
    pub pid: u32,
    pub cmdline: Vec<String>,
}

/// Hosting role of a node within a shared process container.
///
/// The manager/component relation is a back-reference by name in both
/// directions, never an ownership link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "role")]
pub enum NodeKind {
    Plain,
    ComponentManager { components: Vec<QualifiedName> },
    Component { manager: QualifiedName },
}

#[derive(Debug, Clone, Serialize)]
pub struct Node {
    pub name: QualifiedName,
    /// Owning package; live-only nodes have none.
    pub package: Option<String>,
    pub kind: NodeKind,
    /// Published topic name to message type.
    pub publishes: BTreeMap<String, String>,
    /// Subscribed topic name to message type.
    pub subscribes: BTreeMap<String, String>,
    /// Provided service name to service type.
    pub provides: BTreeMap<String, String>,
    /// Called service name to service type.
    pub calls: BTreeMap<String, String>,
    pub action_servers: BTreeSet<String>,
    pub action_clients: BTreeSet<String>,
    /// True iff the engine matched this node to a live record.
    pub validated: bool,
    pub match_status: MatchStatus,
    pub process: Option<ProcessInfo>,
}

impl Node {
    pub fn new(name: QualifiedName) -> Self {
        Self {
            name,
            package: None,
            kind: NodeKind::Plain,
            publishes: BTreeMap::new(),
            subscribes: BTreeMap::new(),
            provides: BTreeMap::new(),
            calls: BTreeMap::new(),
            action_servers: BTreeSet::new(),
            action_clients: BTreeSet::new(),
            validated: false,
            match_status: MatchStatus::DeclaredOnly,
            process: None,
        }
    }
}

/// Identity key for topics: the (name, message type) pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct TopicKey {
    pub name: String,
    pub construct_type: String,
}

impl TopicKey {
    pub fn new(name: &str, construct_type: &str) -> Self {
        Self {
            name: name.to_string(),
            construct_type: construct_type.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Topic {
    pub name: String,
    pub construct_type: String,
    pub publishers: BTreeSet<QualifiedName>,
    pub subscribers: BTreeSet<QualifiedName>,
    /// True iff the topic was both declared statically and observed live.
    pub validated: bool,
}

impl Topic {
    pub fn key(&self) -> TopicKey {
        TopicKey::new(&self.name, &self.construct_type)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Service {
    pub name: String,
    pub construct_type: String,
    pub providers: BTreeSet<QualifiedName>,
    pub clients: BTreeSet<QualifiedName>,
    pub validated: bool,
}

/// Grouped action aggregate: one logical relation covering the full
/// goal/cancel/feedback/status/result topic set.
#[derive(Debug, Clone, Serialize)]
pub struct Action {
    pub name: String,
    pub construct_type: Option<String>,
    pub servers: BTreeSet<QualifiedName>,
    pub clients: BTreeSet<QualifiedName>,
    /// Member topics keyed by suffix ("goal", "feedback", ...).
    pub topics: BTreeMap<String, TopicKey>,
    /// Suffixes absent from the observed set; empty means complete.
    pub missing_suffixes: Vec<String>,
}

impl Action {
    /// Partially observed: some member topics seen, some missing.
    pub fn is_partial(&self) -> bool {
        !self.topics.is_empty() && !self.missing_suffixes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    pub construct_type: String,
}

/// Structural descriptor for a message type.
#[derive(Debug, Clone, Serialize)]
pub struct MessageType {
    pub name: String,
    pub package: Option<String>,
    pub fields: Vec<Field>,
}

/// Structural descriptor for a service type: request/response field sets.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceType {
    pub name: String,
    pub package: Option<String>,
    pub request: Vec<Field>,
    pub response: Vec<Field>,
}

/// Structural descriptor for an action type: goal/feedback/result sets.
#[derive(Debug, Clone, Serialize)]
pub struct ActionType {
    pub name: String,
    pub package: Option<String>,
    pub goal: Vec<Field>,
    pub feedback: Vec<Field>,
    pub result: Vec<Field>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Package {
    pub name: String,
    pub version: Option<String>,
    pub share_path: Option<String>,
    pub nodes: Vec<QualifiedName>,
    pub messages: Vec<String>,
    pub services: Vec<String>,
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Multiple fuzzy candidates tied above threshold.
    AmbiguousMatch,
    /// A live node matched no static declaration.
    UnmatchedNode,
    /// Candidate processes existed but none could be attributed.
    UnattributedProcess,
    /// An action base name with an incomplete suffix set.
    MalformedAction,
    /// A node appeared on inconsistent sides of an action's topics.
    InconsistentRole,
    /// Observed structure disagreed with the static declaration.
    RoleMismatch,
    /// Member topic types disagreed on the action type stem.
    TypeMismatch,
}

/// Per-entity note recorded instead of failing the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub entity: String,
    pub message: String,
}

/// The reconciled aggregate. Owns every entity exclusively; entities
/// never outlive their model.
#[derive(Debug, Default, Serialize)]
pub struct Model {
    pub nodes: BTreeMap<QualifiedName, Node>,
    #[serde(serialize_with = "topics_as_list")]
    pub topics: BTreeMap<TopicKey, Topic>,
    pub services: BTreeMap<String, Service>,
    pub actions: BTreeMap<String, Action>,
    pub packages: BTreeMap<String, Package>,
    pub messages: BTreeMap<String, MessageType>,
    pub service_types: BTreeMap<String, ServiceType>,
    pub action_types: BTreeMap<String, ActionType>,
    pub diagnostics: Vec<Diagnostic>,
}

fn topics_as_list<S>(topics: &BTreeMap<TopicKey, Topic>, ser: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    ser.collect_seq(topics.values())
}

impl Model {
    pub fn node(&self, name: &QualifiedName) -> Result<&Node, SnapshotError> {
        self.nodes.get(name).ok_or_else(|| SnapshotError::NotFound {
            kind: EntityKind::Node,
            name: name.to_string(),
        })
    }

    pub fn topic(&self, name: &str, construct_type: &str) -> Result<&Topic, SnapshotError> {
        self.topics
            .get(&TopicKey::new(name, construct_type))
            .ok_or_else(|| SnapshotError::NotFound {
                kind: EntityKind::Topic,
                name: name.to_string(),
            })
    }

    pub fn service(&self, name: &str) -> Result<&Service, SnapshotError> {
        self.services
            .get(name)
            .ok_or_else(|| SnapshotError::NotFound {
                kind: EntityKind::Service,
                name: name.to_string(),
            })
    }

    pub fn action(&self, name: &str) -> Result<&Action, SnapshotError> {
        self.actions
            .get(name)
            .ok_or_else(|| SnapshotError::NotFound {
                kind: EntityKind::Action,
                name: name.to_string(),
            })
    }

    /// Topics a node touches, resolved against this model.
    pub fn node_topics(&self, node: &Node) -> Vec<&Topic> {
        node.publishes
            .iter()
            .chain(node.subscribes.iter())
            .filter_map(|(name, ty)| self.topics.get(&TopicKey::new(name, ty)))
            .collect()
    }

    pub fn diagnose(&mut self, kind: DiagnosticKind, entity: &str, message: String) {
        self.diagnostics.push(Diagnostic {
            kind,
            entity: entity.to_string(),
            message,
        });
    }

    /// Check the no-dangling-reference invariant: every topic, service,
    /// and action role held by a node resolves within this model, and
    /// every topic endpoint points back at a known node.
    pub fn validate_references(&self) -> Result<(), SnapshotError> {
        for node in self.nodes.values() {
            for (name, ty) in node.publishes.iter().chain(node.subscribes.iter()) {
                self.topic(name, ty)?;
            }
            for name in node.provides.keys().chain(node.calls.keys()) {
                self.service(name)?;
            }
            for name in node.action_servers.iter().chain(node.action_clients.iter()) {
                self.action(name)?;
            }
        }
        for topic in self.topics.values() {
            for endpoint in topic.publishers.iter().chain(topic.subscribers.iter()) {
                self.node(endpoint)?;
            }
        }
        Ok(())
    }
}

/// Common capability surface for name-addressable entities; exporters
/// render status lines through it rather than matching on concrete types.
pub trait Entity {
    fn kind(&self) -> EntityKind;
    fn qualified_name(&self) -> &str;
    fn validation_status(&self) -> ValidationStatus;
}

impl Entity for Node {
    fn kind(&self) -> EntityKind {
        EntityKind::Node
    }

    fn qualified_name(&self) -> &str {
        self.name.as_str()
    }

    fn validation_status(&self) -> ValidationStatus {
        if self.validated {
            ValidationStatus::Validated
        } else {
            ValidationStatus::Unvalidated
        }
    }
}

impl Entity for Topic {
    fn kind(&self) -> EntityKind {
        EntityKind::Topic
    }

    fn qualified_name(&self) -> &str {
        &self.name
    }

    fn validation_status(&self) -> ValidationStatus {
        if self.validated {
            ValidationStatus::Validated
        } else {
            ValidationStatus::Unvalidated
        }
    }
}

impl Entity for Service {
    fn kind(&self) -> EntityKind {
        EntityKind::Service
    }

    fn qualified_name(&self) -> &str {
        &self.name
    }

    fn validation_status(&self) -> ValidationStatus {
        if self.validated {
            ValidationStatus::Validated
        } else {
            ValidationStatus::Unvalidated
        }
    }
}

impl Entity for Action {
    fn kind(&self) -> EntityKind {
        EntityKind::Action
    }

    fn qualified_name(&self) -> &str {
        &self.name
    }

    fn validation_status(&self) -> ValidationStatus {
        if self.is_partial() {
            ValidationStatus::Partial
        } else if self.topics.is_empty() {
            ValidationStatus::Unvalidated
        } else {
            ValidationStatus::Validated
        }
    }
}
