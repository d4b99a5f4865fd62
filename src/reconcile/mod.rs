//! Reconciliation engine.
//!
//! Joins the static spec against a live capture into one [`Model`].
//! Pass order matters and mirrors the ambiguity ladder: exact name
//! match, then fuzzy match over the remaining declarations, then process
//! attribution, then the leftover static declarations, then action
//! grouping over the assembled topic set. A single unmatched or
//! ambiguous entity never aborts the run; it is recorded on the model.
//! Only structurally corrupt input stops the pass.

pub mod actions;
pub mod process;
pub mod score;

use crate::config::Config;
use crate::error::SnapshotError;
use crate::live::{LiveCapture, LiveNode, ActionRole, ServiceRole, TopicRole};
use crate::model::{
    Action, DiagnosticKind, MatchStatus, Model, Node, QualifiedName, Service, Topic, TopicKey,
};
use crate::reconcile::process::Attribution;
use crate::reconcile::score::MatchOutcome;
use crate::spec::{NodeSpec, StaticSpec};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Reconcile static declarations with a live capture.
pub fn reconcile(
    spec: &StaticSpec,
    live: &LiveCapture,
    cfg: &Config,
) -> Result<Model, SnapshotError> {
    live.validate()?;

    let mut model = Model::default();

    // Deterministic pass order: live records sorted by node name.
    let mut live_nodes: Vec<&LiveNode> = live
        .nodes
        .iter()
        .filter(|n| !cfg.exclude_nodes.contains(QualifiedName::new(&n.name).as_str()))
        .collect();
    live_nodes.sort_by(|a, b| a.name.cmp(&b.name));

    // Passes 1-2: exact match, then fuzzy match over what remains.
    let mut matched_statics: BTreeSet<QualifiedName> = BTreeSet::new();
    struct Placement<'a> {
        live: &'a LiveNode,
        status: MatchStatus,
        spec_node: Option<&'a NodeSpec>,
    }
    let mut placements: Vec<Placement<'_>> = Vec::new();

    for &ln in &live_nodes {
        let qn = QualifiedName::new(&ln.name);
        if let Some(spec_node) = spec.nodes.get(&qn) {
            matched_statics.insert(qn);
            placements.push(Placement {
                live: ln,
                status: MatchStatus::Exact,
                spec_node: Some(spec_node),
            });
            continue;
        }

        let remaining = spec.nodes.keys().filter(|k| !matched_statics.contains(*k));
        match score::best_match(&ln.name, remaining, cfg) {
            MatchOutcome::Accepted { name, score } => {
                debug!(live = %ln.name, declared = %name, score, "fuzzy match accepted");
                let spec_node = &spec.nodes[&name];
                matched_statics.insert(name);
                placements.push(Placement {
                    live: ln,
                    status: MatchStatus::Fuzzy { score },
                    spec_node: Some(spec_node),
                });
            }
            MatchOutcome::Tie { score, candidates } => {
                let list: Vec<&str> = candidates.iter().map(|c| c.as_str()).collect();
                model.diagnose(
                    DiagnosticKind::AmbiguousMatch,
                    &ln.name,
                    format!(
                        "fuzzy candidates tied at {:.2}: {}",
                        score,
                        list.join(", ")
                    ),
                );
                placements.push(Placement {
                    live: ln,
                    status: MatchStatus::LiveOnly,
                    spec_node: None,
                });
            }
            MatchOutcome::BelowThreshold => {
                model.diagnose(
                    DiagnosticKind::UnmatchedNode,
                    &ln.name,
                    "no static declaration matched".to_string(),
                );
                placements.push(Placement {
                    live: ln,
                    status: MatchStatus::LiveOnly,
                    spec_node: None,
                });
            }
        }
    }

    // Pass 3: materialize matched and live-only nodes, attribute processes.
    for placement in placements {
        let (mut node, name) = match placement.spec_node {
            Some(spec_node) => {
                // Roles come from the declaration; reconciliation never
                // fabricates them. Live disagreements are reported.
                for mismatch in live_role_mismatches(spec_node, placement.live, cfg) {
                    model.diagnose(DiagnosticKind::RoleMismatch, spec_node.name.as_str(), mismatch);
                }
                let mut node = node_from_spec(spec_node, cfg);
                node.validated = true;
                node.match_status = placement.status;
                let name = spec_node.name.clone();
                (node, name)
            }
            None => {
                let name = QualifiedName::new(&placement.live.name);
                let node = node_from_live(name.clone(), placement.live, cfg);
                (node, name)
            }
        };

        match process::attribute(&name, &placement.live.candidate_processes, cfg) {
            Attribution::Attributed(info) => node.process = Some(info),
            Attribution::Unattributed { note } => {
                if !note.is_empty() {
                    model.diagnose(DiagnosticKind::UnattributedProcess, name.as_str(), note);
                }
            }
        }

        model.nodes.insert(name, node);
    }

    // Pass 4: static declarations never observed live.
    for (name, spec_node) in &spec.nodes {
        if matched_statics.contains(name) || cfg.exclude_nodes.contains(name.as_str()) {
            continue;
        }
        model.nodes.insert(name.clone(), node_from_spec(spec_node, cfg));
    }

    // Topic and service banks derive from the reconciled node roles, so
    // every reference resolves by construction.
    let declared_topics: BTreeSet<&String> = spec
        .nodes
        .values()
        .flat_map(|n| n.publishes.keys().chain(n.subscribes.keys()))
        .collect();
    let observed_topics: BTreeSet<&String> = live_nodes
        .iter()
        .flat_map(|n| n.topics.iter().map(|t| &t.name))
        .collect();
    build_topics(&mut model, &declared_topics, &observed_topics);

    let declared_services: BTreeSet<&String> = spec
        .nodes
        .values()
        .flat_map(|n| n.provides.keys().chain(n.calls.keys()))
        .collect();
    let observed_services: BTreeSet<&String> = live_nodes
        .iter()
        .flat_map(|n| n.services.iter().map(|s| &s.name))
        .collect();
    build_services(&mut model, &declared_services, &observed_services);

    // Pass 5: action grouping over the assembled topic set.
    for grouped in actions::group_actions(&model.topics) {
        for (kind, message) in &grouped.notes {
            model.diagnose(*kind, &grouped.name, message.clone());
        }
        model.actions.insert(
            grouped.name.clone(),
            Action {
                name: grouped.name,
                construct_type: grouped.construct_type,
                servers: grouped.servers,
                clients: grouped.clients,
                topics: grouped.topics,
                missing_suffixes: grouped.missing_suffixes,
            },
        );
    }
    merge_declared_action_roles(&mut model);

    // The spec banks carry over untouched.
    model.packages = spec.packages.clone();
    model.messages = spec.messages.clone();
    model.service_types = spec.service_types.clone();
    model.action_types = spec.action_types.clone();

    debug_assert!(model.validate_references().is_ok());

    let validated = model.nodes.values().filter(|n| n.validated).count();
    info!(
        nodes = model.nodes.len(),
        validated,
        topics = model.topics.len(),
        services = model.services.len(),
        actions = model.actions.len(),
        diagnostics = model.diagnostics.len(),
        "reconciliation complete"
    );

    Ok(model)
}

/// Build a node entity from its static declaration (filters applied).
fn node_from_spec(spec_node: &NodeSpec, cfg: &Config) -> Node {
    let mut node = Node::new(spec_node.name.clone());
    node.package = spec_node.package.clone();
    node.kind = spec_node.kind.clone();
    node.publishes = filter_topics(&spec_node.publishes, cfg);
    node.subscribes = filter_topics(&spec_node.subscribes, cfg);
    node.provides = filter_services(&spec_node.provides, cfg);
    node.calls = filter_services(&spec_node.calls, cfg);
    node.action_servers = normalize_action_names(&spec_node.action_servers);
    node.action_clients = normalize_action_names(&spec_node.action_clients);
    node
}

/// Build a live-only node entity from its discovery record.
fn node_from_live(name: QualifiedName, live: &LiveNode, cfg: &Config) -> Node {
    let mut node = Node::new(name);
    node.match_status = MatchStatus::LiveOnly;
    for topic in &live.topics {
        if cfg.exclude_topics.contains(&topic.name) {
            continue;
        }
        let target = match topic.role {
            TopicRole::Publish => &mut node.publishes,
            TopicRole::Subscribe => &mut node.subscribes,
        };
        target.insert(topic.name.clone(), topic.construct_type.clone());
    }
    for service in &live.services {
        if cfg.exclude_service_types.contains(&service.construct_type) {
            continue;
        }
        let target = match service.role {
            ServiceRole::Server => &mut node.provides,
            ServiceRole::Client => &mut node.calls,
        };
        target.insert(service.name.clone(), service.construct_type.clone());
    }
    for action in &live.actions {
        let name = QualifiedName::new(&action.name).as_str().to_string();
        match action.role {
            ActionRole::Server => node.action_servers.insert(name),
            ActionRole::Client => node.action_clients.insert(name),
        };
    }
    node
}

fn filter_topics(roles: &BTreeMap<String, String>, cfg: &Config) -> BTreeMap<String, String> {
    roles
        .iter()
        .filter(|(name, _)| !cfg.exclude_topics.contains(*name))
        .map(|(name, ty)| (name.clone(), ty.clone()))
        .collect()
}

fn filter_services(roles: &BTreeMap<String, String>, cfg: &Config) -> BTreeMap<String, String> {
    roles
        .iter()
        .filter(|(_, ty)| !cfg.exclude_service_types.contains(*ty))
        .map(|(name, ty)| (name.clone(), ty.clone()))
        .collect()
}

fn normalize_action_names(names: &BTreeSet<String>) -> BTreeSet<String> {
    names
        .iter()
        .map(|n| QualifiedName::new(n).as_str().to_string())
        .collect()
}

/// Roles observed live that the declaration does not cover.
fn live_role_mismatches(spec_node: &NodeSpec, live: &LiveNode, cfg: &Config) -> Vec<String> {
    let mut mismatches = Vec::new();
    for topic in &live.topics {
        if cfg.exclude_topics.contains(&topic.name) {
            continue;
        }
        let (declared, role) = match topic.role {
            TopicRole::Publish => (&spec_node.publishes, "publishes"),
            TopicRole::Subscribe => (&spec_node.subscribes, "subscribes"),
        };
        match declared.get(&topic.name) {
            Some(ty) if *ty == topic.construct_type => {}
            Some(ty) => mismatches.push(format!(
                "{} {} with live type {} but declared type {}",
                role, topic.name, topic.construct_type, ty
            )),
            None => mismatches.push(format!(
                "{} {} which the declaration does not list",
                role, topic.name
            )),
        }
    }
    for service in &live.services {
        if cfg.exclude_service_types.contains(&service.construct_type) {
            continue;
        }
        let (declared, role) = match service.role {
            ServiceRole::Server => (&spec_node.provides, "provides"),
            ServiceRole::Client => (&spec_node.calls, "calls"),
        };
        match declared.get(&service.name) {
            Some(ty) if *ty == service.construct_type => {}
            Some(ty) => mismatches.push(format!(
                "{} {} with live type {} but declared type {}",
                role, service.name, service.construct_type, ty
            )),
            None => mismatches.push(format!(
                "{} {} which the declaration does not list",
                role, service.name
            )),
        }
    }
    for action in &live.actions {
        let name = QualifiedName::new(&action.name).as_str().to_string();
        let (declared, role) = match action.role {
            ActionRole::Server => (&spec_node.action_servers, "serves action"),
            ActionRole::Client => (&spec_node.action_clients, "calls action"),
        };
        if !normalize_action_names(declared).contains(&name) {
            mismatches.push(format!(
                "{} {} which the declaration does not list",
                role, name
            ));
        }
    }
    mismatches
}

fn build_topics(
    model: &mut Model,
    declared: &BTreeSet<&String>,
    observed: &BTreeSet<&String>,
) {
    let mut topics: BTreeMap<TopicKey, Topic> = BTreeMap::new();
    for node in model.nodes.values() {
        for (name, ty) in &node.publishes {
            let entry = topics
                .entry(TopicKey::new(name, ty))
                .or_insert_with(|| empty_topic(name, ty));
            entry.publishers.insert(node.name.clone());
        }
        for (name, ty) in &node.subscribes {
            let entry = topics
                .entry(TopicKey::new(name, ty))
                .or_insert_with(|| empty_topic(name, ty));
            entry.subscribers.insert(node.name.clone());
        }
    }
    for topic in topics.values_mut() {
        topic.validated = declared.contains(&topic.name) && observed.contains(&topic.name);
    }
    model.topics = topics;
}

fn empty_topic(name: &str, construct_type: &str) -> Topic {
    Topic {
        name: name.to_string(),
        construct_type: construct_type.to_string(),
        publishers: BTreeSet::new(),
        subscribers: BTreeSet::new(),
        validated: false,
    }
}

fn build_services(
    model: &mut Model,
    declared: &BTreeSet<&String>,
    observed: &BTreeSet<&String>,
) {
    let mut services: BTreeMap<String, Service> = BTreeMap::new();
    let mut conflicts: Vec<(String, String)> = Vec::new();
    for node in model.nodes.values() {
        for (name, ty, provider) in node
            .provides
            .iter()
            .map(|(n, t)| (n, t, true))
            .chain(node.calls.iter().map(|(n, t)| (n, t, false)))
        {
            let entry = services.entry(name.clone()).or_insert_with(|| Service {
                name: name.clone(),
                construct_type: ty.clone(),
                providers: BTreeSet::new(),
                clients: BTreeSet::new(),
                validated: false,
            });
            if entry.construct_type != *ty {
                conflicts.push((
                    name.clone(),
                    format!(
                        "service {} seen with types {} and {}",
                        name, entry.construct_type, ty
                    ),
                ));
            }
            if provider {
                entry.providers.insert(node.name.clone());
            } else {
                entry.clients.insert(node.name.clone());
            }
        }
    }
    for service in services.values_mut() {
        service.validated = declared.contains(&service.name) && observed.contains(&service.name);
    }
    model.services = services;
    for (entity, message) in conflicts {
        model.diagnose(DiagnosticKind::TypeMismatch, &entity, message);
    }
}

/// Fold declared action roles into the grouped aggregates, creating a
/// declaration-only aggregate when no member topic is observed.
fn merge_declared_action_roles(model: &mut Model) {
    let mut memberships: Vec<(String, QualifiedName, bool)> = Vec::new();
    for node in model.nodes.values() {
        for action in &node.action_servers {
            memberships.push((action.clone(), node.name.clone(), true));
        }
        for action in &node.action_clients {
            memberships.push((action.clone(), node.name.clone(), false));
        }
    }
    for (action_name, node_name, server) in memberships {
        let action = model
            .actions
            .entry(action_name.clone())
            .or_insert_with(|| Action {
                name: action_name,
                construct_type: None,
                servers: BTreeSet::new(),
                clients: BTreeSet::new(),
                topics: BTreeMap::new(),
                missing_suffixes: actions::ACTION_SUFFIXES
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            });
        if server {
            action.servers.insert(node_name);
        } else {
            action.clients.insert(node_name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::{LiveAction, LiveProcess, LiveService, LiveTopic};
    use crate::model::Diagnostic;
    use crate::spec::SpecFile;
    use pretty_assertions::assert_eq;

    fn spec_from_json(json: &str) -> StaticSpec {
        let raw: SpecFile = serde_json::from_str(json).unwrap();
        raw.validate_and_build().unwrap()
    }

    fn live_topic(name: &str, ty: &str, role: TopicRole) -> LiveTopic {
        LiveTopic {
            name: name.to_string(),
            construct_type: ty.to_string(),
            role,
        }
    }

    fn talker_spec() -> StaticSpec {
        spec_from_json(
            r#"{
                "nodes": [{
                    "name": "/talker",
                    "package": "demo",
                    "publishes": [{ "name": "/chatter", "construct_type": "std_msgs/String" }]
                }],
                "packages": [{ "name": "demo", "nodes": ["/talker"] }]
            }"#,
        )
    }

    fn talker_live(node_name: &str) -> LiveCapture {
        LiveCapture {
            nodes: vec![LiveNode {
                name: node_name.to_string(),
                topics: vec![live_topic("/chatter", "std_msgs/String", TopicRole::Publish)],
                ..LiveNode::default()
            }],
        }
    }

    #[test]
    fn exact_match_validates_and_keeps_declared_roles() {
        let spec = talker_spec();
        let live = talker_live("/talker");
        let model = reconcile(&spec, &live, &Config::default()).unwrap();

        let talker = model.node(&QualifiedName::new("/talker")).unwrap();
        assert!(talker.validated);
        assert_eq!(talker.match_status, MatchStatus::Exact);
        assert_eq!(talker.package.as_deref(), Some("demo"));
        assert_eq!(
            talker.publishes,
            spec.nodes[&QualifiedName::new("/talker")].publishes
        );

        let chatter = model.topic("/chatter", "std_msgs/String").unwrap();
        assert!(chatter.validated);
        assert_eq!(chatter.publishers.len(), 1);
        assert_eq!(model.diagnostics, Vec::<Diagnostic>::new());
    }

    #[test]
    fn pid_suffixed_rename_fuzzy_matches_under_the_static_name() {
        let spec = talker_spec();
        let live = talker_live("talker_node_7342");
        let model = reconcile(&spec, &live, &Config::default()).unwrap();

        // The reconciled node keeps the declared qualified name.
        assert!(!model.nodes.contains_key(&QualifiedName::new("/talker_node_7342")));
        let talker = model.node(&QualifiedName::new("/talker")).unwrap();
        assert!(talker.validated);
        assert!(matches!(talker.match_status, MatchStatus::Fuzzy { .. }));
    }

    #[test]
    fn tied_candidates_leave_the_record_live_only() {
        let spec = spec_from_json(
            r#"{ "nodes": [{ "name": "/nodeA" }, { "name": "/nodeAB" }] }"#,
        );
        let live = LiveCapture {
            nodes: vec![LiveNode {
                name: "/nodeAB_proc".to_string(),
                ..LiveNode::default()
            }],
        };
        let model = reconcile(&spec, &live, &Config::default()).unwrap();

        // Neither static declaration is claimed.
        assert!(!model.node(&QualifiedName::new("/nodeA")).unwrap().validated);
        assert!(!model.node(&QualifiedName::new("/nodeAB")).unwrap().validated);

        let live_only = model.node(&QualifiedName::new("/nodeAB_proc")).unwrap();
        assert!(!live_only.validated);
        assert_eq!(live_only.match_status, MatchStatus::LiveOnly);
        assert!(
            model
                .diagnostics
                .iter()
                .any(|d| d.kind == DiagnosticKind::AmbiguousMatch)
        );
    }

    #[test]
    fn unmatched_statics_stay_declared_only() {
        let spec = spec_from_json(r#"{ "nodes": [{ "name": "/talker" }, { "name": "/camera_driver" }] }"#);
        let live = LiveCapture {
            nodes: vec![LiveNode {
                name: "/talker".to_string(),
                ..LiveNode::default()
            }],
        };
        let model = reconcile(&spec, &live, &Config::default()).unwrap();

        let camera = model.node(&QualifiedName::new("/camera_driver")).unwrap();
        assert!(!camera.validated);
        assert_eq!(camera.match_status, MatchStatus::DeclaredOnly);
        assert_eq!(camera.process, None);
    }

    #[test]
    fn mirror_capture_validates_everything_with_zero_diagnostics() {
        let spec = spec_from_json(
            r#"{
                "nodes": [
                    {
                        "name": "/talker",
                        "publishes": [{ "name": "/chatter", "construct_type": "std_msgs/String" }],
                        "provides": [{ "name": "/talker/describe", "construct_type": "demo/Describe" }]
                    },
                    {
                        "name": "/listener",
                        "subscribes": [{ "name": "/chatter", "construct_type": "std_msgs/String" }],
                        "calls": [{ "name": "/talker/describe", "construct_type": "demo/Describe" }]
                    }
                ]
            }"#,
        );
        let live = LiveCapture {
            nodes: vec![
                LiveNode {
                    name: "/talker".to_string(),
                    topics: vec![live_topic("/chatter", "std_msgs/String", TopicRole::Publish)],
                    services: vec![LiveService {
                        name: "/talker/describe".to_string(),
                        construct_type: "demo/Describe".to_string(),
                        role: ServiceRole::Server,
                    }],
                    ..LiveNode::default()
                },
                LiveNode {
                    name: "/listener".to_string(),
                    topics: vec![live_topic(
                        "/chatter",
                        "std_msgs/String",
                        TopicRole::Subscribe,
                    )],
                    services: vec![LiveService {
                        name: "/talker/describe".to_string(),
                        construct_type: "demo/Describe".to_string(),
                        role: ServiceRole::Client,
                    }],
                    ..LiveNode::default()
                },
            ],
        };
        let model = reconcile(&spec, &live, &Config::default()).unwrap();

        assert!(model.nodes.values().all(|n| n.validated));
        assert!(model.topics.values().all(|t| t.validated));
        assert!(model.services.values().all(|s| s.validated));
        assert_eq!(model.diagnostics, Vec::<Diagnostic>::new());
    }

    #[test]
    fn repeated_runs_reconcile_identically() {
        let spec = spec_from_json(
            r#"{ "nodes": [{ "name": "/nodeA" }, { "name": "/nodeAB" }, { "name": "/talker" }] }"#,
        );
        let live = LiveCapture {
            nodes: vec![
                LiveNode {
                    name: "/nodeAB_proc".to_string(),
                    ..LiveNode::default()
                },
                LiveNode {
                    name: "talker_node_7342".to_string(),
                    ..LiveNode::default()
                },
            ],
        };
        let cfg = Config::default();
        let first = reconcile(&spec, &live, &cfg).unwrap();
        for _ in 0..5 {
            let again = reconcile(&spec, &live, &cfg).unwrap();
            assert_eq!(
                serde_json::to_string(&again).unwrap(),
                serde_json::to_string(&first).unwrap()
            );
        }
    }

    #[test]
    fn missing_identity_aborts_the_pass() {
        let spec = talker_spec();
        let live = LiveCapture {
            nodes: vec![LiveNode::default()],
        };
        let err = reconcile(&spec, &live, &Config::default()).unwrap_err();
        assert_eq!(err, SnapshotError::MissingIdentity { index: 0 });
    }

    #[test]
    fn interpreter_process_attributes_through_the_script_token() {
        let spec = talker_spec();
        let mut live = talker_live("/talker");
        live.nodes[0].candidate_processes = vec![
            LiveProcess {
                pid: 17,
                cmdline: vec![
                    "/usr/bin/python3".to_string(),
                    "/opt/ws/lib/demo/talker.py".to_string(),
                ],
                reason: Some("python-path-hint".to_string()),
            },
            LiveProcess {
                pid: 18,
                cmdline: vec!["/usr/lib/daemon_helper".to_string()],
                reason: None,
            },
        ];
        let model = reconcile(&spec, &live, &Config::default()).unwrap();

        let talker = model.node(&QualifiedName::new("/talker")).unwrap();
        assert_eq!(talker.process.as_ref().map(|p| p.pid), Some(17));
        assert_eq!(model.diagnostics, Vec::<Diagnostic>::new());
    }

    #[test]
    fn unattributable_processes_are_reported_not_fatal() {
        let spec = talker_spec();
        let mut live = talker_live("/talker");
        live.nodes[0].candidate_processes = vec![LiveProcess {
            pid: 99,
            cmdline: vec!["/usr/lib/daemon_helper".to_string()],
            reason: None,
        }];
        let model = reconcile(&spec, &live, &Config::default()).unwrap();

        let talker = model.node(&QualifiedName::new("/talker")).unwrap();
        assert!(talker.validated);
        assert_eq!(talker.process, None);
        assert!(
            model
                .diagnostics
                .iter()
                .any(|d| d.kind == DiagnosticKind::UnattributedProcess)
        );
    }

    #[test]
    fn undeclared_live_roles_are_flagged_without_fabricating_them() {
        let spec = talker_spec();
        let mut live = talker_live("/talker");
        live.nodes[0]
            .topics
            .push(live_topic("/debug_stream", "std_msgs/String", TopicRole::Publish));
        let model = reconcile(&spec, &live, &Config::default()).unwrap();

        let talker = model.node(&QualifiedName::new("/talker")).unwrap();
        // The declaration stays authoritative for matched nodes.
        assert!(!talker.publishes.contains_key("/debug_stream"));
        assert!(
            model
                .diagnostics
                .iter()
                .any(|d| d.kind == DiagnosticKind::RoleMismatch && d.entity == "/talker")
        );
    }

    #[test]
    fn partial_action_lands_in_the_model_flagged() {
        let live = LiveCapture {
            nodes: vec![LiveNode {
                name: "/fib_server".to_string(),
                topics: vec![
                    live_topic(
                        "/fibonacci/goal",
                        "demo/FibonacciActionGoal",
                        TopicRole::Subscribe,
                    ),
                    live_topic(
                        "/fibonacci/feedback",
                        "demo/FibonacciActionFeedback",
                        TopicRole::Publish,
                    ),
                    live_topic(
                        "/fibonacci/result",
                        "demo/FibonacciActionResult",
                        TopicRole::Publish,
                    ),
                ],
                ..LiveNode::default()
            }],
        };
        let spec = SpecFile::default().validate_and_build().unwrap();
        let model = reconcile(&spec, &live, &Config::default()).unwrap();

        let action = model.action("/fibonacci").unwrap();
        assert!(action.is_partial());
        assert_eq!(action.missing_suffixes, vec!["cancel", "status"]);
        assert_eq!(action.construct_type.as_deref(), Some("demo/FibonacciAction"));
        assert!(
            model
                .diagnostics
                .iter()
                .any(|d| d.kind == DiagnosticKind::MalformedAction)
        );
    }

    #[test]
    fn declared_action_roles_join_the_aggregate() {
        let spec = spec_from_json(
            r#"{
                "nodes": [{ "name": "/planner", "action_clients": ["/fibonacci"] }]
            }"#,
        );
        let live = LiveCapture {
            nodes: vec![LiveNode {
                name: "/planner".to_string(),
                actions: vec![LiveAction {
                    name: "/fibonacci".to_string(),
                    construct_type: None,
                    role: ActionRole::Client,
                }],
                ..LiveNode::default()
            }],
        };
        let model = reconcile(&spec, &live, &Config::default()).unwrap();

        let action = model.action("/fibonacci").unwrap();
        assert!(action.clients.contains(&QualifiedName::new("/planner")));
        // Declaration-only aggregate: nothing observed, nothing flagged
        // as partial.
        assert!(!action.is_partial());
        assert!(model.validate_references().is_ok());
    }

    #[test]
    fn excluded_names_never_enter_the_model() {
        let spec = spec_from_json(
            r#"{
                "nodes": [{
                    "name": "/talker",
                    "publishes": [
                        { "name": "/chatter", "construct_type": "std_msgs/String" },
                        { "name": "/rosout", "construct_type": "rcl_interfaces/Log" }
                    ]
                }]
            }"#,
        );
        let mut live = talker_live("/talker");
        live.nodes[0]
            .topics
            .push(live_topic("/rosout", "rcl_interfaces/Log", TopicRole::Publish));
        let model = reconcile(&spec, &live, &Config::default()).unwrap();

        assert!(model.topic("/rosout", "rcl_interfaces/Log").is_err());
        let talker = model.node(&QualifiedName::new("/talker")).unwrap();
        assert!(!talker.publishes.contains_key("/rosout"));
        assert_eq!(model.diagnostics, Vec::<Diagnostic>::new());
    }
}
