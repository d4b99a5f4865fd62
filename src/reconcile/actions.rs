//! Action grouping.
//!
//! An action is not tagged in discovery data; it exists only as a
//! naming convention over topics: `<base>/goal`, `<base>/cancel`,
//! `<base>/feedback`, `<base>/status`, `<base>/result`. Grouping is a
//! pure fold over the topic set keyed by that suffix convention: the
//! per-base tally is built once and finalized once, with no mutation
//! visible outside the engine.

use crate::model::{DiagnosticKind, QualifiedName, Topic, TopicKey};
use std::collections::{BTreeMap, BTreeSet};

pub const ACTION_SUFFIXES: [&str; 5] = ["cancel", "feedback", "goal", "result", "status"];

/// Topics the client side publishes; the server side publishes the rest.
pub const CLIENT_PUBLISHED_SUFFIXES: [&str; 2] = ["cancel", "goal"];

/// Core member topics whose types carry the `<X>Action<Token>` stem.
const CORE_SUFFIX_TYPE_TOKENS: [(&str, &str); 3] =
    [("feedback", "Feedback"), ("goal", "Goal"), ("result", "Result")];

/// Split "/fibonacci/goal" into ("/fibonacci", "goal") when the suffix
/// belongs to the action convention.
pub fn split_action_topic(name: &str) -> Option<(&str, &str)> {
    let (base, suffix) = name.rsplit_once('/')?;
    if base.is_empty() {
        return None;
    }
    ACTION_SUFFIXES.contains(&suffix).then_some((base, suffix))
}

/// One grouped aggregate plus the notes the engine should record for it.
#[derive(Debug, Clone)]
pub struct GroupedAction {
    pub name: String,
    pub construct_type: Option<String>,
    pub servers: BTreeSet<QualifiedName>,
    pub clients: BTreeSet<QualifiedName>,
    pub topics: BTreeMap<String, TopicKey>,
    pub missing_suffixes: Vec<String>,
    pub notes: Vec<(DiagnosticKind, String)>,
}

/// Fold the topic set into per-base aggregates. Total and exclusive:
/// every topic whose name matches the convention lands in exactly one
/// aggregate.
pub fn group_actions(topics: &BTreeMap<TopicKey, Topic>) -> Vec<GroupedAction> {
    // Tally pass: base name to (suffix to member key).
    let mut tally: BTreeMap<String, BTreeMap<String, TopicKey>> = BTreeMap::new();
    let mut notes_by_base: BTreeMap<String, Vec<(DiagnosticKind, String)>> = BTreeMap::new();

    for key in topics.keys() {
        let Some((base, suffix)) = split_action_topic(&key.name) else {
            continue;
        };
        let members = tally.entry(base.to_string()).or_default();
        if let Some(existing) = members.get(suffix) {
            notes_by_base.entry(base.to_string()).or_default().push((
                DiagnosticKind::TypeMismatch,
                format!(
                    "topic {} appears with types {} and {}",
                    key.name, existing.construct_type, key.construct_type
                ),
            ));
            continue;
        }
        members.insert(suffix.to_string(), key.clone());
    }

    // Finalize pass.
    let mut grouped = Vec::new();
    for (base, members) in tally {
        let mut notes = notes_by_base.remove(&base).unwrap_or_default();

        let missing_suffixes: Vec<String> = ACTION_SUFFIXES
            .iter()
            .filter(|s| !members.contains_key(**s))
            .map(|s| s.to_string())
            .collect();
        if !missing_suffixes.is_empty() {
            notes.push((
                DiagnosticKind::MalformedAction,
                format!(
                    "action {} is missing member topics: {}",
                    base,
                    missing_suffixes.join(", ")
                ),
            ));
        }

        let (servers, clients, role_notes) = derive_roles(&base, &members, topics);
        notes.extend(role_notes);

        let (construct_type, type_notes) = derive_type(&base, &members);
        notes.extend(type_notes);

        grouped.push(GroupedAction {
            name: base,
            construct_type,
            servers,
            clients,
            topics: members,
            missing_suffixes,
            notes,
        });
    }
    grouped
}

type RoleSets = (
    BTreeSet<QualifiedName>,
    BTreeSet<QualifiedName>,
    Vec<(DiagnosticKind, String)>,
);

/// A node earns a role only when it sits on the expected side of every
/// member topic present; anything less is reported, not guessed.
fn derive_roles(
    base: &str,
    members: &BTreeMap<String, TopicKey>,
    topics: &BTreeMap<TopicKey, Topic>,
) -> RoleSets {
    let mut client_counts: BTreeMap<QualifiedName, usize> = BTreeMap::new();
    let mut server_counts: BTreeMap<QualifiedName, usize> = BTreeMap::new();

    for (suffix, key) in members {
        let Some(topic) = topics.get(key) else {
            continue;
        };
        let client_published = CLIENT_PUBLISHED_SUFFIXES.contains(&suffix.as_str());
        let (client_side, server_side) = if client_published {
            (&topic.publishers, &topic.subscribers)
        } else {
            (&topic.subscribers, &topic.publishers)
        };
        for node in client_side {
            *client_counts.entry(node.clone()).or_default() += 1;
        }
        for node in server_side {
            *server_counts.entry(node.clone()).or_default() += 1;
        }
    }

    let expected = members.len();
    let mut notes = Vec::new();
    let mut finalize = |counts: BTreeMap<QualifiedName, usize>, role: &str| {
        let mut full = BTreeSet::new();
        for (node, count) in counts {
            if count == expected {
                full.insert(node);
            } else {
                notes.push((
                    DiagnosticKind::InconsistentRole,
                    format!(
                        "node {} touches {} of {} member topics of action {} as {}",
                        node, count, expected, base, role
                    ),
                ));
            }
        }
        full
    };

    let clients = finalize(client_counts, "client");
    let servers = finalize(server_counts, "server");
    (servers, clients, notes)
}

/// Derive the action type from the core member topics' shared
/// `<X>Action<Token>` stem.
fn derive_type(
    base: &str,
    members: &BTreeMap<String, TopicKey>,
) -> (Option<String>, Vec<(DiagnosticKind, String)>) {
    let mut stem: Option<String> = None;
    for (suffix, token) in CORE_SUFFIX_TYPE_TOKENS {
        let Some(key) = members.get(suffix) else {
            continue;
        };
        let Some(candidate) = key.construct_type.strip_suffix(token) else {
            return (
                None,
                vec![(
                    DiagnosticKind::TypeMismatch,
                    format!(
                        "action {} member {} has type {} without the expected {} token",
                        base, key.name, key.construct_type, token
                    ),
                )],
            );
        };
        if !candidate.ends_with("Action") {
            return (
                None,
                vec![(
                    DiagnosticKind::TypeMismatch,
                    format!(
                        "action {} member {} has non-action type {}",
                        base, key.name, key.construct_type
                    ),
                )],
            );
        }
        match &stem {
            Some(existing) if existing != candidate => {
                return (
                    None,
                    vec![(
                        DiagnosticKind::TypeMismatch,
                        format!(
                            "action {} members disagree on type stem: {} vs {}",
                            base, existing, candidate
                        ),
                    )],
                );
            }
            Some(_) => {}
            None => stem = Some(candidate.to_string()),
        }
    }
    (stem, Vec::new())
}
