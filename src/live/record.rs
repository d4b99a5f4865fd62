//! Raw live discovery records.
//!
//! One record per discovered node: its topic/service/action roles with
//! types, plus zero or more candidate OS processes. Produced by the
//! external discovery tool; this crate only consumes the capture file.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LiveCapture {
    #[serde(default)]
    pub nodes: Vec<LiveNode>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LiveNode {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub topics: Vec<LiveTopic>,

    #[serde(default)]
    pub services: Vec<LiveService>,

    #[serde(default)]
    pub actions: Vec<LiveAction>,

    #[serde(default)]
    pub candidate_processes: Vec<LiveProcess>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicRole {
    Publish,
    Subscribe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceRole {
    Server,
    Client,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionRole {
    Server,
    Client,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LiveTopic {
    pub name: String,
    pub construct_type: String,
    pub role: TopicRole,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LiveService {
    pub name: String,
    pub construct_type: String,
    pub role: ServiceRole,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LiveAction {
    pub name: String,

    #[serde(default)]
    pub construct_type: Option<String>,

    pub role: ActionRole,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LiveProcess {
    pub pid: u32,

    #[serde(default)]
    pub cmdline: Vec<String>,

    /// Why the capture tool kept this process; provenance only, never
    /// used for matching.
    #[serde(default)]
    pub reason: Option<String>,
}
