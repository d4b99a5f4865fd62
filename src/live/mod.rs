//! Live capture layer: parsing and structural validation of discovery
//! records.
//!
//! Kept separate from the static spec and the reconciliation engine; it
//! owns the raw record shapes and the one fatal structural check.

pub mod record;

pub use record::{
    ActionRole, LiveAction, LiveCapture, LiveNode, LiveProcess, LiveService, LiveTopic,
    ServiceRole, TopicRole,
};

use crate::error::SnapshotError;
use anyhow::Context;
use std::fs;

/// Parse a live capture file (JSON).
pub fn load(path: &str) -> crate::Result<LiveCapture> {
    let text = fs::read_to_string(path).with_context(|| format!("read capture file {}", path))?;
    let capture: LiveCapture =
        serde_json::from_str(&text).with_context(|| format!("parse capture file {}", path))?;
    Ok(capture)
}

impl LiveCapture {
    /// Structural validation: a record with no node name is the one
    /// fatal input condition. Everything else is recoverable per-entity
    /// and handled during reconciliation.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        for (index, node) in self.nodes.iter().enumerate() {
            if node.name.trim().is_empty() {
                return Err(SnapshotError::MissingIdentity { index });
            }
        }
        Ok(())
    }
}
