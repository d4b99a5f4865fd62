//! Reconcile a statically declared deployment graph against a live capture.
//!
//! Two independent inputs, one output:
//! - a workspace spec file describing everything that *could* run
//!   ([`spec`]),
//! - a capture of what *is* running: node names, topic/service/action
//!   roles, candidate OS processes ([`live`]).
//!
//! The reconciliation engine ([`reconcile`]) joins the two into a single
//! [`model::Model`] with per-entity validation status, the graph builder
//! ([`graph`]) derives a node/edge view with grouped action edges, and the
//! exporters ([`export`]) write YAML/JSON/text banks and DOT files.

pub mod config;
pub mod error;
pub mod export;
pub mod graph;
pub mod live;
pub mod model;
pub mod reconcile;
pub mod spec;

pub type Result<T> = anyhow::Result<T>;
