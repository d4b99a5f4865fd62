//! Error taxonomy for the snapshot core.
//!
//! Per-entity ambiguity (a fuzzy tie, an unattributable process, a
//! partial action) is never an error here: it lands in the model as a
//! diagnostic and the run continues. The typed failures below cover the
//! two cases callers must be able to tell apart: structurally corrupt
//! input, and a reference that never existed.

use crate::model::EntityKind;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    /// A live discovery record carried no node name. Any model built from
    /// such a record would be unsound, so the whole pass stops.
    #[error("live discovery record #{index} is missing its node name")]
    MissingIdentity { index: usize },

    /// A lookup did not resolve to an entry in the model. Distinct from
    /// "present but not validated".
    #[error("{kind} '{name}' not found in model")]
    NotFound { kind: EntityKind, name: String },
}
