//! Qualified entity names.
//!
//! A qualified name is a namespace plus a base name, rendered as
//! "/ns/base". We store the normalized full form and derive ordering so
//! names can key BTreeMaps; the namespace/base split is computed on
//! demand because the match passes compare the two halves separately.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct QualifiedName(String);

impl QualifiedName {
    /// Normalize a raw name: trim whitespace, ensure a leading slash.
    pub fn new(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with('/') {
            Self(raw.to_string())
        } else {
            Self(format!("/{raw}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Namespace portion, "/" for top-level names.
    pub fn namespace(&self) -> &str {
        match self.0.rfind('/') {
            Some(0) | None => "/",
            Some(idx) => &self.0[..idx],
        }
    }

    /// Base name after the final separator.
    pub fn base(&self) -> &str {
        match self.0.rfind('/') {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for QualifiedName {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<QualifiedName> for String {
    fn from(name: QualifiedName) -> Self {
        name.0
    }
}

impl From<&str> for QualifiedName {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}
