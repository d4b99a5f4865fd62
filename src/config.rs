//! Runtime tuning knobs.
//!
//! Everything the matching passes treat as policy rather than algorithm
//! lives here: the fuzzy acceptance threshold, the interpreter set used
//! during process attribution, and the name filters that keep middleware
//! housekeeping entities out of the model. Loadable from a YAML file;
//! every field has a default.

use crate::Result;
use anyhow::{Context, bail};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Minimum similarity score for a fuzzy name match to be accepted.
    pub fuzzy_threshold: f64,

    /// Score assigned when one normalized base name contains the other.
    /// A fixed value, not length-derived, so that two candidates sharing
    /// the same fragment tie exactly instead of winning on length.
    pub containment_score: f64,

    /// Executable base names treated as interpreters. When a candidate
    /// process runs one of these, attribution inspects its argument list
    /// instead of the executable name.
    pub interpreters: BTreeSet<String>,

    /// Topic names dropped from the model (middleware housekeeping).
    pub exclude_topics: BTreeSet<String>,

    /// Node names dropped from the model.
    pub exclude_nodes: BTreeSet<String>,

    /// Service types dropped from the model.
    pub exclude_service_types: BTreeSet<String>,
}

impl Default for Config {
    fn default() -> Self {
        fn set(items: &[&str]) -> BTreeSet<String> {
            items.iter().map(|s| s.to_string()).collect()
        }

        Self {
            fuzzy_threshold: 0.8,
            containment_score: 0.85,
            interpreters: set(&["python", "python2", "python3"]),
            exclude_topics: set(&["/rosout", "/parameter_events"]),
            exclude_nodes: set(&["/rosout"]),
            exclude_service_types: BTreeSet::new(),
        }
    }
}

impl Config {
    /// Load a config file, falling back to defaults for absent fields.
    pub fn load(path: &str) -> Result<Self> {
        let text =
            fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
        let cfg: Config =
            serde_yaml::from_str(&text).with_context(|| format!("parse config file {}", path))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.fuzzy_threshold) {
            bail!(
                "fuzzy_threshold must be within [0, 1], got {}",
                self.fuzzy_threshold
            );
        }
        if !(0.0..=1.0).contains(&self.containment_score) {
            bail!(
                "containment_score must be within [0, 1], got {}",
                self.containment_score
            );
        }
        Ok(())
    }
}
