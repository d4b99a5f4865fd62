//! Name similarity scoring.
//!
//! Standalone so the acceptance policy can be tested apart from the
//! engine loop. Scores live in [0, 1]. Two signals feed a score:
//! normalized edit distance, and base-name containment (a discovered
//! name that embeds a declared one, or vice versa, which is the common
//! shape of PID-suffixed or wrapper-renamed nodes). Containment maps to
//! a fixed score so that two candidates sharing the same fragment tie
//! exactly and fall through to the ambiguity path.

use crate::config::Config;
use crate::model::QualifiedName;
use regex::Regex;
use std::sync::OnceLock;

/// Scores closer than this are treated as a tie.
const TIE_EPSILON: f64 = 1e-9;

fn pid_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(_\d+)+$").expect("pid suffix pattern"))
}

/// Normalize a name for comparison: keep the base name only, lowercase,
/// and drop trailing `_<digits>` runs (PID-style renames).
pub fn normalize(name: &str) -> String {
    let base = name.rsplit('/').next().unwrap_or(name);
    let base = base.to_ascii_lowercase();
    pid_suffix_re().replace(&base, "").into_owned()
}

/// Similarity between a live-discovered name and a static candidate.
pub fn similarity(live: &str, candidate: &str, containment_score: f64) -> f64 {
    let a = normalize(live);
    let b = normalize(candidate);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }
    let edit = strsim::normalized_levenshtein(&a, &b);
    if a.contains(&b) || b.contains(&a) {
        edit.max(containment_score)
    } else {
        edit
    }
}

/// Outcome of scanning a candidate set for one live name.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    Accepted {
        name: QualifiedName,
        score: f64,
    },
    /// Multiple candidates tied on the best score above threshold.
    Tie {
        score: f64,
        candidates: Vec<QualifiedName>,
    },
    BelowThreshold,
}

/// Pick the best static candidate for a live name.
///
/// Callers pass candidates in sorted order (BTreeMap keys) so tie lists
/// come out deterministic.
pub fn best_match<'a, I>(live: &str, candidates: I, cfg: &Config) -> MatchOutcome
where
    I: IntoIterator<Item = &'a QualifiedName>,
{
    let mut best_score = 0.0f64;
    let mut best: Vec<QualifiedName> = Vec::new();

    for candidate in candidates {
        let score = similarity(live, candidate.as_str(), cfg.containment_score);
        if score > best_score + TIE_EPSILON {
            best_score = score;
            best.clear();
            best.push(candidate.clone());
        } else if (score - best_score).abs() <= TIE_EPSILON && !best.is_empty() {
            best.push(candidate.clone());
        }
    }

    if best.is_empty() || best_score < cfg.fuzzy_threshold {
        MatchOutcome::BelowThreshold
    } else if best.len() > 1 {
        MatchOutcome::Tie {
            score: best_score,
            candidates: best,
        }
    } else {
        MatchOutcome::Accepted {
            name: best.remove(0),
            score: best_score,
        }
    }
}
