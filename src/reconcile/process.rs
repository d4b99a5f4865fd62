//! Process attribution.
//!
//! A live node's candidate processes are OS-level records, and the
//! executable is not always the node: an interpreter obscures the
//! invoked script's identity. Attribution is a two-stage lookup.
//! Match on the executable base name first; when the executable is a
//! known interpreter (config), re-run the name match over the argument
//! list instead. Remap-style arguments are honored: `__node:=x` names
//! the node outright, and a `__ns:=` argument that disagrees with the
//! node's namespace disqualifies the candidate.

use crate::config::Config;
use crate::live::LiveProcess;
use crate::model::{ProcessInfo, QualifiedName};
use crate::reconcile::score;
use regex::Regex;
use std::sync::OnceLock;

/// Scores closer than this are treated as equal when ranking candidates.
const TIE_EPSILON: f64 = 1e-9;

fn ns_remap_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^__ns:=(.+)$").expect("ns remap pattern"))
}

fn node_remap_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^__node:=(.+)$").expect("node remap pattern"))
}

#[derive(Debug, Clone, PartialEq)]
pub enum Attribution {
    Attributed(ProcessInfo),
    /// Nothing usable among the candidates; the note says why.
    Unattributed { note: String },
}

/// Attribute one of `candidates` to the node, or explain why none fits.
///
/// An empty candidate list yields `Unattributed` with an empty note;
/// callers treat that as "nothing to attribute" rather than a finding.
pub fn attribute(name: &QualifiedName, candidates: &[LiveProcess], cfg: &Config) -> Attribution {
    if candidates.is_empty() {
        return Attribution::Unattributed {
            note: String::new(),
        };
    }

    let mut scored: Vec<(f64, &LiveProcess)> = Vec::new();
    for proc in candidates {
        let score = candidate_score(name, proc, cfg);
        if score > 0.0 {
            scored.push((score, proc));
        }
    }

    let best = scored
        .iter()
        .map(|(s, _)| *s)
        .fold(0.0f64, f64::max);
    if best < cfg.fuzzy_threshold {
        return Attribution::Unattributed {
            note: format!(
                "no candidate process matched '{}' ({} scanned)",
                name,
                candidates.len()
            ),
        };
    }

    let survivors: Vec<&LiveProcess> = scored
        .iter()
        .filter(|(s, _)| (best - s).abs() <= TIE_EPSILON)
        .map(|(_, p)| *p)
        .collect();

    if survivors.len() > 1 {
        let pids: Vec<String> = survivors.iter().map(|p| p.pid.to_string()).collect();
        return Attribution::Unattributed {
            note: format!(
                "ambiguous process attribution for '{}': pids {}",
                name,
                pids.join(", ")
            ),
        };
    }

    let chosen = survivors[0];
    Attribution::Attributed(ProcessInfo {
        pid: chosen.pid,
        cmdline: chosen.cmdline.clone(),
    })
}

/// Score one candidate process against a node name.
fn candidate_score(name: &QualifiedName, proc: &LiveProcess, cfg: &Config) -> f64 {
    let Some(exe) = proc.cmdline.first() else {
        return 0.0;
    };

    // A namespace remap that names a different namespace rules the
    // candidate out entirely.
    for arg in &proc.cmdline[1..] {
        if let Some(caps) = ns_remap_re().captures(arg) {
            if caps[1] != *name.namespace() {
                return 0.0;
            }
        }
    }

    let exe_base = basename(exe);
    if is_interpreter(exe_base, cfg) {
        // Stage two: the script or node-name token carries the identity.
        let mut best = 0.0f64;
        for arg in &proc.cmdline[1..] {
            if let Some(caps) = node_remap_re().captures(arg) {
                best = best.max(score::similarity(&caps[1], name.base(), cfg.containment_score));
                continue;
            }
            if arg.starts_with('-') {
                continue;
            }
            let token = strip_extension(basename(arg));
            best = best.max(score::similarity(token, name.base(), cfg.containment_score));
        }
        best
    } else {
        score::similarity(exe_base, name.base(), cfg.containment_score)
    }
}

fn is_interpreter(exe_base: &str, cfg: &Config) -> bool {
    cfg.interpreters.iter().any(|interp| {
        exe_base == interp || exe_base.strip_prefix(interp.as_str()).is_some_and(|rest| {
            rest.starts_with('.')
        })
    })
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn strip_extension(token: &str) -> &str {
    match token.rfind('.') {
        Some(idx) if idx > 0 => &token[..idx],
        _ => token,
    }
}
