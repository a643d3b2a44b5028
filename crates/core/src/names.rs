//! Field name synthesis and set-wide uniqueness.
//!
//! Default names are `prefix + NodeName` where the prefix comes from a
//! user-configurable table keyed by capability type (falling back to the
//! lower-cased type name). Uniqueness is case-insensitive over the whole set
//! and re-applied as a last-resort safety net right before code synthesis.

use serde::{Deserialize, Serialize};

use crate::model::{BindingEntry, BindingSet};

/// One capability-type-to-prefix rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixMapping {
    pub capability: String,
    pub prefix: String,
}

impl PrefixMapping {
    pub fn new(capability: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self { capability: capability.into(), prefix: prefix.into() }
    }
}

/// The prefix table consulted when synthesizing a default field name.
///
/// Loaded once by the host (project config) and passed by reference into the
/// allocator; the core never reads ambient state for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixPolicy {
    pub mappings: Vec<PrefixMapping>,
}

impl Default for PrefixPolicy {
    fn default() -> Self {
        Self {
            mappings: vec![
                PrefixMapping::new("Button", "btn"),
                PrefixMapping::new("Image", "img"),
                PrefixMapping::new("Text", "txt"),
                PrefixMapping::new("TextMeshProUGUI", "tmp"),
                PrefixMapping::new("InputField", "input"),
                PrefixMapping::new("Toggle", "toggle"),
                PrefixMapping::new("Slider", "slider"),
                PrefixMapping::new("Scrollbar", "scrollbar"),
                PrefixMapping::new("Dropdown", "dropdown"),
                PrefixMapping::new("Canvas", "canvas"),
                PrefixMapping::new("RectTransform", "rect"),
                PrefixMapping::new("ScrollRect", "scrollRect"),
                PrefixMapping::new("RawImage", "rawImg"),
            ],
        }
    }
}

impl PrefixPolicy {
    /// An empty table; every capability falls back to its lower-cased name.
    pub fn empty() -> Self {
        Self { mappings: Vec::new() }
    }

    /// Prefix token for a capability short type name.
    pub fn prefix_for(&self, capability_short: &str) -> String {
        self.mappings
            .iter()
            .find(|m| m.capability == capability_short)
            .map(|m| m.prefix.clone())
            .unwrap_or_else(|| capability_short.to_lowercase())
    }
}

/// Strip whitespace and anything that is not alphanumeric or underscore.
/// An empty result, or one starting with a digit, gets the fallback token
/// prepended so the output is always a legal identifier fragment.
fn sanitize_identifier_part(raw: &str, fallback: &str) -> String {
    let cleaned: String = raw.chars().filter(|c| c.is_ascii_alphanumeric() || *c == '_').collect();
    if cleaned.is_empty() || cleaned.starts_with(|c: char| c.is_ascii_digit()) {
        format!("{fallback}{cleaned}")
    } else {
        cleaned
    }
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Synthesize the default field name for a capability on a named node.
///
/// `btn` + `Submit` -> `btnSubmit`. Redundant halves collapse: a node part
/// equal to the prefix yields the prefix alone, and a node part that already
/// starts with the prefix is used by itself.
pub fn synthesize_default_name(
    capability_short: &str,
    node_display_name: &str,
    policy: &PrefixPolicy,
) -> String {
    let prefix = lower_first(&sanitize_identifier_part(&policy.prefix_for(capability_short), "comp_"));
    let suffix = upper_first(&sanitize_identifier_part(node_display_name, "obj_"));

    if prefix.eq_ignore_ascii_case(&suffix) {
        prefix
    } else if suffix.len() >= prefix.len() && suffix[..prefix.len()].eq_ignore_ascii_case(&prefix) {
        lower_first(&suffix)
    } else {
        format!("{prefix}{suffix}")
    }
}

/// Make `candidate` unique within the set, case-insensitively.
///
/// Both enabled and disabled entries count as taken names. `exclude` skips
/// one entry's own name, for in-place renames. Collisions get an increasing
/// integer suffix appended to the original candidate until a free name is
/// found.
pub fn ensure_unique(set: &BindingSet, candidate: &str, exclude: Option<&BindingEntry>) -> String {
    let taken: Vec<String> = set
        .entries
        .iter()
        .filter(|e| {
            exclude.map_or(true, |x| {
                (e.target_stable_id, e.capability_qualified_name.as_str())
                    != (x.target_stable_id, x.capability_qualified_name.as_str())
            })
        })
        .map(|e| e.field_name.to_lowercase())
        .collect();

    if !taken.contains(&candidate.to_lowercase()) {
        return candidate.to_string();
    }

    let mut suffix = 1u32;
    loop {
        let attempt = format!("{candidate}{suffix}");
        if !taken.contains(&attempt.to_lowercase()) {
            return attempt;
        }
        suffix += 1;
    }
}

/// Class name derived from a root display name: strip anything that is not
/// alphanumeric or underscore, then upper-case the first letter.
pub fn class_name_for(root_display_name: &str) -> String {
    let cleaned: String = root_display_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    upper_first(&cleaned)
}
