//! Post-hoc rename propagation into an already-materialized companion file.
//!
//! This is a whole-token textual substitution, not a parser-level rename:
//! comments and code are rewritten alike, and an identifier the user has
//! textually transformed by hand will not be caught. The source behavior
//! accepts both; so do we.

use std::fs;
use std::path::Path;

use regex::Regex;
use tracing::debug;

use crate::codegen::GenerateError;
use crate::model::BindingSet;

/// What a propagation pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenameOutcome {
    /// Total token occurrences rewritten across all pending renames.
    pub replacements: usize,
    /// Pending-rename markers acknowledged.
    pub cleared: usize,
}

/// Rewrite every pending rename's old field name to its new one inside the
/// file at `script_path`, then clear the pending markers.
///
/// Matching is word-boundary exact: `oldName` is replaced, `oldNameExtra` is
/// not. A missing file is a no-op that keeps the markers, to be retried on a
/// later generation once the file exists.
pub fn propagate_renames(
    set: &mut BindingSet,
    script_path: &Path,
) -> Result<RenameOutcome, GenerateError> {
    let mut outcome = RenameOutcome::default();
    if !set.entries.iter().any(|e| e.has_pending_rename()) {
        return Ok(outcome);
    }
    if !script_path.exists() {
        debug!(path = %script_path.display(), "companion file absent, deferring rename propagation");
        return Ok(outcome);
    }

    let mut content = fs::read_to_string(script_path)
        .map_err(|source| GenerateError::Io { path: script_path.to_path_buf(), source })?;
    let mut changed = false;

    for entry in &mut set.entries {
        if !entry.has_pending_rename() {
            continue;
        }
        let pattern = format!(r"\b{}\b", regex::escape(&entry.previous_field_name));
        // Built from an escaped literal; compilation cannot fail. Skip (and
        // keep the marker) rather than abort the pass if it somehow does.
        let Ok(re) = Regex::new(&pattern) else { continue };
        let count = re.find_iter(&content).count();
        if count > 0 {
            content = re.replace_all(&content, entry.field_name.as_str()).into_owned();
            debug!(
                old = %entry.previous_field_name,
                new = %entry.field_name,
                count,
                "propagated field rename"
            );
            outcome.replacements += count;
            changed = true;
        }
        entry.clear_pending_rename();
        outcome.cleared += 1;
    }

    if changed {
        fs::write(script_path, content)
            .map_err(|source| GenerateError::Io { path: script_path.to_path_buf(), source })?;
    }
    if outcome.cleared > 0 {
        set.touch();
    }

    Ok(outcome)
}
