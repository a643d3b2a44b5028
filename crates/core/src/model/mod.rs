//! Binding record model: one declared mapping from a node+capability pair to
//! a generated field, and the per-template container of those mappings.
//!
//! A [`BindingSet`] is the unit of consistency: every mutating operation is
//! synchronous and whole-set, and persistence saves or loads a set in one
//! piece. Entries are never shared across sets.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scene::{StableId, TemplateAssetId, ROOT_SENTINEL};

/// Visibility of a generated field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Private,
    Protected,
    Public,
}

impl Visibility {
    /// The C# keyword emitted in front of the field declaration.
    pub fn keyword(self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Protected => "protected",
            Visibility::Public => "public",
        }
    }

    /// Encode as an integer for storage in SQLite.
    pub fn to_i32(self) -> i32 {
        match self {
            Visibility::Private => 0,
            Visibility::Protected => 1,
            Visibility::Public => 2,
        }
    }

    /// Decode from an integer stored in SQLite.
    pub fn from_i32(value: i32) -> Self {
        match value {
            1 => Visibility::Protected,
            2 => Visibility::Public,
            _ => Visibility::Private,
        }
    }
}

impl std::str::FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "private" => Ok(Visibility::Private),
            "protected" => Ok(Visibility::Protected),
            "public" => Ok(Visibility::Public),
            other => Err(format!("unknown visibility '{other}'")),
        }
    }
}

/// Error type for binding set mutations.
#[derive(Debug, Error)]
pub enum BindingError {
    /// The (node, capability) pair is already bound in this set.
    #[error("node {stable_id} already has a binding for capability '{capability}'")]
    DuplicateBinding { stable_id: StableId, capability: String },

    /// No entry with the given (node, capability) pair exists.
    #[error("no binding for node {stable_id} and capability '{capability}'")]
    UnknownBinding { stable_id: StableId, capability: String },
}

/// One declared mapping from a node+capability pair to a generated field.
///
/// `target_stable_id` is the authoritative identity; the path and display
/// name fields are derived and refreshed from the template on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingEntry {
    pub target_stable_id: StableId,
    /// Full display-name path from the scene root to the node. Derived.
    pub target_path_absolute: String,
    /// Path from the binding set's root to the node, or the ROOT sentinel.
    pub target_path_relative: String,
    /// Last path segment, for display and diagnostics only.
    pub target_display_name: String,
    /// Short type name of the bound capability, used in generated code.
    pub capability_short_name: String,
    /// Qualified type name, used for runtime type resolution and as half of
    /// the entry's identity key.
    pub capability_qualified_name: String,
    pub field_name: String,
    /// Last field name before an unacknowledged rename; empty when none.
    #[serde(default)]
    pub previous_field_name: String,
    pub visibility: Visibility,
    pub enabled: bool,
}

impl BindingEntry {
    pub fn new(
        target_stable_id: StableId,
        capability_qualified_name: impl Into<String>,
        field_name: impl Into<String>,
    ) -> Self {
        let capability_qualified_name = capability_qualified_name.into();
        let capability_short_name = short_type_name(&capability_qualified_name).to_string();
        Self {
            target_stable_id,
            target_path_absolute: String::new(),
            target_path_relative: String::new(),
            target_display_name: String::new(),
            capability_short_name,
            capability_qualified_name,
            field_name: field_name.into(),
            previous_field_name: String::new(),
            visibility: Visibility::Private,
            enabled: true,
        }
    }

    /// Builder-style helper to set the derived path fields in one go.
    pub fn with_paths(
        mut self,
        absolute: impl Into<String>,
        relative: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        self.target_path_absolute = absolute.into();
        self.target_path_relative = relative.into();
        self.target_display_name = display_name.into();
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Whether this binding targets the set's root node itself.
    pub fn is_root_binding(&self) -> bool {
        self.target_path_relative == ROOT_SENTINEL
    }

    /// Whether a rename is pending acknowledgement by the propagator.
    pub fn has_pending_rename(&self) -> bool {
        !self.previous_field_name.is_empty()
    }

    /// Acknowledge a propagated rename.
    pub fn clear_pending_rename(&mut self) {
        self.previous_field_name.clear();
    }

    /// Namespace portion of the qualified capability name, if any.
    pub fn capability_namespace(&self) -> Option<&str> {
        self.capability_qualified_name.rsplit_once('.').map(|(ns, _)| ns)
    }

    fn key(&self) -> (StableId, &str) {
        (self.target_stable_id, self.capability_qualified_name.as_str())
    }
}

/// Derive the short type name from a qualified one.
pub fn short_type_name(qualified: &str) -> &str {
    qualified.rsplit_once('.').map_or(qualified, |(_, short)| short)
}

/// All bindings declared for one template asset.
///
/// Created on the first binding request for a template, mutated in place, and
/// never implicitly destroyed — deletion is an explicit external operation.
/// Entry order is insertion order; it only affects generated-code ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingSet {
    pub template_asset_id: TemplateAssetId,
    pub root_stable_id: StableId,
    pub root_path_in_scene: String,
    pub root_display_name: String,
    pub created_at: String,
    pub modified_at: String,
    pub entries: Vec<BindingEntry>,
}

impl BindingSet {
    pub fn new(
        template_asset_id: impl Into<TemplateAssetId>,
        root_stable_id: StableId,
        root_path_in_scene: impl Into<String>,
        root_display_name: impl Into<String>,
    ) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            template_asset_id: template_asset_id.into(),
            root_stable_id,
            root_path_in_scene: root_path_in_scene.into(),
            root_display_name: root_display_name.into(),
            created_at: now.clone(),
            modified_at: now,
            entries: Vec::new(),
        }
    }

    /// Append a binding, rejecting duplicates of the (node, capability) key.
    pub fn add_binding(&mut self, entry: BindingEntry) -> Result<(), BindingError> {
        if self.has_binding(entry.target_stable_id, &entry.capability_qualified_name) {
            return Err(BindingError::DuplicateBinding {
                stable_id: entry.target_stable_id,
                capability: entry.capability_qualified_name,
            });
        }
        self.entries.push(entry);
        self.touch();
        Ok(())
    }

    /// Remove the binding with the given identity key. Returns whether a
    /// removal occurred.
    pub fn remove_binding(&mut self, stable_id: StableId, capability_qualified: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.key() != (stable_id, capability_qualified));
        let removed = self.entries.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    /// Replace the entry matching `entry`'s (node, capability) key.
    ///
    /// A changed field name retains the stored name as pending-rename state
    /// so the propagator can later rewrite already-generated code. Renaming
    /// again before propagation keeps the oldest unacknowledged name, and
    /// renaming back to it cancels the pending rename entirely.
    pub fn update_binding(&mut self, mut entry: BindingEntry) -> Result<(), BindingError> {
        let Some(stored) = self.entries.iter_mut().find(|e| {
            e.key() == (entry.target_stable_id, entry.capability_qualified_name.as_str())
        }) else {
            return Err(BindingError::UnknownBinding {
                stable_id: entry.target_stable_id,
                capability: entry.capability_qualified_name,
            });
        };

        if stored.field_name != entry.field_name {
            let origin = if stored.has_pending_rename() {
                stored.previous_field_name.clone()
            } else {
                stored.field_name.clone()
            };
            entry.previous_field_name =
                if origin == entry.field_name { String::new() } else { origin };
        } else {
            entry.previous_field_name = stored.previous_field_name.clone();
        }

        *stored = entry;
        self.touch();
        Ok(())
    }

    /// All bindings targeting the given node.
    pub fn query_by_node(&self, stable_id: StableId) -> Vec<&BindingEntry> {
        self.entries.iter().filter(|e| e.target_stable_id == stable_id).collect()
    }

    /// The binding for a specific (node, capability) pair, if declared.
    pub fn query_by_node_and_capability(
        &self,
        stable_id: StableId,
        capability_qualified: &str,
    ) -> Option<&BindingEntry> {
        self.entries.iter().find(|e| e.key() == (stable_id, capability_qualified))
    }

    pub fn has_binding(&self, stable_id: StableId, capability_qualified: &str) -> bool {
        self.query_by_node_and_capability(stable_id, capability_qualified).is_some()
    }

    /// Bindings that participate in code generation.
    pub fn enabled_entries(&self) -> Vec<&BindingEntry> {
        self.entries.iter().filter(|e| e.enabled).collect()
    }

    pub fn enabled_count(&self) -> usize {
        self.entries.iter().filter(|e| e.enabled).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries carrying an unacknowledged rename.
    pub fn pending_renames(&self) -> Vec<&BindingEntry> {
        self.entries.iter().filter(|e| e.has_pending_rename()).collect()
    }

    /// Bump the modification timestamp.
    pub(crate) fn touch(&mut self) {
        self.modified_at = Utc::now().to_rfc3339();
    }
}
