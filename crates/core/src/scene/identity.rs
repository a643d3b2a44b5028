//! Identity resolution between live scene nodes and template assets.
//!
//! Path strings are convenient for generated code and diagnostics but are not
//! dependable as identity: display names collide and nodes move. Everything
//! here anchors on [`StableId`] and treats paths as derived data.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::model::BindingSet;
use crate::scene::{
    LiveInstance, LiveNode, StableId, TemplateAsset, TemplateAssetId, TemplateStore, ROOT_SENTINEL,
};

/// Error type for identity resolution.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The node carries no correspondence back to any template asset.
    #[error("node '{name}' is not part of any template instance")]
    Unresolvable { name: String },

    /// A template asset referenced by the operation is not in the store.
    #[error("template asset '{id}' is not known to the store")]
    UnknownTemplate { id: TemplateAssetId },
}

/// A resolved (template asset, node) location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedIdentity {
    pub template: TemplateAssetId,
    pub stable_id: StableId,
}

/// Report entry for a binding whose durable identifier could no longer be
/// found under its template after a structural change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaleEntry {
    pub stable_id: StableId,
    pub capability_qualified_name: String,
    pub field_name: String,
}

/// Resolve the template-asset location a live node corresponds to.
///
/// The common case is a node whose `source_id` points into the instance's own
/// template. When the instance wraps another template (`source_template` names
/// a different asset), resolution walks that one level of nesting and
/// re-derives the nested asset instead. A node with no correspondence at all
/// fails with [`IdentityError::Unresolvable`].
pub fn resolve_stable_id(
    store: &dyn TemplateStore,
    instance: &LiveInstance,
    node: &LiveNode,
) -> Result<ResolvedIdentity, IdentityError> {
    let stable_id = node
        .source_id
        .ok_or_else(|| IdentityError::Unresolvable { name: node.name.clone() })?;

    let owning_template = node.source_template.as_ref().unwrap_or(&instance.template).clone();

    let asset = store
        .template(&owning_template)
        .ok_or_else(|| IdentityError::UnknownTemplate { id: owning_template.clone() })?;

    if !asset.contains(stable_id) {
        return Err(IdentityError::Unresolvable { name: node.name.clone() });
    }

    Ok(ResolvedIdentity { template: owning_template, stable_id })
}

/// Compute the display-name path from a declared root node to a target node
/// within one template asset. Returns the ROOT sentinel when target equals
/// root, and `None` when either node is unknown or unrelated.
pub fn resolve_path_relative(
    asset: &TemplateAsset,
    root: StableId,
    target: StableId,
) -> Option<String> {
    asset.relative_path(root, target)
}

/// Re-derive every entry's path and display-name fields from the template,
/// using each entry's durable identifier as the anchor.
///
/// This is what makes a binding set survive the live instance being renamed,
/// moved, or reloaded. Entries whose identifier can no longer be found under
/// the template keep their stale derived fields and are reported back —
/// deleting a user-authored binding is a human decision, not ours.
pub fn refresh_after_structural_change(
    store: &dyn TemplateStore,
    set: &mut BindingSet,
    live: &LiveInstance,
) -> Result<Vec<StaleEntry>, IdentityError> {
    let asset = store
        .template(&set.template_asset_id)
        .ok_or_else(|| IdentityError::UnknownTemplate { id: set.template_asset_id.clone() })?;

    set.root_path_in_scene = live.path_in_scene.clone();
    set.root_display_name = live.root.name.clone();

    let root_id = set.root_stable_id;
    let mut stale = Vec::new();

    for entry in &mut set.entries {
        let Some(node) = asset.node(entry.target_stable_id) else {
            warn!(
                stable_id = %entry.target_stable_id,
                capability = %entry.capability_qualified_name,
                "binding target no longer present under template"
            );
            stale.push(StaleEntry {
                stable_id: entry.target_stable_id,
                capability_qualified_name: entry.capability_qualified_name.clone(),
                field_name: entry.field_name.clone(),
            });
            continue;
        };

        // Present in the asset but not under the declared root: stale too.
        let Some(relative) = asset.relative_path(root_id, entry.target_stable_id) else {
            warn!(
                stable_id = %entry.target_stable_id,
                capability = %entry.capability_qualified_name,
                "binding target moved outside the binding set root"
            );
            stale.push(StaleEntry {
                stable_id: entry.target_stable_id,
                capability_qualified_name: entry.capability_qualified_name.clone(),
                field_name: entry.field_name.clone(),
            });
            continue;
        };
        entry.target_path_absolute = if relative == ROOT_SENTINEL {
            live.path_in_scene.clone()
        } else {
            format!("{}/{}", live.path_in_scene, relative)
        };
        entry.target_path_relative = relative;
        entry.target_display_name = node.name.clone();
    }

    set.touch();
    Ok(stale)
}
