use anyhow::{anyhow, bail, Context, Result};
use uibind_core::db::ProjectContext;
use uibind_core::model::{short_type_name, BindingEntry, BindingSet, Visibility};
use uibind_core::names::{ensure_unique, synthesize_default_name};
use uibind_core::scene::{
    refresh_after_structural_change, InMemoryTemplateStore, LiveInstance, StableId,
    TemplateAssetId, ROOT_SENTINEL,
};

use crate::canonicalize_or_current;
use crate::commands::templates::load_template;

/// Declare a binding for a capability on a template node.
///
/// `node` is a display-name path below the template root, or `[ROOT]` for
/// the root itself. The binding set is created on the first request for a
/// template.
#[allow(clippy::too_many_arguments)]
pub fn bind_command(
    root: &str,
    template: &str,
    node: &str,
    capability: &str,
    name: Option<String>,
    visibility: Visibility,
    disabled: bool,
) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = ProjectContext::from_root(&root_path)?;
    let asset_id = TemplateAssetId::new(template);
    let asset = load_template(&ctx, &asset_id)?;

    let target = asset
        .root
        .find_by_path(node)
        .ok_or_else(|| anyhow!("No node at path '{node}' under template '{template}'"))?;
    if !target.has_capability(capability) {
        bail!("Node '{}' has no capability '{}'", target.name, capability);
    }

    // Load the set, or create it on first binding request.
    let mut set = match ctx.db.load_binding_set(&asset_id)? {
        Some(set) => set,
        None => BindingSet::new(
            asset_id.clone(),
            asset.root.stable_id,
            asset.root.name.clone(),
            asset.root.name.clone(),
        ),
    };

    let relative = asset
        .relative_path(set.root_stable_id, target.stable_id)
        .ok_or_else(|| anyhow!("Node '{}' is not below the binding set root", target.name))?;
    let absolute = if relative == ROOT_SENTINEL {
        set.root_path_in_scene.clone()
    } else {
        format!("{}/{}", set.root_path_in_scene, relative)
    };

    // Default name from the allocator, uniqueness enforced either way.
    let policy = ctx.config.prefix_policy();
    let short = short_type_name(capability);
    let candidate =
        name.unwrap_or_else(|| synthesize_default_name(short, &target.name, &policy));
    let field_name = ensure_unique(&set, &candidate, None);

    let entry = BindingEntry::new(target.stable_id, capability, field_name)
        .with_paths(absolute, relative, target.name.clone())
        .with_visibility(visibility)
        .with_enabled(!disabled);

    set.add_binding(entry).context("Failed to add binding")?;
    ctx.db.save_binding_set(&set).context("Failed to save binding set")?;

    let added = &set.entries[set.entries.len() - 1];
    println!("Added binding:");
    println!("  Template: {}", template);
    println!("  Node: {} (stable id {})", added.target_display_name, added.target_stable_id);
    println!("  Capability: {}", added.capability_qualified_name);
    println!("  Field: {} ({})", added.field_name, added.visibility.keyword());
    println!("  Path: {}", added.target_path_relative);

    Ok(())
}

/// Remove a binding by node stable id and capability qualified name.
pub fn unbind_command(root: &str, template: &str, node_id: u64, capability: &str) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = ProjectContext::from_root(&root_path)?;
    let asset_id = TemplateAssetId::new(template);

    let mut set = ctx
        .db
        .load_binding_set(&asset_id)?
        .ok_or_else(|| anyhow!("No binding set for template '{template}'"))?;

    if !set.remove_binding(StableId(node_id), capability) {
        bail!("No binding for node {node_id} and capability '{capability}'");
    }
    ctx.db.save_binding_set(&set).context("Failed to save binding set")?;

    println!("Removed binding for node {node_id} / '{capability}'");
    Ok(())
}

/// Rename a binding's generated field, leaving a pending-rename marker for
/// the propagator to pick up on the next generation.
pub fn rename_command(
    root: &str,
    template: &str,
    node_id: u64,
    capability: &str,
    new_name: &str,
) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = ProjectContext::from_root(&root_path)?;
    let asset_id = TemplateAssetId::new(template);

    let mut set = ctx
        .db
        .load_binding_set(&asset_id)?
        .ok_or_else(|| anyhow!("No binding set for template '{template}'"))?;

    let stored = set
        .query_by_node_and_capability(StableId(node_id), capability)
        .ok_or_else(|| anyhow!("No binding for node {node_id} and capability '{capability}'"))?
        .clone();

    let unique = ensure_unique(&set, new_name, Some(&stored));
    let mut updated = stored.clone();
    updated.field_name = unique.clone();
    set.update_binding(updated).context("Failed to update binding")?;
    ctx.db.save_binding_set(&set).context("Failed to save binding set")?;

    if unique != new_name {
        println!("Name '{new_name}' was taken; using '{unique}'");
    }
    println!("Renamed field '{}' -> '{}'", stored.field_name, unique);
    Ok(())
}

/// Enable or disable a binding's participation in code generation.
pub fn set_enabled_command(
    root: &str,
    template: &str,
    node_id: u64,
    capability: &str,
    enabled: bool,
) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = ProjectContext::from_root(&root_path)?;
    let asset_id = TemplateAssetId::new(template);

    let mut set = ctx
        .db
        .load_binding_set(&asset_id)?
        .ok_or_else(|| anyhow!("No binding set for template '{template}'"))?;

    let mut updated = set
        .query_by_node_and_capability(StableId(node_id), capability)
        .ok_or_else(|| anyhow!("No binding for node {node_id} and capability '{capability}'"))?
        .clone();
    updated.enabled = enabled;
    set.update_binding(updated).context("Failed to update binding")?;
    ctx.db.save_binding_set(&set).context("Failed to save binding set")?;

    println!("Binding for node {node_id} / '{capability}' is now {}", if enabled { "enabled" } else { "disabled" });
    Ok(())
}

/// List the bindings declared for one template.
pub fn list_bindings_command(root: &str, template: &str, json: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = ProjectContext::from_root(&root_path)?;
    let asset_id = TemplateAssetId::new(template);

    let Some(set) = ctx.db.load_binding_set(&asset_id)? else {
        if json {
            println!("[]");
        } else {
            println!("No binding set for template '{template}'");
        }
        return Ok(());
    };

    if json {
        let serialized = serde_json::to_string_pretty(&set.entries)?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("Bindings for {} ({} total, {} enabled):", template, set.len(), set.enabled_count());
    for entry in &set.entries {
        let marker = if entry.enabled { "" } else { " [disabled]" };
        let pending = if entry.has_pending_rename() {
            format!(" (rename pending from '{}')", entry.previous_field_name)
        } else {
            String::new()
        };
        println!(
            "  - {} {} <- {} @ {}{}{}",
            entry.visibility.keyword(),
            entry.field_name,
            entry.capability_short_name,
            entry.target_path_relative,
            marker,
            pending
        );
    }

    Ok(())
}

/// List all binding sets known to the project.
pub fn list_sets_command(root: &str, json: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = ProjectContext::from_root(&root_path)?;

    let sets = ctx.db.list_binding_sets().context("Failed to list binding sets")?;

    if json {
        let serialized = serde_json::to_string_pretty(&sets)?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("Binding sets ({}):", sets.len());
    if sets.is_empty() {
        println!("  (none)");
        return Ok(());
    }
    for set in sets {
        println!(
            "  - {} root='{}' entries={} modified={}",
            set.template_asset_id,
            set.root_display_name,
            set.len(),
            set.modified_at
        );
    }

    Ok(())
}

/// Re-derive per-entry paths from the (possibly restructured) template file,
/// reporting entries whose stable id can no longer be found.
pub fn refresh_command(root: &str, template: &str) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = ProjectContext::from_root(&root_path)?;
    let asset_id = TemplateAssetId::new(template);
    let asset = load_template(&ctx, &asset_id)?;

    let mut set = ctx
        .db
        .load_binding_set(&asset_id)?
        .ok_or_else(|| anyhow!("No binding set for template '{template}'"))?;

    let mut store = InMemoryTemplateStore::new();
    let live = LiveInstance::instantiate(&asset, set.root_path_in_scene.clone());
    store.insert(asset);

    let stale = refresh_after_structural_change(&store, &mut set, &live)
        .context("Failed to refresh binding set")?;
    ctx.db.save_binding_set(&set).context("Failed to save binding set")?;

    println!("Refreshed {} bindings for '{}'", set.len(), template);
    if stale.is_empty() {
        println!("All binding targets resolved.");
    } else {
        println!("Stale bindings ({}), kept but no longer resolvable:", stale.len());
        for report in stale {
            println!(
                "  - {} (node {} / '{}')",
                report.field_name, report.stable_id, report.capability_qualified_name
            );
        }
    }

    Ok(())
}
