use anyhow::{anyhow, Context, Result};
use uibind_core::codegen::{generate_scripts, require_config, CombineStrategy};
use uibind_core::db::ProjectContext;
use uibind_core::scene::TemplateAssetId;

use crate::canonicalize_or_current;

/// Run rename propagation and code synthesis for one template's binding set.
///
/// `strategy` overrides the profile's combination strategy for this run.
pub fn generate_command(
    root: &str,
    template: &str,
    profile: Option<String>,
    strategy: Option<CombineStrategy>,
) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = ProjectContext::from_root(&root_path)?;
    let asset_id = TemplateAssetId::new(template);

    let mut set = ctx
        .db
        .load_binding_set(&asset_id)?
        .ok_or_else(|| anyhow!("No binding set for template '{template}'"))?;

    let mut config = require_config(
        ctx.config
            .profile(profile.as_deref())
            .map(|p| p.to_generation_config(&ctx.layout.root)),
    )
    .with_context(|| match profile {
        Some(ref name) => format!("No generation profile named '{name}'"),
        None => format!("No active generation profile '{}'", ctx.config.active_profile),
    })?;
    if let Some(strategy) = strategy {
        config.strategy = strategy;
    }

    let outcome = generate_scripts(&mut set, &config).context("Script generation failed")?;

    // Persist acknowledged renames.
    ctx.db.save_binding_set(&set).context("Failed to save binding set")?;

    println!("Generated scripts for '{}':", template);
    println!("  Class: {}", outcome.class_name);
    for path in &outcome.file_paths {
        println!("  Wrote: {}", path.display());
    }
    if outcome.rename.cleared > 0 {
        println!(
            "  Renames propagated: {} marker(s), {} token occurrence(s)",
            outcome.rename.cleared, outcome.rename.replacements
        );
    }
    for (original, emitted) in &outcome.forced_renames {
        println!("  Warning: duplicate field name '{original}' emitted as '{emitted}'");
    }

    Ok(())
}
