use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use uibind_core::db::{ProjectContext, TemplateRecord};
use uibind_core::scene::{TemplateAsset, TemplateAssetId};

use crate::{canonicalize_or_current, sha256_file};

/// Register a template asset YAML file with the project.
///
/// The file is validated, fingerprinted, and copied into the project's
/// `templates/` directory under its asset id. Re-registering an id replaces
/// the previous registration.
pub fn add_template_command(root: &str, file: &str) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = ProjectContext::from_root(&root_path)?;

    let input_path = Path::new(file);
    let abs_path =
        if input_path.is_absolute() { input_path.to_path_buf() } else { root_path.join(input_path) };
    if !abs_path.exists() {
        return Err(anyhow!("Template file does not exist: {}", abs_path.display()));
    }

    let text = fs::read_to_string(&abs_path)
        .with_context(|| format!("Failed to read template file {}", abs_path.display()))?;
    let asset = TemplateAsset::from_yaml(&text)
        .with_context(|| format!("Failed to parse template YAML {}", abs_path.display()))?;

    if asset.id.as_str().is_empty() {
        bail!("Template file has an empty asset id");
    }
    let dupes = asset.duplicate_stable_ids();
    if !dupes.is_empty() {
        let listed: Vec<String> = dupes.iter().map(ToString::to_string).collect();
        bail!("Template has duplicate stable ids: {}", listed.join(", "));
    }

    // Copy into templates/<asset-id>.yaml unless the source already is it.
    let canonical_path = ctx.layout.template_path(&asset.id);
    if abs_path != canonical_path {
        fs::create_dir_all(&ctx.layout.templates_dir).with_context(|| {
            format!("Failed to ensure templates dir {}", ctx.layout.templates_dir.display())
        })?;
        fs::copy(&abs_path, &canonical_path).with_context(|| {
            format!("Failed to copy template into {}", canonical_path.display())
        })?;
    }

    let fingerprint = sha256_file(&canonical_path)?;
    let rel_path = canonical_path
        .strip_prefix(&ctx.layout.root)
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| canonical_path.to_string_lossy().to_string());

    let record = TemplateRecord {
        asset_id: asset.id.as_str().to_string(),
        path: rel_path,
        fingerprint,
        registered_at: Utc::now().to_rfc3339(),
    };
    ctx.db.upsert_template(&record).context("Failed to register template record")?;

    println!("Registered template:");
    println!("  Id: {}", asset.id);
    println!("  Root node: {} (stable id {})", asset.root.name, asset.root.stable_id);
    println!("  Nodes: {}", asset.nodes().len());
    println!("  Path: {}", record.path);
    println!("  Fingerprint: {}", record.fingerprint);

    Ok(())
}

/// List all template assets registered in the project database.
pub fn list_templates_command(root: &str, json: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = ProjectContext::from_root(&root_path)?;

    let templates = ctx.db.list_templates().context("Failed to list templates")?;

    if json {
        let serialized = serde_json::to_string_pretty(&templates)?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("Templates ({}):", templates.len());
    if templates.is_empty() {
        println!("  (none)");
        return Ok(());
    }
    for record in templates {
        println!("  - {} path={} fingerprint={}", record.asset_id, record.path, record.fingerprint);
    }

    Ok(())
}

/// Load a registered template asset by id, parsing its YAML from disk.
pub fn load_template(ctx: &ProjectContext, id: &TemplateAssetId) -> Result<TemplateAsset> {
    let record = ctx
        .db
        .template(id)
        .context("Failed to query template record")?
        .ok_or_else(|| anyhow!("Template '{id}' is not registered; run add-template first"))?;

    let path = {
        let p = Path::new(&record.path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            ctx.layout.root.join(p)
        }
    };
    let text = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read template file {}", path.display()))?;
    let asset = TemplateAsset::from_yaml(&text)
        .with_context(|| format!("Failed to parse template YAML {}", path.display()))?;

    if &asset.id != id {
        bail!("Template file {} declares id '{}', expected '{}'", path.display(), asset.id, id);
    }
    Ok(asset)
}
