use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use uibind_core::db::{load_project_config, ProjectConfig, ProjectDb, ProjectLayout};

use crate::{canonicalize_or_current, infer_project_name};

/// Initialize a new UI bind project at `root`.
pub fn init_project_command(root: &str, name: Option<String>) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = ProjectLayout::new(&root_path);

    // Derive project name if not provided.
    let project_name = match name {
        Some(n) => n,
        None => infer_project_name(&root_path),
    };

    // Ensure directories exist.
    fs::create_dir_all(&layout.meta_dir)
        .with_context(|| format!("Failed to create meta dir: {}", layout.meta_dir.display()))?;
    fs::create_dir_all(&layout.templates_dir).with_context(|| {
        format!("Failed to create templates dir: {}", layout.templates_dir.display())
    })?;
    fs::create_dir_all(&layout.generated_dir).with_context(|| {
        format!("Failed to create generated dir: {}", layout.generated_dir.display())
    })?;
    fs::create_dir_all(&layout.scripts_dir)
        .with_context(|| format!("Failed to create scripts dir: {}", layout.scripts_dir.display()))?;

    // Build project config with the default prefix table and profile.
    let db_path_rel = layout.db_path_relative_string();
    let config = ProjectConfig::new(&project_name, db_path_rel);

    // Serialize and write config JSON.
    let json = serde_json::to_string_pretty(&config)?;
    fs::write(&layout.project_config_path, json).with_context(|| {
        format!("Failed to write project config: {}", layout.project_config_path.display())
    })?;

    // Create the project database immediately so follow-on commands (and
    // tests) can rely on its presence.
    ProjectDb::open(&layout.db_path).with_context(|| {
        format!("Failed to initialize project database at {}", layout.db_path.display())
    })?;

    println!("Initialized UI bind project:");
    println!("  Name: {}", project_name);
    println!("  Root: {}", layout.root.display());
    println!("  Config: {}", layout.project_config_path.display());
    println!("  DB path (relative): {}", config.db.path);
    println!("  Templates dir: {}", layout.templates_dir.display());
    println!("  Generated dir: {}", layout.generated_dir.display());
    println!("  Scripts dir: {}", layout.scripts_dir.display());

    Ok(())
}

/// Show basic information about an existing project.
pub fn project_info_command(root: &str) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = ProjectLayout::new(&root_path);

    let config = load_project_config(&layout)?;

    println!("UI Bind Project Info");
    println!("====================");
    println!("Name: {}", config.name);
    println!("Root: {}", layout.root.display());
    println!("Config file: {}", layout.project_config_path.display());
    println!("Config version: {}", config.config_version);
    println!("DB path (config): {}", config.db.path);
    println!("Active profile: {}", config.active_profile);
    let profile_names: Vec<&str> = config.profiles.iter().map(|p| p.name.as_str()).collect();
    println!("Profiles: {}", profile_names.join(", "));
    println!();

    // Basic directory existence checks.
    println!("Directories:");
    print_dir_status("Meta dir (.uibind)", &layout.meta_dir);
    print_dir_status("Templates dir", &layout.templates_dir);
    print_dir_status("Generated dir", &layout.generated_dir);
    print_dir_status("Scripts dir", &layout.scripts_dir);

    Ok(())
}

/// Helper to print whether a directory exists.
fn print_dir_status(label: &str, path: &Path) {
    let exists = path.is_dir();
    println!("- {label}: {} ({})", if exists { "OK" } else { "MISSING" }, path.display());
}
