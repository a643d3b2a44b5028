use std::path::{Path, PathBuf};

use crate::scene::TemplateAssetId;

/// Logical layout of a project on disk.
///
/// This is derived from a chosen root path. It does *not* perform any IO
/// itself. The CLI or other frontends are responsible for actually creating
/// directories and files based on this layout.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    /// Root directory of the project.
    pub root: PathBuf,
    /// Directory for internal metadata (.uibind).
    pub meta_dir: PathBuf,
    /// Path to the project config file (JSON).
    pub project_config_path: PathBuf,
    /// Path to the project database file.
    pub db_path: PathBuf,
    /// Directory holding template asset descriptions (YAML).
    pub templates_dir: PathBuf,
    /// Default directory for generated binding scripts.
    pub generated_dir: PathBuf,
    /// Default directory for hand-written companion scripts.
    pub scripts_dir: PathBuf,
}

impl ProjectLayout {
    /// Compute the default layout for a project rooted at `root`.
    ///
    /// This does *not* touch the filesystem.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let meta_dir = root.join(".uibind");
        let project_config_path = meta_dir.join("project.json");
        let db_path = meta_dir.join("bindings.db");
        let templates_dir = root.join("templates");
        let generated_dir = root.join("generated");
        let scripts_dir = root.join("scripts");

        Self {
            root,
            meta_dir,
            project_config_path,
            db_path,
            templates_dir,
            generated_dir,
            scripts_dir,
        }
    }

    /// Compute a database path string suitable for storing in `ProjectConfig`,
    /// typically as a path relative to `root`.
    pub fn db_path_relative_string(&self) -> String {
        match self.db_path.strip_prefix(&self.root) {
            Ok(rel) => rel.to_string_lossy().to_string(),
            Err(_) => self.db_path.to_string_lossy().to_string(),
        }
    }

    /// Canonical on-disk location for a registered template asset.
    pub fn template_path(&self, id: &TemplateAssetId) -> PathBuf {
        self.templates_dir.join(format!("{}.yaml", id.as_str()))
    }
}
