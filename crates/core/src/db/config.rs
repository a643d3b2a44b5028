use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::codegen::{CombineStrategy, GenerationConfig};
use crate::names::{PrefixMapping, PrefixPolicy};

/// Database configuration stored inside the project config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    /// Path to the project database file (typically relative to project root).
    pub path: String,
}

impl DbConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// One named set of generation settings.
///
/// Projects usually keep a profile per UI family (panels, dialogs, HUD
/// widgets) differing in folders and combination strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationProfile {
    pub name: String,
    pub strategy: CombineStrategy,
    /// Folder generated binding scripts land in, relative to project root.
    pub output_folder: String,
    /// Folder hand-written companion scripts live in, relative to project
    /// root. Empty disables companion handling for this profile.
    #[serde(default)]
    pub logic_folder: String,
    /// Template text file seeding the companion script on first generation.
    #[serde(default)]
    pub template_file: String,
    /// Literal base-type clause for the generated type, may be empty.
    #[serde(default)]
    pub base_types: String,
    #[serde(default)]
    pub use_namespace: bool,
    #[serde(default)]
    pub namespace: String,
}

impl GenerationProfile {
    /// The default profile created with a fresh project.
    pub fn default_panel() -> Self {
        Self {
            name: "Panel".to_string(),
            strategy: CombineStrategy::BaseClassInherit,
            output_folder: "generated".to_string(),
            logic_folder: "scripts".to_string(),
            template_file: String::new(),
            base_types: String::new(),
            use_namespace: false,
            namespace: String::new(),
        }
    }

    /// Resolve this profile into the per-invocation configuration the
    /// synthesizer consumes, anchoring relative folders at `project_root`.
    pub fn to_generation_config(&self, project_root: &Path) -> GenerationConfig {
        let resolve = |raw: &str| -> PathBuf {
            let path = Path::new(raw);
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                project_root.join(path)
            }
        };

        GenerationConfig {
            strategy: self.strategy,
            use_namespace: self.use_namespace,
            namespace: self.namespace.clone(),
            base_types: self.base_types.clone(),
            output_folder: resolve(&self.output_folder),
            logic_folder: (!self.logic_folder.is_empty()).then(|| resolve(&self.logic_folder)),
            template_file: (!self.template_file.is_empty()).then(|| resolve(&self.template_file)),
            project_root: project_root.to_path_buf(),
        }
    }
}

/// Serializable configuration describing a UI bind project.
///
/// This lives at `.uibind/project.json` in the project root. It is loaded
/// once by the frontend and passed by value into core calls; nothing in the
/// core reads it from ambient state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Human-friendly project name.
    pub name: String,
    /// Optional description / notes.
    pub description: Option<String>,
    /// Schema/config version. This is about the config format, not the tool.
    pub config_version: String,
    /// Database configuration (path is typically relative to project root).
    pub db: DbConfig,
    /// Capability-type-to-prefix rules for default field names.
    #[serde(default)]
    pub prefix_mappings: Vec<PrefixMapping>,
    /// Named generation profiles.
    #[serde(default)]
    pub profiles: Vec<GenerationProfile>,
    /// Name of the profile used when none is requested explicitly.
    #[serde(default)]
    pub active_profile: String,
}

impl ProjectConfig {
    /// Create a new project configuration using the given name and db path,
    /// seeded with the default prefix table and a default profile.
    pub fn new(name: impl Into<String>, db_path: impl Into<String>) -> Self {
        let default_profile = GenerationProfile::default_panel();
        Self {
            name: name.into(),
            description: None,
            config_version: "0.1.0".to_string(),
            db: DbConfig::new(db_path),
            prefix_mappings: PrefixPolicy::default().mappings,
            active_profile: default_profile.name.clone(),
            profiles: vec![default_profile],
        }
    }

    /// The prefix policy assembled from this config's mappings.
    pub fn prefix_policy(&self) -> PrefixPolicy {
        PrefixPolicy { mappings: self.prefix_mappings.clone() }
    }

    /// Look up a profile by name, or the active profile when `None`.
    pub fn profile(&self, name: Option<&str>) -> Option<&GenerationProfile> {
        let wanted = name.unwrap_or(&self.active_profile);
        self.profiles.iter().find(|p| p.name == wanted)
    }
}
