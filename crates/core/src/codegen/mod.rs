//! Code synthesis: turn a binding set plus a generation configuration into
//! C# source files on disk.
//!
//! The synthesizer validates everything up front (no partial writes after
//! validation passes), runs rename propagation against the companion file,
//! then emits the binding-declaration file in one of three structural styles
//! and, on first generation only, a companion logic file from template text.

pub mod emit;
pub mod events;
pub mod rename;

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::model::{BindingEntry, BindingSet};
use crate::names;

pub use events::{handler_method_name, InteractiveKind};
pub use rename::{propagate_renames, RenameOutcome};

/// Structural style relating generated binding code to hand-written logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CombineStrategy {
    /// A base type the hand-written logic class derives from.
    #[default]
    BaseClassInherit,
    /// The generated half of a partial type; the logic half is hand-written.
    PartialClass,
    /// One complete type with fields, initialization, and event handling.
    SingleScript,
}

impl std::str::FromStr for CombineStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "base-class-inherit" | "base" => Ok(Self::BaseClassInherit),
            "partial-class" | "partial" => Ok(Self::PartialClass),
            "single-script" | "single" => Ok(Self::SingleScript),
            other => Err(format!("unknown combination strategy '{other}'")),
        }
    }
}

/// Generation parameters, supplied per invocation and owned by the caller.
///
/// There is deliberately no ambient settings lookup in here; the host builds
/// this from its own configuration and passes it in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub strategy: CombineStrategy,
    pub use_namespace: bool,
    pub namespace: String,
    /// Literal text of the generated type's base-type clause, may be empty.
    pub base_types: String,
    /// Folder the binding-declaration file is written to.
    pub output_folder: PathBuf,
    /// Folder of the hand-written companion file, when one is expected.
    pub logic_folder: Option<PathBuf>,
    /// Template text file used to seed the companion on first generation.
    pub template_file: Option<PathBuf>,
    /// Root every output folder must live under.
    pub project_root: PathBuf,
}

/// Error type for generation preconditions and IO.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// No generation configuration could be resolved for the invocation.
    #[error("no generation configuration is available")]
    MissingConfiguration,

    /// The output folder escapes the caller-defined project root.
    #[error("output folder '{}' is not under the project root", .folder.display())]
    InvalidOutputFolder { folder: PathBuf },

    /// Namespace emission requested with no namespace name configured.
    #[error("namespace use is enabled but no namespace name is configured")]
    NamespaceRequiredButEmpty,

    /// Generation was requested with zero enabled bindings.
    #[error("the binding set has no enabled bindings")]
    NoEnabledBindings,

    #[error("failed to read or write {}: {source}", .path.display())]
    Io { path: PathBuf, source: std::io::Error },
}

/// What a generation run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub class_name: String,
    pub file_paths: Vec<PathBuf>,
    pub rename: RenameOutcome,
    /// (stored name, emitted name) pairs where the unique-name projection
    /// had to rename a duplicate for this run only.
    pub forced_renames: Vec<(String, String)>,
}

/// Placeholder substituted with the class name in companion template text.
pub const CLASS_NAME_PLACEHOLDER: &str = "<ClassName>";

/// Validate a configuration against its project root. Surfaced before any
/// file write; generation never starts with a bad config.
pub fn validate_config(config: &GenerationConfig) -> Result<(), GenerateError> {
    if !config.output_folder.starts_with(&config.project_root) {
        return Err(GenerateError::InvalidOutputFolder { folder: config.output_folder.clone() });
    }
    if let Some(logic) = &config.logic_folder {
        if !logic.starts_with(&config.project_root) {
            return Err(GenerateError::InvalidOutputFolder { folder: logic.clone() });
        }
    }
    if config.use_namespace && config.namespace.trim().is_empty() {
        return Err(GenerateError::NamespaceRequiredButEmpty);
    }
    Ok(())
}

/// Build the unique-name projection of a set's entries.
///
/// Entries are walked in stored order; a field name colliding
/// (case-insensitively) with one already seen gets an integer-suffixed name
/// *in the projection only* — the persisted set is never silently mutated.
/// Each forced rename is recorded as a diagnostic.
pub fn unique_name_projection(set: &BindingSet) -> (Vec<BindingEntry>, Vec<(String, String)>) {
    let mut seen: Vec<String> = Vec::new();
    let mut projection = Vec::with_capacity(set.entries.len());
    let mut forced = Vec::new();

    for entry in &set.entries {
        let mut projected = entry.clone();
        let lowered = projected.field_name.to_lowercase();
        if seen.contains(&lowered) {
            let mut suffix = 1u32;
            let base = projected.field_name.clone();
            loop {
                let attempt = format!("{base}{suffix}");
                if !seen.contains(&attempt.to_lowercase()) {
                    warn!(
                        original = %base,
                        renamed = %attempt,
                        "duplicate field name adjusted for this generation only"
                    );
                    forced.push((base.clone(), attempt.clone()));
                    projected.field_name = attempt;
                    break;
                }
                suffix += 1;
            }
        }
        seen.push(projected.field_name.to_lowercase());
        projection.push(projected);
    }

    (projection, forced)
}

/// File name of the binding-declaration file for a strategy.
pub fn binding_script_name(class_name: &str, strategy: CombineStrategy) -> String {
    match strategy {
        CombineStrategy::BaseClassInherit => format!("{class_name}Base.cs"),
        CombineStrategy::PartialClass => format!("{class_name}.Bind.cs"),
        CombineStrategy::SingleScript => format!("{class_name}.cs"),
    }
}

fn render_for_strategy(
    projection: &[BindingEntry],
    config: &GenerationConfig,
    class_name: &str,
    root_display_name: &str,
) -> String {
    match config.strategy {
        CombineStrategy::BaseClassInherit => {
            emit::render_base_class(projection, config, class_name, root_display_name)
        }
        CombineStrategy::PartialClass => {
            emit::render_partial_class(projection, config, class_name, root_display_name)
        }
        CombineStrategy::SingleScript => {
            emit::render_single_script(projection, config, class_name, root_display_name)
        }
    }
}

/// Generate scripts for a binding set.
///
/// Runs, in order: validation, rename propagation against an existing
/// companion file, binding-declaration emission, and first-time companion
/// creation from template text. The set is mutated only to acknowledge
/// propagated renames.
pub fn generate_scripts(
    set: &mut BindingSet,
    config: &GenerationConfig,
) -> Result<GenerationOutcome, GenerateError> {
    validate_config(config)?;
    if set.enabled_count() == 0 {
        return Err(GenerateError::NoEnabledBindings);
    }

    let class_name = names::class_name_for(&set.root_display_name);

    // Propagate pending renames into the companion before anything else, so
    // hand-written code keeps compiling against the new names even if the
    // rest of this run fails.
    let mut rename_outcome = RenameOutcome::default();
    let companion_path =
        config.logic_folder.as_ref().map(|folder| folder.join(format!("{class_name}.cs")));
    if let Some(path) = &companion_path {
        rename_outcome = propagate_renames(set, path)?;
    }

    let (projection, forced) = unique_name_projection(set);
    let code = render_for_strategy(&projection, config, &class_name, &set.root_display_name);

    fs::create_dir_all(&config.output_folder)
        .map_err(|source| GenerateError::Io { path: config.output_folder.clone(), source })?;
    let binding_path = config.output_folder.join(binding_script_name(&class_name, config.strategy));
    fs::write(&binding_path, &code)
        .map_err(|source| GenerateError::Io { path: binding_path.clone(), source })?;
    info!(path = %binding_path.display(), "wrote binding script");

    let mut file_paths = vec![binding_path];

    if let Some(written) = write_companion_if_missing(config, &class_name, companion_path)? {
        file_paths.push(written);
    }

    Ok(GenerationOutcome { class_name, file_paths, rename: rename_outcome, forced_renames: forced })
}

/// Write the companion logic file from template text, only when a template is
/// configured and no companion exists yet. Subsequent generations never
/// overwrite it.
fn write_companion_if_missing(
    config: &GenerationConfig,
    class_name: &str,
    companion_path: Option<PathBuf>,
) -> Result<Option<PathBuf>, GenerateError> {
    let (Some(template_file), Some(path)) = (&config.template_file, companion_path) else {
        return Ok(None);
    };
    if path.exists() {
        info!(path = %path.display(), "companion script already exists, skipping");
        return Ok(None);
    }

    let template_text = fs::read_to_string(template_file)
        .map_err(|source| GenerateError::Io { path: template_file.clone(), source })?;
    let companion = template_text.replace(CLASS_NAME_PLACEHOLDER, class_name);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|source| GenerateError::Io { path: parent.to_path_buf(), source })?;
    }
    fs::write(&path, companion)
        .map_err(|source| GenerateError::Io { path: path.clone(), source })?;
    info!(path = %path.display(), "wrote companion script from template");
    Ok(Some(path))
}

/// Convenience for hosts resolving a profile by name: absent profile means
/// the invocation has no configuration at all.
pub fn require_config(config: Option<GenerationConfig>) -> Result<GenerationConfig, GenerateError> {
    config.ok_or(GenerateError::MissingConfiguration)
}
