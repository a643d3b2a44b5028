use anyhow::Result;
use clap::{Parser, Subcommand};
use uibind::commands::{
    add_template_command, bind_command, generate_command, init_project_command,
    list_bindings_command, list_sets_command, list_templates_command, project_info_command,
    refresh_command, rename_command, set_enabled_command, unbind_command,
};
use uibind_core::model::Visibility;

/// UI binding registry and script generator CLI.
///
/// This CLI is a thin wrapper around `uibind-core` (exposed in code as
/// `uibind_core`). All substantive logic lives in the library so it can be
/// tested thoroughly and reused from other frontends.
#[derive(Parser, Debug)]
#[command(
    name = "uibind",
    version,
    about = "Binding registry and script generator for UI template assets",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new UI bind project at the given root.
    ///
    /// This will:
    /// - Create a `.uibind` metadata directory and the project database.
    /// - Create `templates`, `generated`, and `scripts` directories.
    /// - Write a `.uibind/project.json` config file with default settings.
    InitProject {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Optional project name. If omitted, derived from the root directory.
        #[arg(long)]
        name: Option<String>,
    },

    /// Show basic information about an existing UI bind project.
    ProjectInfo {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,
    },

    /// Register a template asset YAML file in the project.
    ///
    /// The file is validated, fingerprinted, and copied into `templates/`.
    AddTemplate {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Path to the template asset YAML file.
        #[arg(long)]
        file: String,
    },

    /// List all registered template assets.
    ListTemplates {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Declare a binding for a capability on a template node.
    Bind {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Template asset id.
        #[arg(long)]
        template: String,

        /// Node path below the template root (e.g. `Buttons/Submit`), or
        /// `[ROOT]` for the root node itself.
        #[arg(long)]
        node: String,

        /// Qualified capability type name (e.g. `UnityEngine.UI.Button`).
        #[arg(long)]
        capability: String,

        /// Field name. If omitted, a default is synthesized from the prefix
        /// policy and the node name.
        #[arg(long)]
        name: Option<String>,

        /// Field visibility: private, protected, or public.
        #[arg(long, default_value = "private")]
        visibility: Visibility,

        /// Create the binding disabled (excluded from generation).
        #[arg(long, default_value_t = false)]
        disabled: bool,
    },

    /// Remove a binding.
    Unbind {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Template asset id.
        #[arg(long)]
        template: String,

        /// Stable id of the bound node.
        #[arg(long)]
        node_id: u64,

        /// Qualified capability type name.
        #[arg(long)]
        capability: String,
    },

    /// Rename a binding's generated field.
    ///
    /// The previous name is kept as pending-rename state and propagated into
    /// the companion script on the next generation.
    Rename {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Template asset id.
        #[arg(long)]
        template: String,

        /// Stable id of the bound node.
        #[arg(long)]
        node_id: u64,

        /// Qualified capability type name.
        #[arg(long)]
        capability: String,

        /// New field name.
        #[arg(long)]
        name: String,
    },

    /// Enable or disable a binding's participation in generation.
    SetEnabled {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Template asset id.
        #[arg(long)]
        template: String,

        /// Stable id of the bound node.
        #[arg(long)]
        node_id: u64,

        /// Qualified capability type name.
        #[arg(long)]
        capability: String,

        /// Whether the binding participates in generation.
        #[arg(long, action = clap::ArgAction::Set)]
        enabled: bool,
    },

    /// List the bindings declared for one template.
    ListBindings {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Template asset id.
        #[arg(long)]
        template: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List all binding sets known to the project.
    ListSets {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Re-derive binding paths after the template file was restructured.
    ///
    /// Entries whose stable id can no longer be found are reported, never
    /// deleted.
    Refresh {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Template asset id.
        #[arg(long)]
        template: String,
    },

    /// Generate binding scripts for one template's binding set.
    ///
    /// Pending field renames are propagated into the companion script first.
    Generate {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Template asset id.
        #[arg(long)]
        template: String,

        /// Generation profile name. Defaults to the project's active profile.
        #[arg(long)]
        profile: Option<String>,

        /// Override the profile's combination strategy for this run
        /// (base-class-inherit, partial-class, or single-script).
        #[arg(long)]
        strategy: Option<uibind_core::codegen::CombineStrategy>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::InitProject { root, name } => init_project_command(&root, name)?,
        Command::ProjectInfo { root } => project_info_command(&root)?,
        Command::AddTemplate { root, file } => add_template_command(&root, &file)?,
        Command::ListTemplates { root, json } => list_templates_command(&root, json)?,
        Command::Bind { root, template, node, capability, name, visibility, disabled } => {
            bind_command(&root, &template, &node, &capability, name, visibility, disabled)?
        }
        Command::Unbind { root, template, node_id, capability } => {
            unbind_command(&root, &template, node_id, &capability)?
        }
        Command::Rename { root, template, node_id, capability, name } => {
            rename_command(&root, &template, node_id, &capability, &name)?
        }
        Command::SetEnabled { root, template, node_id, capability, enabled } => {
            set_enabled_command(&root, &template, node_id, &capability, enabled)?
        }
        Command::ListBindings { root, template, json } => {
            list_bindings_command(&root, &template, json)?
        }
        Command::ListSets { root, json } => list_sets_command(&root, json)?,
        Command::Refresh { root, template } => refresh_command(&root, &template)?,
        Command::Generate { root, template, profile, strategy } => {
            generate_command(&root, &template, profile, strategy)?
        }
    }

    Ok(())
}
