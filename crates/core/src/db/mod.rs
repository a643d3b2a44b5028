//! Project persistence: layout, configuration, and the SQLite-backed store
//! of binding sets and registered template assets.
//!
//! - `ProjectLayout`: computed paths for project directories/files.
//! - `ProjectConfig`: serializable project metadata and generation profiles.
//! - `ProjectDb`: a small SQLite wrapper with migrations.
//! - `ProjectContext`: layout + config + open db bundle.

mod config;
mod context;
mod layout;
mod project_db;
mod util;

pub use config::{DbConfig, GenerationProfile, ProjectConfig};
pub use context::ProjectContext;
pub use layout::ProjectLayout;
pub use project_db::{DbError, DbResult, ProjectDb, TemplateRecord, CURRENT_SCHEMA_VERSION};
pub use util::{load_project_config, open_project_db};
