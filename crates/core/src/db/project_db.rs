use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

use crate::model::{BindingEntry, BindingSet, Visibility};
use crate::scene::{StableId, TemplateAssetId};

/// Minimum schema version we know how to handle.
///
/// `0` means "no schema yet" (fresh DB).
const MIN_SUPPORTED_SCHEMA_VERSION: i32 = 0;

/// Latest schema version this crate knows about.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Error type for project database operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// Underlying SQLite error.
    #[error("SQLite error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// The database was created with a newer schema version than we support.
    #[error(
        "Unsupported schema version {found}; supported range is {min_supported}..={max_supported}"
    )]
    UnsupportedSchemaVersion { found: i32, min_supported: i32, max_supported: i32 },
}

/// Convenience result type for DB operations.
pub type DbResult<T> = Result<T, DbError>;

/// Record describing a template asset registered with the project.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TemplateRecord {
    /// The asset's own identity, from its YAML description.
    pub asset_id: String,
    /// Path of the registered YAML file, relative to the project root.
    pub path: String,
    /// SHA-256 fingerprint of the file content at registration time.
    pub fingerprint: String,
    pub registered_at: String,
}

/// SQLite-backed project database.
///
/// This is a thin wrapper around `rusqlite::Connection` that is responsible
/// for:
/// - Opening/creating the DB file.
/// - Applying schema migrations.
/// - Loading and saving binding sets whole (the set is the unit of
///   consistency; every save replaces the set's entries in one transaction).
#[derive(Debug)]
pub struct ProjectDb {
    conn: Connection,
}

impl ProjectDb {
    /// Open (or create) a project database at the given path and ensure the
    /// schema exists.
    pub fn open(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        apply_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Expose a reference to the underlying connection for advanced callers.
    /// For most code, prefer the higher-level helpers.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Register a template asset record, replacing a previous registration of
    /// the same asset id. Returns the row id.
    pub fn upsert_template(&self, record: &TemplateRecord) -> DbResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO template_assets (asset_id, path, fingerprint, registered_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(asset_id) DO UPDATE SET
                path = excluded.path,
                fingerprint = excluded.fingerprint,
                registered_at = excluded.registered_at
            "#,
            params![record.asset_id, record.path, record.fingerprint, record.registered_at],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// List all registered template assets (ordered by id).
    pub fn list_templates(&self) -> DbResult<Vec<TemplateRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT asset_id, path, fingerprint, registered_at
            FROM template_assets
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(TemplateRecord {
                asset_id: row.get(0)?,
                path: row.get(1)?,
                fingerprint: row.get(2)?,
                registered_at: row.get(3)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Look up one registered template by asset id.
    pub fn template(&self, asset_id: &TemplateAssetId) -> DbResult<Option<TemplateRecord>> {
        self.conn
            .query_row(
                r#"
                SELECT asset_id, path, fingerprint, registered_at
                FROM template_assets
                WHERE asset_id = ?1
                "#,
                params![asset_id.as_str()],
                |row| {
                    Ok(TemplateRecord {
                        asset_id: row.get(0)?,
                        path: row.get(1)?,
                        fingerprint: row.get(2)?,
                        registered_at: row.get(3)?,
                    })
                },
            )
            .optional()
            .map_err(DbError::from)
    }

    /// Save a binding set whole: the set row is upserted and its entries are
    /// replaced, all inside one transaction.
    pub fn save_binding_set(&self, set: &BindingSet) -> DbResult<()> {
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            r#"
            INSERT INTO binding_sets
                (template_asset_id, root_stable_id, root_path, root_name, created_at, modified_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(template_asset_id) DO UPDATE SET
                root_stable_id = excluded.root_stable_id,
                root_path = excluded.root_path,
                root_name = excluded.root_name,
                modified_at = excluded.modified_at
            "#,
            params![
                set.template_asset_id.as_str(),
                set.root_stable_id.0 as i64,
                set.root_path_in_scene,
                set.root_display_name,
                set.created_at,
                set.modified_at
            ],
        )?;

        let set_id: i64 = tx.query_row(
            "SELECT id FROM binding_sets WHERE template_asset_id = ?1",
            params![set.template_asset_id.as_str()],
            |row| row.get(0),
        )?;

        tx.execute("DELETE FROM binding_entries WHERE set_id = ?1", params![set_id])?;

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO binding_entries
                    (set_id, position, target_stable_id, target_path_absolute,
                     target_path_relative, target_display_name, capability_short,
                     capability_qualified, field_name, previous_field_name,
                     visibility, enabled)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                "#,
            )?;
            for (position, entry) in set.entries.iter().enumerate() {
                stmt.execute(params![
                    set_id,
                    position as i64,
                    entry.target_stable_id.0 as i64,
                    entry.target_path_absolute,
                    entry.target_path_relative,
                    entry.target_display_name,
                    entry.capability_short_name,
                    entry.capability_qualified_name,
                    entry.field_name,
                    entry.previous_field_name,
                    entry.visibility.to_i32(),
                    i32::from(entry.enabled)
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Load the binding set for a template asset, entries in stored order.
    pub fn load_binding_set(&self, asset_id: &TemplateAssetId) -> DbResult<Option<BindingSet>> {
        let header = self
            .conn
            .query_row(
                r#"
                SELECT id, root_stable_id, root_path, root_name, created_at, modified_at
                FROM binding_sets
                WHERE template_asset_id = ?1
                "#,
                params![asset_id.as_str()],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                    ))
                },
            )
            .optional()?;

        let Some((set_id, root_stable_id, root_path, root_name, created_at, modified_at)) = header
        else {
            return Ok(None);
        };

        let mut set = BindingSet {
            template_asset_id: asset_id.clone(),
            root_stable_id: StableId(root_stable_id as u64),
            root_path_in_scene: root_path,
            root_display_name: root_name,
            created_at,
            modified_at,
            entries: Vec::new(),
        };
        set.entries = self.load_entries(set_id)?;
        Ok(Some(set))
    }

    /// Load all binding sets known to the project.
    pub fn list_binding_sets(&self) -> DbResult<Vec<BindingSet>> {
        let ids: Vec<String> = {
            let mut stmt = self
                .conn
                .prepare("SELECT template_asset_id FROM binding_sets ORDER BY id")?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            let mut out = Vec::new();
            for row in rows {
                out.push(row?);
            }
            out
        };

        let mut sets = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(set) = self.load_binding_set(&TemplateAssetId(id))? {
                sets.push(set);
            }
        }
        Ok(sets)
    }

    /// Delete a binding set and its entries. Returns whether a set existed.
    ///
    /// This is the explicit external deletion the model never performs on
    /// its own.
    pub fn delete_binding_set(&self, asset_id: &TemplateAssetId) -> DbResult<bool> {
        let affected = self.conn.execute(
            "DELETE FROM binding_sets WHERE template_asset_id = ?1",
            params![asset_id.as_str()],
        )?;
        Ok(affected > 0)
    }

    fn load_entries(&self, set_id: i64) -> DbResult<Vec<BindingEntry>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT target_stable_id, target_path_absolute, target_path_relative,
                   target_display_name, capability_short, capability_qualified,
                   field_name, previous_field_name, visibility, enabled
            FROM binding_entries
            WHERE set_id = ?1
            ORDER BY position
            "#,
        )?;
        let rows = stmt.query_map(params![set_id], |row| {
            Ok(BindingEntry {
                target_stable_id: StableId(row.get::<_, i64>(0)? as u64),
                target_path_absolute: row.get(1)?,
                target_path_relative: row.get(2)?,
                target_display_name: row.get(3)?,
                capability_short_name: row.get(4)?,
                capability_qualified_name: row.get(5)?,
                field_name: row.get(6)?,
                previous_field_name: row.get(7)?,
                visibility: Visibility::from_i32(row.get(8)?),
                enabled: row.get::<_, i32>(9)? != 0,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

/// Apply schema migrations to bring the database to the latest version.
///
/// We use `PRAGMA user_version` as the schema version indicator.
///
/// Version map:
/// - 0: no schema
/// - 1: initial schema (template_assets, binding_sets, binding_entries)
fn apply_migrations(conn: &Connection) -> DbResult<()> {
    let current_version = current_schema_version(conn)?;

    // Reject DBs created with a newer schema than we support.
    if current_version > CURRENT_SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            found: current_version,
            min_supported: MIN_SUPPORTED_SCHEMA_VERSION,
            max_supported: CURRENT_SCHEMA_VERSION,
        });
    }

    if current_version == 0 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS template_assets (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                asset_id      TEXT NOT NULL UNIQUE,
                path          TEXT NOT NULL,
                fingerprint   TEXT NOT NULL,
                registered_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS binding_sets (
                id                INTEGER PRIMARY KEY AUTOINCREMENT,
                template_asset_id TEXT NOT NULL UNIQUE,
                root_stable_id    INTEGER NOT NULL,
                root_path         TEXT NOT NULL,
                root_name         TEXT NOT NULL,
                created_at        TEXT NOT NULL,
                modified_at       TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS binding_entries (
                id                   INTEGER PRIMARY KEY AUTOINCREMENT,
                set_id               INTEGER NOT NULL
                                     REFERENCES binding_sets(id) ON DELETE CASCADE,
                position             INTEGER NOT NULL,
                target_stable_id     INTEGER NOT NULL,
                target_path_absolute TEXT NOT NULL,
                target_path_relative TEXT NOT NULL,
                target_display_name  TEXT NOT NULL,
                capability_short     TEXT NOT NULL,
                capability_qualified TEXT NOT NULL,
                field_name           TEXT NOT NULL,
                previous_field_name  TEXT NOT NULL,
                visibility           INTEGER NOT NULL,
                enabled              INTEGER NOT NULL
            );

            PRAGMA user_version = 1;
            COMMIT;
            "#,
        )?;
    }

    Ok(())
}

/// Read the SQLite schema version from `PRAGMA user_version`.
fn current_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    Ok(version)
}
