use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::types::Type;
use rusqlite::{Connection, Params};
use tracing::{debug, info};

use crate::catalog::database::ModDatabase;
use crate::catalog::error::StorageError;
use crate::catalog::types::{Artifact, Mod, VersionType};

const MOD_COLUMNS: &str = "SELECT id, name, description, author, icon_url FROM mods";

pub struct SqliteDatabase {
    conn: Mutex<Connection>,
}

impl SqliteDatabase {
    pub fn new(db_path: &Path) -> Result<Self, StorageError> {
        info!("Initializing catalog database at {:?}", db_path);

        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        let database = Self {
            conn: Mutex::new(conn),
        };

        database.create_schema()?;
        info!("Catalog database initialized successfully");

        Ok(database)
    }

    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    fn create_schema(&self) -> Result<(), StorageError> {
        debug!("Creating catalog schema");

        let conn = self.lock_conn()?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS mods (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                author TEXT NOT NULL DEFAULT '',
                icon_url TEXT,
                updated_at INTEGER NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS artifacts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                mod_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                version TEXT NOT NULL,
                compatibility TEXT,
                download_url TEXT NOT NULL DEFAULT '',
                version_type TEXT NOT NULL DEFAULT 'release',
                FOREIGN KEY (mod_id) REFERENCES mods(id) ON DELETE CASCADE
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_artifacts_mod_id ON artifacts(mod_id)",
            [],
        )?;

        Ok(())
    }

    /// Replace the whole catalog with `mods` in a single transaction
    pub fn replace_mods(&self, mods: &[Mod]) -> Result<(), StorageError> {
        let now = chrono::Utc::now().timestamp_millis();
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM artifacts", [])?;
        tx.execute("DELETE FROM mods", [])?;

        {
            let mut insert_mod = tx.prepare(
                r#"
                INSERT INTO mods (id, name, description, author, icon_url, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )?;
            let mut insert_artifact = tx.prepare(
                r#"
                INSERT INTO artifacts
                    (mod_id, position, version, compatibility, download_url, version_type)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )?;

            for entry in mods {
                insert_mod.execute((
                    &entry.id,
                    &entry.name,
                    &entry.description,
                    &entry.author,
                    &entry.icon_url,
                    now,
                ))?;

                for (position, artifact) in entry.artifacts.iter().enumerate() {
                    insert_artifact.execute((
                        &entry.id,
                        position as i64,
                        &artifact.version,
                        &artifact.compatibility,
                        &artifact.download_url,
                        artifact.version_type.as_str(),
                    ))?;
                }
            }
        }

        tx.commit()?;
        info!("Stored {} mods in catalog", mods.len());

        Ok(())
    }

    /// Load mods selected by `sql` (which must select `MOD_COLUMNS`) with their artifacts
    fn load_mods<P: Params>(
        conn: &Connection,
        sql: &str,
        params: P,
    ) -> Result<Vec<Mod>, StorageError> {
        let mut stmt = conn.prepare(sql)?;
        let mut mods = stmt
            .query_map(params, |row| {
                Ok(Mod {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                    author: row.get(3)?,
                    icon_url: row.get(4)?,
                    artifacts: Vec::new(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut artifact_stmt = conn.prepare(
            r#"
            SELECT version, compatibility, download_url, version_type FROM artifacts
            WHERE mod_id = ?1
            ORDER BY position
            "#,
        )?;

        for entry in &mut mods {
            entry.artifacts = artifact_stmt
                .query_map([&entry.id], |row| {
                    let version_type: String = row.get(3)?;
                    let version_type = version_type.parse::<VersionType>().map_err(|_| {
                        rusqlite::Error::FromSqlConversionFailure(
                            3,
                            Type::Text,
                            format!("unknown version type {version_type:?}").into(),
                        )
                    })?;
                    Ok(Artifact {
                        version: row.get(0)?,
                        compatibility: row.get(1)?,
                        download_url: row.get(2)?,
                        version_type,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
        }

        Ok(mods)
    }
}

impl ModDatabase for SqliteDatabase {
    fn query_mods(&self, name: &str) -> Result<Vec<Mod>, StorageError> {
        let pattern = format!("%{}%", escape_like(name.trim()));
        let conn = self.lock_conn()?;
        Self::load_mods(
            &conn,
            &format!(
                "{MOD_COLUMNS} WHERE id LIKE ?1 ESCAPE '\\' OR name LIKE ?1 ESCAPE '\\' ORDER BY name"
            ),
            [pattern],
        )
    }

    fn get_mod_by_id(&self, id: &str) -> Result<Option<Mod>, StorageError> {
        let conn = self.lock_conn()?;
        let mods = Self::load_mods(&conn, &format!("{MOD_COLUMNS} WHERE id = ?1"), [id])?;
        Ok(mods.into_iter().next())
    }

    fn get_all_mods(&self) -> Result<Vec<Mod>, StorageError> {
        let conn = self.lock_conn()?;
        Self::load_mods(&conn, &format!("{MOD_COLUMNS} ORDER BY name"), [])
    }
}

/// Make `%` and `_` match literally in a `LIKE ... ESCAPE '\'` pattern
fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for c in fragment.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
