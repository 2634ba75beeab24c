use anyhow::Context as _;
use rusqlite::{Connection, OptionalExtension as _, params};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use taskhub_domain::SelectionStoreService;

const LATEST_SCHEMA_VERSION: u32 = 1;
const SELECTED_WORKSPACE_KEY: &str = "workspace";

const MIGRATIONS: &[(u32, &str)] = &[(
    1,
    include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/migrations/0001_init.sql"
    )),
)];

/// Durable key-value store for client-side settings, currently holding the
/// last-selected workspace record under a fixed key.
pub struct SqliteSelectionStore {
    conn: Mutex<Connection>,
}

impl SqliteSelectionStore {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        apply_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_default() -> anyhow::Result<Self> {
        Self::open(&default_db_path()?)
    }
}

fn default_db_path() -> anyhow::Result<PathBuf> {
    if let Some(dir) = std::env::var_os("TASKHUB_DATA_DIR") {
        return Ok(PathBuf::from(dir).join("client.sqlite3"));
    }
    let home = std::env::var_os("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".taskhub").join("client.sqlite3"))
}

fn apply_migrations(conn: &Connection) -> anyhow::Result<()> {
    let version: u32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .context("failed to read schema version")?;

    if version > LATEST_SCHEMA_VERSION {
        anyhow::bail!("client settings db is newer than this build ({version})");
    }

    for (target, sql) in MIGRATIONS {
        if *target > version {
            conn.execute_batch(sql)
                .with_context(|| format!("failed to apply migration {target}"))?;
            conn.pragma_update(None, "user_version", target)
                .with_context(|| format!("failed to record migration {target}"))?;
        }
    }
    Ok(())
}

impl SelectionStoreService for SqliteSelectionStore {
    fn read_selection(&self) -> Result<Option<String>, String> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| "selection store lock poisoned".to_owned())?;
        conn.query_row(
            "SELECT value FROM client_settings WHERE key = ?1",
            params![SELECTED_WORKSPACE_KEY],
            |row| row.get(0),
        )
        .optional()
        .map_err(|err| format!("failed to read persisted selection: {err}"))
    }

    fn write_selection(&self, raw: String) -> Result<(), String> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| "selection store lock poisoned".to_owned())?;
        conn.execute(
            "INSERT INTO client_settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![SELECTED_WORKSPACE_KEY, raw],
        )
        .map_err(|err| format!("failed to write persisted selection: {err}"))?;
        Ok(())
    }
}
