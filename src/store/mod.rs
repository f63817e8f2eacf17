mod models;
mod tabs;

pub use models::*;
pub use tabs::*;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};

use crate::config;

/// Key holding the JSON-encoded tab collection. Kept identical to the
/// key the original web editor used, so backups stay interchangeable.
pub const TABS_KEY: &str = "easyGuitarTabs";

/// Key holding the persisted theme mode (`"dark"` or `"light"`).
pub const THEME_KEY: &str = "easyGuitarTabs-theme";

/// Opaque key-value store backed by `SQLite`.
///
/// The editor treats persistence as `get(key)`/`set(key, value)` over
/// text values; everything structured lives in the values as JSON.
pub struct Store {
    pub conn: Connection,
}

impl Store {
    pub fn open() -> Result<Self> {
        let db_path = config::db_path()?;
        let conn = Connection::open(&db_path)
            .with_context(|| format!("failed to open database at {}", db_path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Ok(Store { conn })
    }

    /// In-memory store, used by tests and available for tooling.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Store { conn })
    }

    pub fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    /// Persisted theme mode; unknown or missing values fall back to dark.
    pub fn theme_mode(&self) -> ThemeMode {
        self.kv_get(THEME_KEY)
            .ok()
            .flatten()
            .map_or(ThemeMode::Dark, |s| ThemeMode::from_str(&s))
    }

    pub fn set_theme_mode(&self, mode: ThemeMode) -> Result<()> {
        self.kv_set(THEME_KEY, mode.as_str())
    }
}
