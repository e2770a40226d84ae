//! Settings persistence.
//!
//! The last-used hedge settings are kept in a single-row SQLite table so a
//! restart picks up where the previous run left off. The payload is stored
//! as JSON; only the row shape is schema.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Hedge settings as last used, surviving restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSettings {
    pub symbol: String,
    pub poll_interval_ms: u64,
    pub exposure_threshold: Decimal,
    pub lock_timeout_ms: u64,
}

pub struct SettingsStore {
    conn: Connection,
}

impl SettingsStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        let conn = Connection::open(path.as_ref())
            .with_context(|| format!("failed to open {}", path.as_ref().display()))?;
        Self::init(conn)
    }

    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS hedge_settings (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                payload TEXT NOT NULL,
                saved_at TEXT NOT NULL
            )",
            [],
        )
        .context("failed to create hedge_settings table")?;
        Ok(Self { conn })
    }

    pub fn save(&self, settings: &PersistedSettings) -> Result<()> {
        let payload = serde_json::to_string(settings)?;
        self.conn
            .execute(
                "INSERT INTO hedge_settings (id, payload, saved_at)
                 VALUES (1, ?1, ?2)
                 ON CONFLICT (id) DO UPDATE SET
                     payload = excluded.payload,
                     saved_at = excluded.saved_at",
                rusqlite::params![payload, Utc::now().to_rfc3339()],
            )
            .context("failed to save settings")?;
        debug!(symbol = %settings.symbol, "settings saved");
        Ok(())
    }

    /// The last saved settings and when they were saved, if any.
    pub fn load(&self) -> Result<Option<(PersistedSettings, DateTime<Utc>)>> {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT payload, saved_at FROM hedge_settings WHERE id = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .context("failed to load settings")?;

        let Some((payload, saved_at)) = row else {
            return Ok(None);
        };
        let settings: PersistedSettings =
            serde_json::from_str(&payload).context("failed to parse saved settings")?;
        let saved_at = DateTime::parse_from_rfc3339(&saved_at)
            .context("failed to parse saved_at")?
            .with_timezone(&Utc);
        Ok(Some((settings, saved_at)))
    }
}
