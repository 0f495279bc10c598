use crate::error::{SyncError, SyncResult};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use url::Url;

/// Key under which the backend URL is persisted.
pub const ENDPOINT_KEY: &str = "COFFEE_BELL_API_URL";

/// Durable client settings. Holds nothing but small key/value pairs; all
/// business data lives behind the remote endpoint.
pub struct Settings {
    conn: Mutex<Connection>,
}

impl Settings {
    pub fn open(path: &Path) -> SyncResult<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> SyncResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> SyncResult<Self> {
        let settings = Settings {
            conn: Mutex::new(conn),
        };
        settings.initialize()?;
        Ok(settings)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn initialize(&self) -> SyncResult<()> {
        let conn = self.lock();

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            ",
        )?;

        Ok(())
    }

    pub fn get(&self, key: &str) -> SyncResult<Option<String>> {
        let conn = self.lock();
        let value = conn
            .query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn set(&self, key: &str, value: &str) -> SyncResult<()> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
            rusqlite::params![key, value],
        )?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> SyncResult<()> {
        let conn = self.lock();
        conn.execute("DELETE FROM settings WHERE key = ?1", [key])?;
        Ok(())
    }

    /// The configured backend, if setup has been completed. A stored value
    /// that no longer parses is treated as absent.
    pub fn endpoint(&self) -> SyncResult<Option<Url>> {
        Ok(self
            .get(ENDPOINT_KEY)?
            .and_then(|raw| Url::parse(&raw).ok()))
    }

    pub fn save_endpoint(&self, raw: &str) -> SyncResult<Url> {
        let url = parse_endpoint(raw)?;
        self.set(ENDPOINT_KEY, url.as_str())?;
        tracing::info!(endpoint = %url, "API endpoint saved");
        Ok(url)
    }

    pub fn clear_endpoint(&self) -> SyncResult<()> {
        self.remove(ENDPOINT_KEY)
    }
}

pub fn parse_endpoint(raw: &str) -> SyncResult<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(SyncError::Validation("API URL is required".to_string()));
    }

    let url = Url::parse(raw)
        .map_err(|e| SyncError::Validation(format!("Invalid API URL: {}", e)))?;

    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(SyncError::Validation(
            "API URL must be an http(s) address".to_string(),
        )),
    }
}

#[cfg(feature = "desktop")]
mod desktop {
    use super::Settings;
    use tauri::{AppHandle, Manager};

    impl Settings {
        pub fn new(app_handle: &AppHandle) -> crate::error::SyncResult<Self> {
            let app_dir = app_handle
                .path()
                .app_data_dir()
                .map_err(|e| std::io::Error::other(e.to_string()))?;

            std::fs::create_dir_all(&app_dir)?;

            Settings::open(&app_dir.join("coffee_bell.db"))
        }
    }

    pub trait SettingsExt {
        fn settings(&self) -> &Settings;
    }

    impl SettingsExt for AppHandle {
        fn settings(&self) -> &Settings {
            self.state::<Settings>().inner()
        }
    }
}

#[cfg(feature = "desktop")]
pub use desktop::SettingsExt;
