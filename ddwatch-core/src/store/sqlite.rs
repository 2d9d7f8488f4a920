//! SQLite-backed inventory and metrics store
//!
//! Schema:
//! - `servers`: one row per monitored appliance with its login facts
//! - `readings`: one row per recorded capacity reading
//!
//! Writes are serialized through a mutex; each reading is a single INSERT,
//! so a failed write never affects readings recorded before it.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rusqlite::{Connection, params};
use secrecy::{ExposeSecret, SecretString};

use super::limits::check_column_limits;
use super::{Inventory, MetricsStore, StoreError, StoreResult};
use crate::models::{
    CapacityFigures, CapacityReading, ServerId, ServerTarget, StoredReading,
};

const SCHEMA: &str = r"
    CREATE TABLE IF NOT EXISTS servers (
        id_server INTEGER PRIMARY KEY,
        hostname TEXT NOT NULL,
        address TEXT NOT NULL,
        username TEXT NOT NULL,
        password TEXT,
        port INTEGER NOT NULL DEFAULT 22
    );

    CREATE TABLE IF NOT EXISTS readings (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        id_server INTEGER NOT NULL,
        recorded_at INTEGER NOT NULL,
        size_gb REAL NOT NULL,
        used_gb REAL NOT NULL,
        avail_gb REAL NOT NULL,
        use_percent REAL NOT NULL,
        cleanable_gb REAL NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_readings_server_time ON readings(id_server, recorded_at);
";

/// Inventory and metrics store on one SQLite database
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (and creates if needed) the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the file cannot be opened or
    /// the schema cannot be created.
    pub fn open_at<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Unavailable(format!("cannot create {}: {e}", parent.display()))
            })?;
        }

        let conn = Connection::open(path)
            .map_err(|e| StoreError::Unavailable(format!("{}: {e}", path.display())))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Self::from_connection(conn)
    }

    /// Opens a private in-memory database
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if SQLite cannot be initialised.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)
            .map_err(|e| StoreError::Unavailable(format!("schema creation failed: {e}")))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("store connection lock poisoned".to_string()))
    }

    /// Inserts or replaces an inventory entry
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Query`] if the write fails.
    pub fn upsert_server(&self, target: &ServerTarget) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO servers (id_server, hostname, address, username, password, port)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                target.id.0,
                &target.hostname,
                &target.address,
                &target.username,
                target.password.as_ref().map(|p| p.expose_secret()),
                target.port,
            ],
        )
        .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(())
    }

    /// Lists inventory entries ordered by hostname.
    ///
    /// Rows with an invalid port are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Inventory`] if the table cannot be read.
    pub fn list_servers(&self) -> StoreResult<Vec<ServerTarget>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id_server, hostname, address, username, password, port
                 FROM servers ORDER BY hostname, id_server",
            )
            .map_err(|e| StoreError::Inventory(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, i64>(5)?,
                ))
            })
            .map_err(|e| StoreError::Inventory(e.to_string()))?;

        let mut targets = Vec::new();
        for row in rows {
            let (id, hostname, address, username, password, port) =
                row.map_err(|e| StoreError::Inventory(e.to_string()))?;
            let Ok(port) = u16::try_from(port) else {
                tracing::warn!(server_id = id, %hostname, port, "Skipping server with invalid port");
                continue;
            };
            targets.push(ServerTarget::new(
                ServerId(id),
                hostname,
                address,
                username,
                password.filter(|p| !p.is_empty()).map(SecretString::from),
                port,
            ));
        }
        Ok(targets)
    }

    /// Records a reading with an explicit timestamp
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RangeViolation`] if the reading does not fit the
    /// columns, [`StoreError::Persistence`] if the INSERT fails.
    pub fn record_at(&self, reading: &CapacityReading, at: DateTime<Utc>) -> StoreResult<()> {
        let violations = check_column_limits(reading);
        if !violations.is_empty() {
            return Err(StoreError::RangeViolation {
                reading: *reading,
                violations,
            });
        }

        let conn = self.lock()?;
        let f = &reading.figures;
        conn.execute(
            "INSERT INTO readings (id_server, recorded_at, size_gb, used_gb, avail_gb, use_percent, cleanable_gb)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                reading.server_id.0,
                at.timestamp(),
                f.total_gb,
                f.used_gb,
                f.available_gb,
                f.use_percent as f64,
                f.reclaimable_gb,
            ],
        )
        .map_err(|e| StoreError::Persistence {
            reading: *reading,
            reason: e.to_string(),
        })?;
        Ok(())
    }

    /// Readings of `server_id` recorded at or after `since`, oldest first
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Query`] if the query fails.
    pub fn history_since(
        &self,
        server_id: ServerId,
        since: DateTime<Utc>,
    ) -> StoreResult<Vec<StoredReading>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT recorded_at, size_gb, used_gb, avail_gb, use_percent, cleanable_gb
                 FROM readings
                 WHERE id_server = ?1 AND recorded_at >= ?2
                 ORDER BY recorded_at ASC, id ASC",
            )
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let rows = stmt
            .query_map(params![server_id.0, since.timestamp()], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    CapacityFigures {
                        total_gb: row.get(1)?,
                        used_gb: row.get(2)?,
                        available_gb: row.get(3)?,
                        use_percent: row.get::<_, f64>(4)? as i64,
                        reclaimable_gb: row.get(5)?,
                    },
                ))
            })
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let mut history = Vec::new();
        for row in rows {
            let (timestamp, figures) = row.map_err(|e| StoreError::Query(e.to_string()))?;
            let recorded_at = DateTime::from_timestamp(timestamp, 0).ok_or_else(|| {
                StoreError::Query(format!("invalid timestamp {timestamp} in readings"))
            })?;
            history.push(StoredReading {
                recorded_at,
                reading: CapacityReading::new(server_id, figures),
            });
        }
        Ok(history)
    }

    /// Total number of stored readings
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Query`] if the count fails.
    pub fn reading_count(&self) -> StoreResult<u64> {
        let conn = self.lock()?;
        conn.query_row("SELECT COUNT(*) FROM readings", [], |row| row.get::<_, i64>(0))
            .map(|n| n.max(0) as u64)
            .map_err(|e| StoreError::Query(e.to_string()))
    }
}

#[async_trait]
impl Inventory for SqliteStore {
    async fn list_targets(&self) -> StoreResult<Vec<ServerTarget>> {
        self.list_servers()
    }
}

#[async_trait]
impl MetricsStore for SqliteStore {
    async fn record(&self, reading: &CapacityReading) -> StoreResult<()> {
        self.record_at(reading, Utc::now())
    }

    async fn history(
        &self,
        server_id: ServerId,
        window_days: u32,
    ) -> StoreResult<Vec<StoredReading>> {
        let since = Duration::try_days(i64::from(window_days))
            .and_then(|window| Utc::now().checked_sub_signed(window))
            .ok_or_else(|| {
                StoreError::Query(format!("history window of {window_days} days is out of range"))
            })?;
        self.history_since(server_id, since)
    }
}
