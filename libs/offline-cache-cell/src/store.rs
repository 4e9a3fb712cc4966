//! TTL-bounded offline snapshots of agenda/patient/record data.
//!
//! One logical table per domain entity. Writes replace the whole snapshot
//! inside a single transaction; reads return `None` for anything missing
//! or older than the table's TTL.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::CacheResult;

/// Logical cache tables and their time-to-live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheTable {
    Agenda,
    Patients,
    Records,
}

impl CacheTable {
    pub const ALL: [CacheTable; 3] = [CacheTable::Agenda, CacheTable::Patients, CacheTable::Records];

    pub fn name(&self) -> &'static str {
        match self {
            CacheTable::Agenda => "agenda",
            CacheTable::Patients => "patients",
            CacheTable::Records => "records",
        }
    }

    /// Agenda data goes stale fast; patient and record lists tolerate an
    /// hour.
    pub fn ttl(&self) -> Duration {
        match self {
            CacheTable::Agenda => Duration::minutes(30),
            CacheTable::Patients | CacheTable::Records => Duration::minutes(60),
        }
    }
}

pub struct OfflineCache {
    conn: Mutex<Connection>,
}

impl OfflineCache {
    pub fn open<P: AsRef<Path>>(path: P) -> CacheResult<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> CacheResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> CacheResult<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS cache_items (
                table_name TEXT NOT NULL,
                position INTEGER NOT NULL,
                payload TEXT NOT NULL,
                PRIMARY KEY (table_name, position)
            );
            CREATE TABLE IF NOT EXISTS cache_meta (
                table_name TEXT PRIMARY KEY,
                stamped_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Replace the table's snapshot with `items` and stamp the write time.
    ///
    /// Clear, inserts, and stamp run in one transaction: a reader either
    /// sees the previous complete snapshot or the new one, never a cleared
    /// but unstamped table.
    pub fn cache_data(&self, table: CacheTable, items: &[Value]) -> CacheResult<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        tx.execute(
            "DELETE FROM cache_items WHERE table_name = ?1",
            [table.name()],
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO cache_items (table_name, position, payload) VALUES (?1, ?2, ?3)",
            )?;
            for (position, item) in items.iter().enumerate() {
                let payload = serde_json::to_string(item)?;
                stmt.execute(params![table.name(), position as i64, payload])?;
            }
        }

        tx.execute(
            "INSERT OR REPLACE INTO cache_meta (table_name, stamped_at) VALUES (?1, ?2)",
            params![table.name(), Utc::now().to_rfc3339()],
        )?;

        tx.commit()?;
        debug!("Cached {} items into table {}", items.len(), table.name());
        Ok(())
    }

    /// Read the table's snapshot, or `None` when it is missing or expired.
    ///
    /// TTL is evaluated lazily here; expired rows stay on disk until the
    /// next write or an explicit clear.
    pub fn get_cached_data(&self, table: CacheTable) -> CacheResult<Option<Vec<Value>>> {
        let conn = self.conn.lock().unwrap();

        let stamped_at: Option<String> = conn
            .query_row(
                "SELECT stamped_at FROM cache_meta WHERE table_name = ?1",
                [table.name()],
                |row| row.get(0),
            )
            .optional()?;

        let stamped_at = match stamped_at {
            Some(raw) => raw,
            None => return Ok(None),
        };

        let stamped_at = match DateTime::parse_from_rfc3339(&stamped_at) {
            Ok(parsed) => parsed.with_timezone(&Utc),
            Err(e) => {
                warn!("Unreadable cache stamp for {}: {}", table.name(), e);
                return Ok(None);
            }
        };

        if Utc::now() - stamped_at > table.ttl() {
            debug!("Cache for table {} expired", table.name());
            return Ok(None);
        }

        let mut stmt = conn.prepare(
            "SELECT payload FROM cache_items WHERE table_name = ?1 ORDER BY position ASC",
        )?;
        let rows = stmt.query_map([table.name()], |row| row.get::<_, String>(0))?;

        let mut items = Vec::new();
        for row in rows {
            items.push(serde_json::from_str(&row?)?);
        }
        Ok(Some(items))
    }

    /// Empty every table and stamp, used on logout or explicit reset.
    pub fn clear_all(&self) -> CacheResult<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM cache_items", [])?;
        tx.execute("DELETE FROM cache_meta", [])?;
        tx.commit()?;
        debug!("Cleared all offline cache tables");
        Ok(())
    }
}
