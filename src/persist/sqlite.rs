//! SQLite-backed single-key snapshot sink.
//!
//! The durable-storage analog of the original browser's localStorage entry:
//! one `kv_state` row holding the serialized store under [`STORAGE_KEY`].

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{Connection, OptionalExtension, params};

use super::{
    PersistError, PersistResult, PersistedStateV1, STATE_FORMAT_VERSION, STORAGE_KEY, StateSink,
};
use crate::core::store::ProfileStore;

/// SQLite implementation of [`StateSink`].
pub struct SqliteStateSink {
    conn: Connection,
}

impl SqliteStateSink {
    /// Opens or creates a SQLite-backed sink at `path`.
    ///
    /// Enables WAL mode and sets `synchronous=NORMAL`.
    pub fn open(path: impl AsRef<Path>) -> PersistResult<Self> {
        let conn = Connection::open(path)?;
        Self::init_connection(conn)
    }

    /// Opens an in-memory SQLite sink.
    pub fn open_in_memory() -> PersistResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_connection(conn)
    }

    fn init_connection(conn: Connection) -> PersistResult<Self> {
        conn.execute_batch(include_str!("schema.sql"))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Ok(Self { conn })
    }

    /// Rehydrates a store from the stored snapshot.
    ///
    /// Absent or malformed payloads yield an empty store.
    pub fn load_store(&self) -> PersistResult<ProfileStore> {
        super::load_store(self)
    }

    fn write_state(&mut self, state: &PersistedStateV1) -> PersistResult<()> {
        let payload = serde_json::to_vec(state)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO kv_state(key, ts_ms, payload) VALUES (?1, ?2, ?3)",
            params![STORAGE_KEY, now_ms() as i64, payload],
        )?;
        Ok(())
    }

    fn read_state(&self) -> PersistResult<Option<PersistedStateV1>> {
        let payload: Option<Vec<u8>> = self
            .conn
            .query_row(
                "SELECT payload FROM kv_state WHERE key = ?1",
                params![STORAGE_KEY],
                |row| row.get(0),
            )
            .optional()?;

        let Some(payload) = payload else {
            return Ok(None);
        };

        // A payload that no longer parses, or that carries an unknown
        // version, is discarded rather than surfaced: the store restarts
        // empty per the corruption-recovery policy.
        match serde_json::from_slice::<PersistedStateV1>(&payload) {
            Ok(state) if state.format_version == STATE_FORMAT_VERSION => Ok(Some(state)),
            _ => Ok(None),
        }
    }
}

impl StateSink for SqliteStateSink {
    fn save(&mut self, state: &PersistedStateV1) -> PersistResult<()> {
        self.write_state(state)
    }

    fn load(&self) -> PersistResult<Option<PersistedStateV1>> {
        self.read_state()
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
