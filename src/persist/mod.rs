//! Persistence contract and snapshot payload types.

/// SQLite key/value implementation.
pub mod sqlite;

use serde::{Deserialize, Serialize};

use crate::core::store::{ProfileStore, StoreSnapshotV1};

/// Fixed namespaced key the whole-store snapshot is stored under.
pub const STORAGE_KEY: &str = "profilog:v1";

/// Version number for serialized [`PersistedStateV1`] payloads.
pub const STATE_FORMAT_VERSION: u16 = 1;

/// Persistence-layer errors.
#[derive(Debug)]
pub enum PersistError {
    /// Underlying SQLite failure.
    Sqlite(rusqlite::Error),
    /// Snapshot (de)serialization failure.
    Serde(serde_json::Error),
    /// Anything else, stringified.
    Message(String),
}

impl From<rusqlite::Error> for PersistError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<serde_json::Error> for PersistError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}

/// Result alias for persistence operations.
pub type PersistResult<T> = Result<T, PersistError>;

/// Versioned wrapper around the persisted store state.
///
/// Serializes as `{"formatVersion": 1, "profiles": {"items": [...],
/// "editingId": ...}}` and must round-trip losslessly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedStateV1 {
    /// Payload format version.
    pub format_version: u16,
    /// Whole-store snapshot.
    pub profiles: StoreSnapshotV1,
}

impl PersistedStateV1 {
    /// Wraps a snapshot using [`STATE_FORMAT_VERSION`].
    pub fn new(profiles: StoreSnapshotV1) -> Self {
        Self {
            format_version: STATE_FORMAT_VERSION,
            profiles,
        }
    }
}

/// Durable storage for the single whole-store snapshot.
pub trait StateSink: Send {
    /// Replaces the stored snapshot.
    fn save(&mut self, state: &PersistedStateV1) -> PersistResult<()>;

    /// Reads the stored snapshot.
    ///
    /// `None` when nothing is stored or the stored value is not
    /// well-formed; only transport-level failures are errors.
    fn load(&self) -> PersistResult<Option<PersistedStateV1>>;
}

/// Rehydrates a store from `sink`, falling back to an empty store when the
/// key is absent or the stored value is malformed.
pub fn load_store(sink: &dyn StateSink) -> PersistResult<ProfileStore> {
    Ok(match sink.load()? {
        Some(state) => ProfileStore::from_snapshot(state.profiles),
        None => ProfileStore::new(),
    })
}
