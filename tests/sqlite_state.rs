use tempfile::TempDir;

use profilog::{
    core::store::ProfileStore,
    persist::{PersistedStateV1, STORAGE_KEY, StateSink, sqlite::SqliteStateSink},
    profile::{NotificationPrefs, ProfileDraft, PushMode, Residency},
};

fn draft(username: &str) -> ProfileDraft {
    ProfileDraft {
        username: username.to_string(),
        about: String::new(),
        first_name: "Asha".to_string(),
        last_name: "Rao".to_string(),
        email: format!("{username}@example.com"),
        residency: Residency::India {
            state: "Karnataka".to_string(),
            district: "Bengaluru".to_string(),
            postal_code: "560034".to_string(),
        },
        street_address: "12 MG Road".to_string(),
        avatar_data_url: None,
        notifications: NotificationPrefs::default(),
        push_notifications: PushMode::default(),
    }
}

#[test]
fn sqlite_round_trips_records_and_editing_pointer() {
    let tmp = TempDir::new().expect("tmp");
    let db_path = tmp.path().join("state.db");

    let mut store = ProfileStore::new();
    store.create(draft("a"));
    let id = store.create(draft("b"));
    store.begin_edit(&id);
    let snapshot = store.export_snapshot();

    let mut sink = SqliteStateSink::open(&db_path).expect("open sqlite");
    sink.save(&PersistedStateV1::new(snapshot.clone())).expect("save");
    drop(sink);

    let reopened = SqliteStateSink::open(&db_path).expect("reopen");
    let loaded = reopened.load_store().expect("load");
    assert_eq!(loaded.export_snapshot(), snapshot);
    assert_eq!(loaded.editing_id(), Some(id.as_str()));
}

#[test]
fn save_replaces_the_single_stored_snapshot() {
    let mut sink = SqliteStateSink::open_in_memory().expect("open");

    let mut store = ProfileStore::new();
    store.create(draft("a"));
    sink.save(&PersistedStateV1::new(store.export_snapshot()))
        .expect("save 1");

    store.create(draft("b"));
    sink.save(&PersistedStateV1::new(store.export_snapshot()))
        .expect("save 2");

    let loaded = sink.load_store().expect("load");
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded.export_snapshot(), store.export_snapshot());
}

#[test]
fn missing_key_yields_an_empty_store() {
    let sink = SqliteStateSink::open_in_memory().expect("open");
    let loaded = sink.load_store().expect("load");
    assert!(loaded.is_empty());
    assert_eq!(loaded.editing_id(), None);
}

#[test]
fn corrupt_payload_is_discarded_not_surfaced() {
    let tmp = TempDir::new().expect("tmp");
    let db_path = tmp.path().join("state.db");

    let mut store = ProfileStore::new();
    store.create(draft("a"));
    let mut sink = SqliteStateSink::open(&db_path).expect("open");
    sink.save(&PersistedStateV1::new(store.export_snapshot()))
        .expect("save");
    drop(sink);

    let conn = rusqlite::Connection::open(&db_path).expect("raw open");
    conn.execute(
        "UPDATE kv_state SET payload = ?1 WHERE key = ?2",
        rusqlite::params![b"not json".to_vec(), STORAGE_KEY],
    )
    .expect("corrupt");
    drop(conn);

    let reopened = SqliteStateSink::open(&db_path).expect("reopen");
    let loaded = reopened.load_store().expect("load");
    assert!(loaded.is_empty());
}

#[test]
fn unknown_format_version_is_discarded() {
    let tmp = TempDir::new().expect("tmp");
    let db_path = tmp.path().join("state.db");

    let mut store = ProfileStore::new();
    store.create(draft("a"));
    let mut sink = SqliteStateSink::open(&db_path).expect("open");
    sink.save(&PersistedStateV1::new(store.export_snapshot()))
        .expect("save");
    drop(sink);

    let conn = rusqlite::Connection::open(&db_path).expect("raw open");
    let future = br#"{"formatVersion":99,"profiles":{"items":[],"editingId":null}}"#;
    conn.execute(
        "UPDATE kv_state SET payload = ?1 WHERE key = ?2",
        rusqlite::params![future.to_vec(), STORAGE_KEY],
    )
    .expect("rewrite");
    drop(conn);

    let reopened = SqliteStateSink::open(&db_path).expect("reopen");
    assert!(reopened.load_store().expect("load").is_empty());
}

#[test]
fn persisted_json_uses_the_documented_layout() {
    let mut store = ProfileStore::new();
    let id = store.create(draft("a"));
    store.begin_edit(&id);

    let state = PersistedStateV1::new(store.export_snapshot());
    let value = serde_json::to_value(&state).expect("serialize");

    assert_eq!(value["formatVersion"], 1);
    assert_eq!(value["profiles"]["editingId"], id.as_str());
    let item = &value["profiles"]["items"][0];
    assert_eq!(item["country"], "India");
    assert_eq!(item["postalCode"], "560034");
    assert_eq!(item["firstName"], "Asha");
    assert!(item["createdAt"].is_u64());

    let back: PersistedStateV1 = serde_json::from_value(value).expect("deserialize");
    assert_eq!(back, state);
}
