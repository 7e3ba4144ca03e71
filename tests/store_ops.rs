use profilog::{
    core::store::{ProfileFilter, ProfileStore, StoreError},
    profile::{NotificationPrefs, ProfileDraft, ProfilePatch, PushMode, Residency},
    types::Country,
};

fn india_draft(username: &str, state: &str, district: &str, pincode: &str) -> ProfileDraft {
    ProfileDraft {
        username: username.to_string(),
        about: String::new(),
        first_name: "Asha".to_string(),
        last_name: "Rao".to_string(),
        email: format!("{username}@example.com"),
        residency: Residency::India {
            state: state.to_string(),
            district: district.to_string(),
            postal_code: pincode.to_string(),
        },
        street_address: "12 MG Road".to_string(),
        avatar_data_url: None,
        notifications: NotificationPrefs::default(),
        push_notifications: PushMode::default(),
    }
}

fn foreign_draft(username: &str) -> ProfileDraft {
    ProfileDraft {
        username: username.to_string(),
        about: String::new(),
        first_name: "Finn".to_string(),
        last_name: "Olsen".to_string(),
        email: format!("{username}@example.com"),
        residency: Residency::Foreign,
        street_address: "1 Harbour Street, Oslo".to_string(),
        avatar_data_url: None,
        notifications: NotificationPrefs::default(),
        push_notifications: PushMode::Nothing,
    }
}

#[test]
fn create_inserts_newest_first_with_unique_ids() {
    let mut store = ProfileStore::new();
    let id1 = store.create(india_draft("a", "Karnataka", "Bengaluru", "560034"));
    let id2 = store.create(india_draft("b", "Karnataka", "Mysuru", "570001"));
    let id3 = store.create(foreign_draft("c"));

    assert_ne!(id1, id2);
    assert_ne!(id2, id3);

    let usernames: Vec<_> = store.ordered().iter().map(|r| r.username.clone()).collect();
    assert_eq!(usernames, vec!["c", "b", "a"]);
    assert_eq!(store.len(), 3);
}

#[test]
fn create_with_id_rejects_collisions() {
    let mut store = ProfileStore::new();
    let id = store
        .create_with_id("fixed-id".to_string(), foreign_draft("a"))
        .expect("first insert");
    assert_eq!(id, "fixed-id");

    let err = store
        .create_with_id("fixed-id".to_string(), foreign_draft("b"))
        .unwrap_err();
    assert_eq!(err, StoreError::AlreadyExists("fixed-id".to_string()));
    assert_eq!(store.len(), 1);
}

#[test]
fn update_merges_and_refreshes_updated_at() {
    let mut store = ProfileStore::new();
    let id = store.create(india_draft("a", "Karnataka", "Bengaluru", "560034"));
    let before = store.get(&id).unwrap().clone();

    let applied = store.update(
        &id,
        ProfilePatch {
            email: Some("new@example.com".to_string()),
            ..ProfilePatch::default()
        },
    );
    assert!(applied);

    let after = store.get(&id).unwrap();
    assert_eq!(after.email, "new@example.com");
    assert_eq!(after.username, before.username);
    assert_eq!(after.residency, before.residency);
    assert_eq!(after.created_at, before.created_at);
    assert!(after.updated_at >= before.updated_at);
}

#[test]
fn update_unknown_id_is_a_silent_noop() {
    let mut store = ProfileStore::new();
    let id = store.create(india_draft("a", "Karnataka", "Bengaluru", "560034"));
    store.begin_edit(&id);
    let before = store.export_snapshot();

    let applied = store.update(
        "no-such-id",
        ProfilePatch {
            email: Some("new@example.com".to_string()),
            ..ProfilePatch::default()
        },
    );

    assert!(!applied);
    assert_eq!(store.export_snapshot(), before);
}

#[test]
fn patch_can_clear_the_avatar() {
    let mut store = ProfileStore::new();
    let mut draft = india_draft("a", "Karnataka", "Bengaluru", "560034");
    draft.avatar_data_url = Some("data:image/png;base64,AAAA".to_string());
    let id = store.create(draft);

    store.update(
        &id,
        ProfilePatch {
            avatar_data_url: Some(None),
            ..ProfilePatch::default()
        },
    );
    assert_eq!(store.get(&id).unwrap().avatar_data_url, None);
}

#[test]
fn delete_clears_matching_editing_pointer() {
    let mut store = ProfileStore::new();
    let id1 = store.create(india_draft("a", "Karnataka", "Bengaluru", "560034"));
    let id2 = store.create(foreign_draft("b"));

    assert!(store.begin_edit(&id1));
    assert_eq!(store.editing_id(), Some(id1.as_str()));

    assert!(store.delete(&id1));
    assert_eq!(store.editing_id(), None);
    assert!(!store.delete("no-such-id"));
    assert_eq!(store.len(), 1);

    // Deleting a record other than the edited one leaves the pointer alone.
    let id3 = store.create(india_draft("c", "Kerala", "Kochi", "682001"));
    assert!(store.begin_edit(&id3));
    assert!(store.delete(&id2));
    assert_eq!(store.editing_id(), Some(id3.as_str()));
}

#[test]
fn begin_edit_requires_an_existing_record() {
    let mut store = ProfileStore::new();
    assert!(!store.begin_edit("no-such-id"));
    assert_eq!(store.editing_id(), None);

    let id = store.create(foreign_draft("a"));
    assert!(store.begin_edit(&id));
    assert_eq!(store.editing_record().unwrap().username, "a");

    store.cancel_edit();
    assert_eq!(store.editing_id(), None);
    assert_eq!(store.len(), 1);
}

#[test]
fn filtered_matches_country_then_state_and_district() {
    let mut store = ProfileStore::new();
    store.create(india_draft("ka", "Karnataka", "Bengaluru", "560034"));
    store.create(india_draft("mh", "Maharashtra", "Pune", "411001"));
    store.create(foreign_draft("fx"));

    let all = store.filtered(&ProfileFilter::default());
    assert_eq!(all.len(), 3);

    let india = store.filtered(&ProfileFilter {
        country: Some(Country::India),
        ..ProfileFilter::default()
    });
    assert_eq!(india.len(), 2);

    let karnataka = store.filtered(&ProfileFilter {
        country: Some(Country::India),
        state: Some("Karnataka".to_string()),
        district: None,
    });
    assert_eq!(karnataka.len(), 1);
    assert_eq!(karnataka[0].username, "ka");

    let mismatch = store.filtered(&ProfileFilter {
        country: Some(Country::India),
        state: Some("Karnataka".to_string()),
        district: Some("Mysuru".to_string()),
    });
    assert!(mismatch.is_empty());

    // State/district constraints only apply under an India country filter.
    let foreign = store.filtered(&ProfileFilter {
        country: Some(Country::NonIndianResident),
        state: Some("Karnataka".to_string()),
        district: None,
    });
    assert_eq!(foreign.len(), 1);
    assert_eq!(foreign[0].username, "fx");

    // Empty strings count as unset.
    let empty_state = store.filtered(&ProfileFilter {
        country: Some(Country::India),
        state: Some(String::new()),
        district: Some(String::new()),
    });
    assert_eq!(empty_state.len(), 2);
}

#[test]
fn filtered_preserves_newest_first_order() {
    let mut store = ProfileStore::new();
    store.create(india_draft("first", "Karnataka", "Bengaluru", "560034"));
    store.create(india_draft("second", "Karnataka", "Bengaluru", "560095"));

    let rows = store.filtered(&ProfileFilter {
        country: Some(Country::India),
        state: Some("Karnataka".to_string()),
        district: Some("Bengaluru".to_string()),
    });
    let usernames: Vec<_> = rows.iter().map(|r| r.username.clone()).collect();
    assert_eq!(usernames, vec!["second", "first"]);
}

#[test]
fn snapshot_round_trips_records_and_editing_pointer() {
    let mut store = ProfileStore::new();
    store.create(india_draft("a", "Karnataka", "Bengaluru", "560034"));
    let id = store.create(foreign_draft("b"));
    store.begin_edit(&id);

    let snapshot = store.export_snapshot();
    let rebuilt = ProfileStore::from_snapshot(snapshot.clone());
    assert_eq!(rebuilt.export_snapshot(), snapshot);
    assert_eq!(rebuilt.editing_id(), Some(id.as_str()));
}

#[test]
fn from_snapshot_clears_a_dangling_editing_pointer() {
    let mut store = ProfileStore::new();
    store.create(foreign_draft("a"));
    let mut snapshot = store.export_snapshot();
    snapshot.editing_id = Some("ghost".to_string());

    let rebuilt = ProfileStore::from_snapshot(snapshot);
    assert_eq!(rebuilt.editing_id(), None);
    assert_eq!(rebuilt.len(), 1);
}
