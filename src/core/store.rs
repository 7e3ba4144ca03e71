//! Authoritative profile store: ordered records plus the editing pointer.

use std::time::{SystemTime, UNIX_EPOCH};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::{
    profile::{ProfileDraft, ProfilePatch, ProfileRecord},
    types::{Country, ProfileId, new_profile_id},
};

/// Errors surfaced by store operations that are allowed to fail.
///
/// Lookups of unknown ids in `update`/`delete`/`begin_edit` are deliberate
/// no-ops rather than errors; only id collisions are reportable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A record with this id already exists.
    AlreadyExists(ProfileId),
}

/// Serializable whole-store state: newest-first items plus editing pointer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshotV1 {
    /// Records in newest-first insertion order.
    pub items: Vec<ProfileRecord>,
    /// Id of the record currently loaded for editing, if any.
    pub editing_id: Option<ProfileId>,
}

/// Read-only predicate over the record sequence, consumed by the table view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFilter {
    /// Country to match exactly; `None` matches everything.
    pub country: Option<Country>,
    /// State to match exactly; applies only under an India country filter.
    pub state: Option<String>,
    /// District to match exactly; applies only under an India country filter.
    pub district: Option<String>,
}

impl ProfileFilter {
    /// True when `rec` passes this filter.
    ///
    /// State/district constraints are ignored unless the country filter is
    /// the drill-down-supporting one, and empty strings count as unset.
    pub fn matches(&self, rec: &ProfileRecord) -> bool {
        let Some(country) = self.country else {
            return true;
        };
        if rec.country() != country {
            return false;
        }
        if country.supports_drill_down() {
            if let Some(state) = self.state.as_deref() {
                if !state.is_empty() && rec.residency.state() != Some(state) {
                    return false;
                }
            }
            if let Some(district) = self.district.as_deref() {
                if !district.is_empty() && rec.residency.district() != Some(district) {
                    return false;
                }
            }
        }
        true
    }
}

/// Ordered profile collection with at most one record open for editing.
#[derive(Debug, Default)]
pub struct ProfileStore {
    records: HashMap<ProfileId, ProfileRecord>,
    order: Vec<ProfileId>,
    editing: Option<ProfileId>,
}

impl ProfileStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from a snapshot.
    ///
    /// Duplicate ids keep their first (newest) occurrence; an editing
    /// pointer that references no surviving record is cleared.
    pub fn from_snapshot(snapshot: StoreSnapshotV1) -> Self {
        let mut store = Self::new();
        for rec in snapshot.items {
            if store.records.contains_key(&rec.id) {
                continue;
            }
            store.order.push(rec.id.clone());
            store.records.insert(rec.id.clone(), rec);
        }
        store.editing = snapshot
            .editing_id
            .filter(|id| store.records.contains_key(id));
        store
    }

    /// Exports the full store state.
    pub fn export_snapshot(&self) -> StoreSnapshotV1 {
        let items = self
            .order
            .iter()
            .filter_map(|id| self.records.get(id).cloned())
            .collect();
        StoreSnapshotV1 {
            items,
            editing_id: self.editing.clone(),
        }
    }

    /// Creates a record from `draft` with a fresh id, inserted at the head.
    pub fn create(&mut self, draft: ProfileDraft) -> ProfileId {
        let mut id = new_profile_id();
        while self.records.contains_key(&id) {
            id = new_profile_id();
        }
        self.insert_record(id, draft)
    }

    /// Creates a record from `draft` under a caller-supplied id.
    pub fn create_with_id(
        &mut self,
        id: ProfileId,
        draft: ProfileDraft,
    ) -> Result<ProfileId, StoreError> {
        if self.records.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id));
        }
        Ok(self.insert_record(id, draft))
    }

    fn insert_record(&mut self, id: ProfileId, draft: ProfileDraft) -> ProfileId {
        let now = now_ms();
        let rec = ProfileRecord {
            id: id.clone(),
            username: draft.username,
            about: draft.about,
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email,
            residency: draft.residency,
            street_address: draft.street_address,
            avatar_data_url: draft.avatar_data_url,
            notifications: draft.notifications,
            push_notifications: draft.push_notifications,
            created_at: now,
            updated_at: now,
        };
        self.order.insert(0, id.clone());
        self.records.insert(id.clone(), rec);
        id
    }

    /// Merges `patch` onto the record with id `id` and refreshes `updated_at`.
    ///
    /// Returns false (leaving the store untouched) when the id is unknown.
    pub fn update(&mut self, id: &str, patch: ProfilePatch) -> bool {
        let Some(rec) = self.records.get_mut(id) else {
            return false;
        };
        patch.apply_to(rec);
        rec.updated_at = now_ms();
        true
    }

    /// Removes the record with id `id`, clearing the editing pointer when it
    /// references that record. Returns false when the id is unknown.
    pub fn delete(&mut self, id: &str) -> bool {
        if self.records.remove(id).is_none() {
            return false;
        }
        if let Some(pos) = self.order.iter().position(|x| x == id) {
            self.order.remove(pos);
        }
        if self.editing.as_deref() == Some(id) {
            self.editing = None;
        }
        true
    }

    /// Points the editor at an existing record. Unknown ids are a no-op.
    pub fn begin_edit(&mut self, id: &str) -> bool {
        if !self.records.contains_key(id) {
            return false;
        }
        self.editing = Some(id.to_string());
        true
    }

    /// Clears the editing pointer. The record sequence is untouched.
    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Id of the record currently open for editing, if any.
    pub fn editing_id(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    /// Resolved record currently open for editing, if any.
    pub fn editing_record(&self) -> Option<&ProfileRecord> {
        self.editing.as_ref().and_then(|id| self.records.get(id))
    }

    /// Looks up a record by id.
    pub fn get(&self, id: &str) -> Option<&ProfileRecord> {
        self.records.get(id)
    }

    /// Looks up and clones a record by id.
    pub fn get_cloned(&self, id: &str) -> Option<ProfileRecord> {
        self.get(id).cloned()
    }

    /// All records, newest first.
    pub fn ordered(&self) -> Vec<&ProfileRecord> {
        self.order
            .iter()
            .filter_map(|id| self.records.get(id))
            .collect()
    }

    /// All records cloned, newest first.
    pub fn ordered_cloned(&self) -> Vec<ProfileRecord> {
        self.ordered().into_iter().cloned().collect()
    }

    /// Record ids in newest-first order.
    pub fn ordered_ids(&self) -> &[ProfileId] {
        &self.order
    }

    /// Records passing `filter`, order preserved from the sequence.
    pub fn filtered(&self, filter: &ProfileFilter) -> Vec<&ProfileRecord> {
        self.ordered()
            .into_iter()
            .filter(|rec| filter.matches(rec))
            .collect()
    }

    /// Records passing `filter`, cloned.
    pub fn filtered_cloned(&self, filter: &ProfileFilter) -> Vec<ProfileRecord> {
        self.filtered(filter).into_iter().cloned().collect()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
