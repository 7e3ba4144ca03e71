//! Profile domain records, drafts, and patches.

use serde::{Deserialize, Serialize};

use crate::types::{Country, ProfileId};

/// Email notification toggles from the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPrefs {
    /// Notify on new comments.
    pub comments: bool,
    /// Notify when a candidate applies.
    pub candidates: bool,
    /// Notify about offers.
    pub offers: bool,
}

impl Default for NotificationPrefs {
    fn default() -> Self {
        Self {
            comments: true,
            candidates: false,
            offers: false,
        }
    }
}

/// Push-notification delivery mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PushMode {
    /// Deliver everything.
    #[default]
    Everything,
    /// No push notifications.
    Nothing,
}

/// Country-dependent residency data.
///
/// The drill-down fields exist only for the India variant; a foreign
/// resident carries nothing beyond the shared street/full address. Tagged
/// on `country` and flattened into [`ProfileRecord`] so the stored JSON
/// keeps the flat `{country, state, district, postalCode}` layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "country")]
pub enum Residency {
    /// Indian resident with a completed location drill-down.
    #[serde(rename = "India", rename_all = "camelCase")]
    India {
        /// Selected state name.
        state: String,
        /// Selected district name.
        district: String,
        /// Selected pincode.
        postal_code: String,
    },
    /// Non-Indian resident; the street address field holds the full address.
    #[serde(rename = "Non-Indian Resident")]
    Foreign,
}

impl Residency {
    /// Country this residency belongs to.
    pub fn country(&self) -> Country {
        match self {
            Residency::India { .. } => Country::India,
            Residency::Foreign => Country::NonIndianResident,
        }
    }

    /// Selected state name, if the drill-down applies.
    pub fn state(&self) -> Option<&str> {
        match self {
            Residency::India { state, .. } => Some(state),
            Residency::Foreign => None,
        }
    }

    /// Selected district name, if the drill-down applies.
    pub fn district(&self) -> Option<&str> {
        match self {
            Residency::India { district, .. } => Some(district),
            Residency::Foreign => None,
        }
    }

    /// Selected pincode, if the drill-down applies.
    pub fn postal_code(&self) -> Option<&str> {
        match self {
            Residency::India { postal_code, .. } => Some(postal_code),
            Residency::Foreign => None,
        }
    }
}

/// Fully materialized, persisted profile record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    /// Stable opaque identifier.
    pub id: ProfileId,
    /// Public username.
    pub username: String,
    /// Free-text description.
    pub about: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email address.
    pub email: String,
    /// Country plus any drill-down selections.
    #[serde(flatten)]
    pub residency: Residency,
    /// Street address (India) or full address (elsewhere).
    pub street_address: String,
    /// Encoded avatar image, when one was uploaded.
    pub avatar_data_url: Option<String>,
    /// Email notification toggles.
    pub notifications: NotificationPrefs,
    /// Push-notification mode.
    pub push_notifications: PushMode,
    /// Creation time in milliseconds since epoch, set once.
    pub created_at: u64,
    /// Last mutation time in milliseconds since epoch.
    pub updated_at: u64,
}

impl ProfileRecord {
    /// Country of this record.
    pub fn country(&self) -> Country {
        self.residency.country()
    }
}

/// Payload used to create a new [`ProfileRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDraft {
    /// Public username.
    pub username: String,
    /// Free-text description.
    pub about: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email address.
    pub email: String,
    /// Country plus any drill-down selections.
    pub residency: Residency,
    /// Street address (India) or full address (elsewhere).
    pub street_address: String,
    /// Encoded avatar image, when one was uploaded.
    pub avatar_data_url: Option<String>,
    /// Email notification toggles.
    pub notifications: NotificationPrefs,
    /// Push-notification mode.
    pub push_notifications: PushMode,
}

/// Sparse patch where each `Some` field overwrites the record value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfilePatch {
    /// Optional replacement for username.
    pub username: Option<String>,
    /// Optional replacement for the about text.
    pub about: Option<String>,
    /// Optional replacement for first name.
    pub first_name: Option<String>,
    /// Optional replacement for last name.
    pub last_name: Option<String>,
    /// Optional replacement for email.
    pub email: Option<String>,
    /// Optional replacement for residency (country switch included).
    pub residency: Option<Residency>,
    /// Optional replacement for the address.
    pub street_address: Option<String>,
    /// Optional avatar change; `Some(None)` clears the avatar.
    pub avatar_data_url: Option<Option<String>>,
    /// Optional replacement for notification toggles.
    pub notifications: Option<NotificationPrefs>,
    /// Optional replacement for push mode.
    pub push_notifications: Option<PushMode>,
}

impl ProfilePatch {
    /// Returns true when no fields are set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Applies this patch in place to `rec`. Timestamps are left to the store.
    pub fn apply_to(&self, rec: &mut ProfileRecord) {
        if let Some(v) = &self.username {
            rec.username = v.clone();
        }
        if let Some(v) = &self.about {
            rec.about = v.clone();
        }
        if let Some(v) = &self.first_name {
            rec.first_name = v.clone();
        }
        if let Some(v) = &self.last_name {
            rec.last_name = v.clone();
        }
        if let Some(v) = &self.email {
            rec.email = v.clone();
        }
        if let Some(v) = &self.residency {
            rec.residency = v.clone();
        }
        if let Some(v) = &self.street_address {
            rec.street_address = v.clone();
        }
        if let Some(v) = &self.avatar_data_url {
            rec.avatar_data_url = v.clone();
        }
        if let Some(v) = self.notifications {
            rec.notifications = v;
        }
        if let Some(v) = self.push_notifications {
            rec.push_notifications = v;
        }
    }
}
