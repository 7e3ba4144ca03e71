//! Shared primitive ids and small enums.

use serde::{Deserialize, Serialize};

/// Opaque profile identifier (UUID v4, assigned at creation).
pub type ProfileId = String;

/// Monotonic per-level fetch generation used for response supersession.
pub type Generation = u64;

/// Snapshot revision counter maintained by the store runtime.
pub type Revision = u64;

/// Residency selection offered by the intake form.
///
/// Only [`Country::India`] supports the state/district/pincode drill-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Country {
    /// Indian resident; location drill-down applies.
    India,
    /// Any non-Indian resident; only a free-form address is collected.
    #[serde(rename = "Non-Indian Resident")]
    NonIndianResident,
}

impl Country {
    /// True when this country drives the state/district/pincode cascade.
    pub fn supports_drill_down(self) -> bool {
        matches!(self, Country::India)
    }

    /// Label as shown by the form and stored in snapshots.
    pub fn label(self) -> &'static str {
        match self {
            Country::India => "India",
            Country::NonIndianResident => "Non-Indian Resident",
        }
    }
}

/// Load status of one cascading level's option list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStatus {
    /// No selection upstream, no options.
    #[default]
    Idle,
    /// A fetch is in flight; prior options are cleared.
    Loading,
    /// Options populated (possibly empty after a failed lookup).
    Ready,
}

/// One stage of the cascading dependency chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// State list, fetched per country.
    State,
    /// District list, fetched per state.
    District,
    /// Pincode options, fetched per district.
    Pincode,
}

/// Generates a fresh opaque profile id.
pub fn new_profile_id() -> ProfileId {
    uuid::Uuid::new_v4().to_string()
}
