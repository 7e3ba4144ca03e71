//! Intake form values, validation, and draft conversion.

use crate::{
    profile::{NotificationPrefs, ProfileDraft, ProfileRecord, PushMode, Residency},
    types::Country,
};

/// Upper bound on the encoded avatar payload.
pub const AVATAR_MAX_BYTES: usize = 2 * 1024 * 1024;

/// One per-field validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field the message belongs to.
    pub field: &'static str,
    /// Human-readable message.
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: &str) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }
}

/// Editable state of the intake form.
///
/// `state`/`district`/`postal_code` are carried as plain strings here; they
/// only become part of the record when the country keeps the drill-down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValues {
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
    /// Selected country.
    pub country: Country,
    /// Street address (India) or full address (elsewhere).
    pub street_address: String,
    /// Selected state name, when the drill-down applies.
    pub state: String,
    /// Selected district name, when the drill-down applies.
    pub district: String,
    /// Selected pincode, when the drill-down applies.
    pub postal_code: String,
    /// Encoded avatar image, when one was uploaded.
    pub avatar_data_url: Option<String>,
    /// Email notification toggles.
    pub notifications: NotificationPrefs,
    /// Push-notification mode.
    pub push_notifications: PushMode,
}

impl Default for FormValues {
    fn default() -> Self {
        Self {
            username: String::new(),
            about: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            country: Country::India,
            street_address: String::new(),
            state: String::new(),
            district: String::new(),
            postal_code: String::new(),
            avatar_data_url: None,
            notifications: NotificationPrefs::default(),
            push_notifications: PushMode::default(),
        }
    }
}

impl FormValues {
    /// Validates every field, returning all failures at once.
    ///
    /// Submission must be blocked while this is non-empty. The drill-down
    /// fields are required only for the drill-down-supporting country and
    /// are never validated otherwise.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if !required(&self.username) {
            errors.push(FieldError::new("username", "Username is required"));
        }
        if !required(&self.first_name) {
            errors.push(FieldError::new("firstName", "First name is required"));
        }
        if !required(&self.last_name) {
            errors.push(FieldError::new("lastName", "Last name is required"));
        }
        if !required(&self.email) {
            errors.push(FieldError::new("email", "Email is required"));
        } else if !is_email(&self.email) {
            errors.push(FieldError::new("email", "Enter a valid email address"));
        }

        if self.country.supports_drill_down() {
            if !required(&self.state) {
                errors.push(FieldError::new("state", "State is required"));
            }
            if !required(&self.district) {
                errors.push(FieldError::new("district", "District is required"));
            }
            if !required(&self.postal_code) {
                errors.push(FieldError::new("postalCode", "Pincode is required"));
            }
            if !required(&self.street_address) {
                errors.push(FieldError::new("streetAddress", "Street address is required"));
            }
        } else if !required(&self.street_address) {
            errors.push(FieldError::new("streetAddress", "Address is required"));
        }

        if let Some(url) = &self.avatar_data_url {
            if url.len() > AVATAR_MAX_BYTES {
                errors.push(FieldError::new("avatar", "Avatar must be under 2MB"));
            }
        }

        errors
    }

    /// Converts validated values into a creation/update draft.
    ///
    /// Drill-down fields are dropped, not carried, for the non-drill-down
    /// country.
    pub fn to_draft(&self) -> ProfileDraft {
        let residency = match self.country {
            Country::India => Residency::India {
                state: self.state.clone(),
                district: self.district.clone(),
                postal_code: self.postal_code.clone(),
            },
            Country::NonIndianResident => Residency::Foreign,
        };
        ProfileDraft {
            username: self.username.clone(),
            about: self.about.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            residency,
            street_address: self.street_address.clone(),
            avatar_data_url: self.avatar_data_url.clone(),
            notifications: self.notifications,
            push_notifications: self.push_notifications,
        }
    }

    /// Pre-fills the form from an existing record for edit mode.
    pub fn from_record(rec: &ProfileRecord) -> Self {
        Self {
            username: rec.username.clone(),
            about: rec.about.clone(),
            first_name: rec.first_name.clone(),
            last_name: rec.last_name.clone(),
            email: rec.email.clone(),
            country: rec.country(),
            street_address: rec.street_address.clone(),
            state: rec.residency.state().unwrap_or_default().to_string(),
            district: rec.residency.district().unwrap_or_default().to_string(),
            postal_code: rec.residency.postal_code().unwrap_or_default().to_string(),
            avatar_data_url: rec.avatar_data_url.clone(),
            notifications: rec.notifications,
            push_notifications: rec.push_notifications,
        }
    }
}

fn required(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Structural email check: non-empty local part, single `@`, dotted domain,
/// no whitespace anywhere.
fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((head, tail)) => !head.is_empty() && !tail.is_empty(),
        None => false,
    }
}
