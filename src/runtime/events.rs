//! Runtime event stream payloads.

use crate::types::{ProfileId, Revision};

/// Events emitted from the single-writer store runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileEvent {
    /// A new profile was created.
    Created {
        /// Created profile id.
        id: ProfileId,
    },
    /// An existing profile was updated.
    Updated {
        /// Updated profile id.
        id: ProfileId,
    },
    /// A profile was deleted.
    Deleted {
        /// Deleted profile id.
        id: ProfileId,
    },
    /// A record was loaded into the editor.
    EditStarted {
        /// Id now referenced by the editing pointer.
        id: ProfileId,
    },
    /// The editing pointer was cleared.
    EditCancelled,
    /// Persistence has reached at least this snapshot revision.
    PersistedUpTo {
        /// Highest revision known durable.
        revision: Revision,
    },
}
