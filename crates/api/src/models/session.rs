//! Session-stored types.

use serde::{Deserialize, Serialize};

use goria_core::{Role, UserId};

/// Session storage keys.
pub mod session_keys {
    /// Key under which the authenticated caller is stored.
    pub const CURRENT_USER: &str = "goria.current_user";
}

/// The authenticated caller, as stored in the session.
///
/// Deliberately minimal: just enough to authorize requests without a
/// database round-trip. Profile data is fetched fresh when needed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub role: Role,
}

impl CurrentUser {
    /// Whether this caller holds the elevated role.
    #[must_use]
    pub const fn is_elevated(&self) -> bool {
        self.role.is_elevated()
    }
}
