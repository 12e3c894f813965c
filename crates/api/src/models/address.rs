//! Address domain types and the flag-sync planner.
//!
//! Every user owns any number of addresses, but per user at most one may be
//! flagged `billing` and at most one `shipping`. The decision of what a
//! billing/shipping write means (promotion, demotion, or nothing) is a pure
//! function here; the repository applies the resulting plan inside the same
//! transaction as the triggering write.

use chrono::{DateTime, Utc};
use serde::Serialize;

use goria_core::{AddressId, UserId};

/// A postal address owned by a single user.
#[derive(Debug, Clone, Serialize)]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub name: String,
    pub address1: String,
    pub address2: Option<String>,
    pub zip: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub phone: String,
    /// Dialable form of `phone`, derived server-side on every write.
    pub twilio: String,
    pub instructions: Option<String>,
    pub billing: bool,
    pub shipping: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What a requested flag value means relative to the stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagSync {
    /// Flag transitions to `true`: demote every sibling, set the flag on
    /// the target, and point the owner's matching pointer at the target.
    Promote,
    /// Flag transitions to `false`: clear the flag on the target and null
    /// the owner's pointer only if it currently points at the target.
    Demote,
    /// No transition; nothing to synchronize.
    Unchanged,
}

/// Plan the synchronization for one flag of one address write.
///
/// `requested` is the value in the incoming payload (`None` when the field
/// was not part of the write); `current` is the stored value. Writing the
/// value an address already has is not a transition, so re-sending
/// `billing: true` to the current billing address does nothing.
#[must_use]
pub const fn plan_flag_sync(requested: Option<bool>, current: bool) -> FlagSync {
    match (requested, current) {
        (Some(true), false) => FlagSync::Promote,
        (Some(false), true) => FlagSync::Demote,
        _ => FlagSync::Unchanged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_field_is_unchanged() {
        assert_eq!(plan_flag_sync(None, false), FlagSync::Unchanged);
        assert_eq!(plan_flag_sync(None, true), FlagSync::Unchanged);
    }

    #[test]
    fn test_setting_true_promotes_only_on_transition() {
        assert_eq!(plan_flag_sync(Some(true), false), FlagSync::Promote);
        assert_eq!(plan_flag_sync(Some(true), true), FlagSync::Unchanged);
    }

    #[test]
    fn test_setting_false_demotes_only_on_transition() {
        assert_eq!(plan_flag_sync(Some(false), true), FlagSync::Demote);
        assert_eq!(plan_flag_sync(Some(false), false), FlagSync::Unchanged);
    }
}
