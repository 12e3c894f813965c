//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use goria_core::{AddressId, Email, Role, UserId};

/// An account holder.
///
/// The password hash lives in a separate table and never appears here, so
/// the type is safe to serialize straight into responses.
///
/// `billing_address_id` / `shipping_address_id` are denormalized pointers
/// maintained exclusively by the address flag-sync rule; clients can never
/// write them directly.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    /// Login name. Always equals the email address; kept as its own column
    /// so it can diverge later without a data migration.
    pub username: String,
    pub email: Email,
    pub role: Role,
    pub billing_address_id: Option<AddressId>,
    pub shipping_address_id: Option<AddressId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
