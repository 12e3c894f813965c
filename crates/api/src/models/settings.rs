//! Settings domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use goria_core::SettingId;

/// A named configuration record.
///
/// Everything but `name` is optional; absent fields fall back to whatever
/// default the consuming feature applies.
#[derive(Debug, Clone, Serialize)]
pub struct Setting {
    pub id: SettingId,
    pub name: String,
    pub incoming_order_alert_email: Option<String>,
    pub incoming_return_alert_email: Option<String>,
    pub incoming_review_alert_email: Option<String>,
    pub default_shipping_cost: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
