//! SKU taxonomy domain types.
//!
//! Group, Size, Line, and Type are flat reference records used to compose
//! SKU codes. They carry a display flag for storefront visibility and a
//! short code that becomes a SKU segment. Size additionally belongs to a
//! Type (e.g. sizes "S"/"M"/"L" under type "apparel").

use chrono::{DateTime, Utc};
use serde::Serialize;

use goria_core::{GroupId, LineId, SizeId, TypeId};

/// A product group (top-level SKU segment).
#[derive(Debug, Clone, Serialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub sku_shortcode: String,
    pub display: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product line.
#[derive(Debug, Clone, Serialize)]
pub struct Line {
    pub id: LineId,
    pub name: String,
    pub sku_shortcode: String,
    pub display: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product type. Named `SkuType` because `Type` collides with too much
/// of the ecosystem's vocabulary.
#[derive(Debug, Clone, Serialize)]
pub struct SkuType {
    pub id: TypeId,
    pub name: String,
    pub sku_shortcode: String,
    pub display: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A size within a [`SkuType`].
#[derive(Debug, Clone, Serialize)]
pub struct Size {
    pub id: SizeId,
    pub name: String,
    pub sku_shortcode: String,
    pub type_id: TypeId,
    pub display: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
