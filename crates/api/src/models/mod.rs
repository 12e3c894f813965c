//! Domain types for the API.
//!
//! These types represent validated domain objects separate from database
//! row types. They all serialize directly into the JSON response bodies.

pub mod address;
pub mod session;
pub mod settings;
pub mod sku;
pub mod user;

pub use address::{Address, FlagSync, plan_flag_sync};
pub use session::{CurrentUser, session_keys};
pub use settings::Setting;
pub use sku::{Group, Line, Size, SkuType};
pub use user::User;
