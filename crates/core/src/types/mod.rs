//! Core types for the Goria API.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod phone;
pub mod role;

pub use email::{Email, EmailError};
pub use id::*;
pub use phone::dialable;
pub use role::{Role, RoleError};
