//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Status document
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Readiness check (DB ping)
//!
//! # Auth
//! POST /auth/login              - Login (issues session cookie)
//! POST /auth/logout             - Logout
//!
//! # Users
//! POST /users                   - Signup (open)
//! GET  /users                   - List users (query filters)
//! GET  /users/{id}              - Read user (pointer addresses populated)
//! PUT  /users/{id}              - Update user (owner or elevated)
//! DELETE /users/{id}            - Delete user + cascade addresses
//!
//! # Addresses
//! GET  /addresses               - List addresses (own, or any if elevated)
//! POST /addresses/{user_id}     - Create address for user
//! GET  /addresses/{id}          - Read address (owner populated)
//! PUT  /addresses/{id}          - Update address (flag sync applies)
//! DELETE /addresses/{id}        - Delete address (pointers cleared)
//!
//! # SKU taxonomy (reads authenticated, writes elevated)
//! POST|GET /sku/group           GET|PUT|DELETE /sku/group/{id}
//! POST|GET /sku/size            GET|PUT|DELETE /sku/size/{id}
//! POST|GET /sku/line            GET|PUT|DELETE /sku/line/{id}
//! POST|GET /sku/type            GET|PUT|DELETE /sku/type/{id}
//!
//! # Settings (all elevated)
//! POST|GET /settings            GET|PUT|DELETE /settings/{id}
//! ```

pub mod addresses;
pub mod auth;
pub mod settings;
pub mod sku;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/addresses", addresses::router())
        .nest("/sku", sku::routes())
        .nest("/settings", settings::router())
}
