//! Integration tests for the Goria API.
//!
//! # Running Tests
//!
//! These tests drive a live server over HTTP and are `#[ignore]`d by
//! default. To run them:
//!
//! ```bash
//! # Migrate the database and start the server
//! cargo run -p goria-cli -- migrate
//! cargo run -p goria-api
//!
//! # In another terminal
//! cargo test -p goria-integration-tests -- --ignored
//! ```
//!
//! Tests that exercise elevated-only routes additionally need a seeded
//! admin account:
//!
//! ```bash
//! cargo run -p goria-cli -- seed admin \
//!     -e admin@example.com -f Ada -l Lovelace -p <password>
//! export GORIA_TEST_ADMIN_USERNAME=admin@example.com
//! export GORIA_TEST_ADMIN_PASSWORD=<password>
//! ```

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("GORIA_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned())
}

/// A client with a cookie store, so the session survives across requests.
///
/// # Panics
///
/// Panics if the client cannot be constructed.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// A unique throwaway email so test runs don't collide.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", Uuid::new_v4())
}

/// Sign up a fresh user and log the client in. Returns the created user.
///
/// # Panics
///
/// Panics if signup or login doesn't succeed.
pub async fn signup_and_login(client: &Client, email: &str, password: &str) -> Value {
    let base = base_url();

    let resp = client
        .post(format!("{base}/users"))
        .json(&json!({
            "first_name": "Munchkin",
            "last_name": "Confidential",
            "email": email,
            "password": password,
        }))
        .send()
        .await
        .expect("signup request");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let user: Value = resp.json().await.expect("signup body");

    let resp = client
        .post(format!("{base}/auth/login"))
        .json(&json!({ "username": email, "password": password }))
        .send()
        .await
        .expect("login request");
    assert_eq!(resp.status(), StatusCode::OK);

    user
}

/// Log a client in with the seeded admin account from the environment.
///
/// # Panics
///
/// Panics if the login doesn't succeed.
pub async fn login_as_admin(client: &Client) {
    let username =
        std::env::var("GORIA_TEST_ADMIN_USERNAME").unwrap_or_else(|_| "admin@example.com".to_owned());
    let password = std::env::var("GORIA_TEST_ADMIN_PASSWORD")
        .expect("GORIA_TEST_ADMIN_PASSWORD must be set for elevated tests");

    let resp = client
        .post(format!("{}/auth/login", base_url()))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("admin login request");
    assert_eq!(resp.status(), StatusCode::OK);
}
