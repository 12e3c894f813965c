//! Integration tests for signup, login, and user CRUD.
//!
//! Requires a running server and migrated database; see the crate docs.

use reqwest::StatusCode;
use serde_json::{Value, json};

use goria_integration_tests::{base_url, client, signup_and_login, unique_email};

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_signup_validation_is_itemized() {
    let client = client();
    let base = base_url();

    let resp = client
        .post(format!("{base}/users"))
        .json(&json!({}))
        .send()
        .await
        .expect("signup request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("error body");
    assert_eq!(
        body["error"]["validation"],
        "first_name,last_name,email,password"
    );

    // Server-computed fields are rejected by name
    let resp = client
        .post(format!("{base}/users"))
        .json(&json!({
            "first_name": "Munchkin",
            "last_name": "Confidential",
            "email": unique_email("validate"),
            "password": "password123",
            "role": "admin",
            "billing_address_id": 1,
        }))
        .send()
        .await
        .expect("signup request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("error body");
    assert_eq!(body["error"]["validation"], "!role,!billing_address_id");
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_signup_sets_server_fields() {
    let client = client();
    let email = unique_email("signup");
    let user = signup_and_login(&client, &email, "password123").await;

    assert_eq!(user["role"], "user");
    assert_eq!(user["username"], email.as_str());
    assert!(user["billing_address_id"].is_null());
    assert!(user["shipping_address_id"].is_null());
    // The password hash never leaves the server
    assert!(user.get("password").is_none());
    assert!(user.get("password_hash").is_none());
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_duplicate_signup_rejected() {
    let client = client();
    let base = base_url();
    let email = unique_email("duplicate");
    signup_and_login(&client, &email, "password123").await;

    let resp = client
        .post(format!("{base}/users"))
        .json(&json!({
            "first_name": "Munchkin",
            "last_name": "Confidential",
            "email": email,
            "password": "password123",
        }))
        .send()
        .await
        .expect("signup request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_login_rejects_bad_password() {
    let client = client();
    let base = base_url();
    let email = unique_email("badpass");
    signup_and_login(&client, &email, "password123").await;

    let resp = client
        .post(format!("{base}/auth/login"))
        .json(&json!({ "username": email, "password": "not-the-password" }))
        .send()
        .await
        .expect("login request");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_update_forbids_pointer_fields() {
    let client = client();
    let base = base_url();
    let user = signup_and_login(&client, &unique_email("update"), "password123").await;
    let user_id = user["id"].as_i64().expect("user id");

    let resp = client
        .put(format!("{base}/users/{user_id}"))
        .json(&json!({ "first_name": "Renamed", "billing_address_id": 1 }))
        .send()
        .await
        .expect("update request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("error body");
    assert_eq!(body["error"]["validation"], "!billing_address_id");

    let resp = client
        .put(format!("{base}/users/{user_id}"))
        .json(&json!({ "first_name": "Renamed" }))
        .send()
        .await
        .expect("update request");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("update body");
    assert_eq!(body["first_name"], "Renamed");
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_plain_user_cannot_touch_other_accounts() {
    let alice = client();
    let user = signup_and_login(&alice, &unique_email("alice"), "password123").await;
    let alice_id = user["id"].as_i64().expect("user id");

    let mallory = client();
    signup_and_login(&mallory, &unique_email("mallory"), "password123").await;

    let resp = mallory
        .put(format!("{}/users/{alice_id}", base_url()))
        .json(&json!({ "first_name": "Hijacked" }))
        .send()
        .await
        .expect("update request");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = mallory
        .delete(format!("{}/users/{alice_id}", base_url()))
        .send()
        .await
        .expect("delete request");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_user_delete_cascades_addresses() {
    let client = client();
    let base = base_url();
    let user = signup_and_login(&client, &unique_email("cascade"), "password123").await;
    let user_id = user["id"].as_i64().expect("user id");

    let resp = client
        .post(format!("{base}/addresses/{user_id}"))
        .json(&json!({
            "name": "Test Address",
            "address1": "111 Foo St",
            "zip": "11111",
            "city": "Foo Arbor",
            "state": "CA",
            "country": "US",
            "phone": "8005551212",
        }))
        .send()
        .await
        .expect("create request");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let address: Value = resp.json().await.expect("create body");
    let address_id = address["id"].as_i64().expect("address id");

    let resp = client
        .delete(format!("{base}/users/{user_id}"))
        .send()
        .await
        .expect("delete request");
    assert_eq!(resp.status(), StatusCode::OK);

    // The owned address went with the account
    let resp = client
        .get(format!("{base}/addresses/{address_id}"))
        .send()
        .await
        .expect("read request");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
