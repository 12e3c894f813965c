//! Integration tests for SKU taxonomy and settings authorization.
//!
//! Requires a running server and migrated database; the elevated tests
//! additionally need a seeded admin account (see the crate docs).

use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

use goria_integration_tests::{base_url, client, login_as_admin, signup_and_login, unique_email};

fn line_body() -> Value {
    let tag = Uuid::new_v4().simple().to_string();
    json!({
        "name": format!("Line {tag}"),
        "sku_shortcode": tag[..8].to_uppercase(),
        "display": true,
    })
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_taxonomy_reads_require_auth() {
    let anonymous = client();

    let resp = anonymous
        .get(format!("{}/sku/line", base_url()))
        .send()
        .await
        .expect("list request");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.expect("error body");
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_taxonomy_writes_require_elevated_role() {
    let client = client();
    signup_and_login(&client, &unique_email("sku-user"), "password123").await;

    let resp = client
        .post(format!("{}/sku/line", base_url()))
        .json(&line_body())
        .send()
        .await
        .expect("create request");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.expect("error body");
    assert_eq!(body["error"], "unauthorized");

    // Reads are fine for plain users
    let resp = client
        .get(format!("{}/sku/line", base_url()))
        .send()
        .await
        .expect("list request");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded admin"]
async fn test_taxonomy_crud_as_admin() {
    let client = client();
    let base = base_url();
    login_as_admin(&client).await;

    // Missing fields are itemized
    let resp = client
        .post(format!("{base}/sku/line"))
        .json(&json!({}))
        .send()
        .await
        .expect("create request");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("error body");
    assert_eq!(body["error"]["validation"], "name,sku_shortcode,display");

    // Create
    let line = line_body();
    let resp = client
        .post(format!("{base}/sku/line"))
        .json(&line)
        .send()
        .await
        .expect("create request");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.expect("create body");
    assert_eq!(created["name"], line["name"]);
    assert_eq!(created["display"], true);
    let id = created["id"].as_i64().expect("line id");

    // Read
    let resp = client
        .get(format!("{base}/sku/line/{id}"))
        .send()
        .await
        .expect("read request");
    assert_eq!(resp.status(), StatusCode::OK);

    // Update
    let resp = client
        .put(format!("{base}/sku/line/{id}"))
        .json(&json!({ "display": false }))
        .send()
        .await
        .expect("update request");
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.expect("update body");
    assert_eq!(updated["display"], false);

    // The ID is immutable
    let resp = client
        .put(format!("{base}/sku/line/{id}"))
        .json(&json!({ "id": 999 }))
        .send()
        .await
        .expect("update request");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("error body");
    assert_eq!(body["error"]["validation"], "!id");

    // Delete, then the record is gone
    let resp = client
        .delete(format!("{base}/sku/line/{id}"))
        .send()
        .await
        .expect("delete request");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base}/sku/line/{id}"))
        .send()
        .await
        .expect("read request");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded admin"]
async fn test_size_requires_existing_type() {
    let client = client();
    let base = base_url();
    login_as_admin(&client).await;

    // Sizes reference a type, so create one first
    let type_body = line_body();
    let resp = client
        .post(format!("{base}/sku/type"))
        .json(&type_body)
        .send()
        .await
        .expect("create type request");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created_type: Value = resp.json().await.expect("type body");
    let type_id = created_type["id"].as_i64().expect("type id");

    let size_body = {
        let mut body = line_body();
        body["type_id"] = json!(type_id);
        body
    };
    let resp = client
        .post(format!("{base}/sku/size"))
        .json(&size_body)
        .send()
        .await
        .expect("create size request");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let size: Value = resp.json().await.expect("size body");
    // The type is populated on the response
    assert_eq!(size["type"]["id"].as_i64(), Some(type_id));

    // An unknown type is a store-level rejection
    let bad_size = {
        let mut body = line_body();
        body["type_id"] = json!(999_999);
        body
    };
    let resp = client
        .post(format!("{base}/sku/size"))
        .json(&bad_size)
        .send()
        .await
        .expect("create size request");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_settings_require_elevated_role() {
    let client = client();
    signup_and_login(&client, &unique_email("settings-user"), "password123").await;

    let resp = client
        .get(format!("{}/settings", base_url()))
        .send()
        .await
        .expect("list request");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded admin"]
async fn test_settings_crud_as_admin() {
    let client = client();
    let base = base_url();
    login_as_admin(&client).await;

    let resp = client
        .post(format!("{base}/settings"))
        .json(&json!({
            "name": format!("store-{}", Uuid::new_v4()),
            "incoming_order_alert_email": "orders@example.com",
            "default_shipping_cost": "7.50",
        }))
        .send()
        .await
        .expect("create request");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let setting: Value = resp.json().await.expect("create body");
    assert_eq!(setting["default_shipping_cost"], "7.50");
    let id = setting["id"].as_i64().expect("setting id");

    let resp = client
        .put(format!("{base}/settings/{id}"))
        .json(&json!({ "incoming_return_alert_email": "returns@example.com" }))
        .send()
        .await
        .expect("update request");
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.expect("update body");
    assert_eq!(updated["incoming_return_alert_email"], "returns@example.com");
    // untouched fields survive partial updates
    assert_eq!(updated["incoming_order_alert_email"], "orders@example.com");

    let resp = client
        .delete(format!("{base}/settings/{id}"))
        .send()
        .await
        .expect("delete request");
    assert_eq!(resp.status(), StatusCode::OK);
}
