//! Integration tests for addresses and the billing/shipping flag sync.
//!
//! Requires a running server and migrated database; see the crate docs.
//! Run with: cargo test -p goria-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use goria_integration_tests::{base_url, client, signup_and_login, unique_email};

fn address_body() -> Value {
    json!({
        "name": "Test Address",
        "address1": "111 Foo St",
        "zip": "11111",
        "city": "Foo Arbor",
        "state": "CA",
        "country": "US",
        "phone": "8005551212",
    })
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_address_create_derives_twilio() {
    let client = client();
    let base = base_url();
    let user = signup_and_login(&client, &unique_email("addr-create"), "password123").await;
    let user_id = user["id"].as_i64().expect("user id");

    let resp = client
        .post(format!("{base}/addresses/{user_id}"))
        .json(&address_body())
        .send()
        .await
        .expect("create request");

    assert_eq!(resp.status(), StatusCode::CREATED);
    let address: Value = resp.json().await.expect("create body");
    assert_eq!(address["twilio"], "18005551212");
    assert_eq!(address["billing"], false);
    assert_eq!(address["shipping"], false);
    // owner is populated on the response
    assert_eq!(address["user"]["id"].as_i64(), Some(user_id));
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_address_create_validation_is_itemized() {
    let client = client();
    let base = base_url();
    let user = signup_and_login(&client, &unique_email("addr-validate"), "password123").await;
    let user_id = user["id"].as_i64().expect("user id");

    let resp = client
        .post(format!("{base}/addresses/{user_id}"))
        .json(&json!({ "user_id": 99, "twilio": "foo" }))
        .send()
        .await
        .expect("create request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("error body");
    assert_eq!(
        body["error"]["validation"],
        "name,address1,zip,city,state,country,phone,!user_id,!twilio"
    );
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_address_create_requires_auth() {
    let anonymous = client();
    let resp = anonymous
        .post(format!("{}/addresses/1", base_url()))
        .json(&address_body())
        .send()
        .await
        .expect("create request");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.expect("error body");
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_phone_update_rederives_twilio() {
    let client = client();
    let base = base_url();
    let user = signup_and_login(&client, &unique_email("addr-phone"), "password123").await;
    let user_id = user["id"].as_i64().expect("user id");

    let resp = client
        .post(format!("{base}/addresses/{user_id}"))
        .json(&address_body())
        .send()
        .await
        .expect("create request");
    let address: Value = resp.json().await.expect("create body");
    let address_id = address["id"].as_i64().expect("address id");

    let resp = client
        .put(format!("{base}/addresses/{address_id}"))
        .json(&json!({ "phone": "1112223333" }))
        .send()
        .await
        .expect("update request");

    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.expect("update body");
    assert_eq!(updated["phone"], "1112223333");
    assert_eq!(updated["twilio"], "11112223333");
}

/// The full promotion/demotion scenario across two addresses.
#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_billing_and_shipping_flag_sync() {
    let client = client();
    let base = base_url();
    let user = signup_and_login(&client, &unique_email("addr-flags"), "password123").await;
    let user_id = user["id"].as_i64().expect("user id");

    let create = |body: Value| {
        let client = &client;
        let base = base.clone();
        async move {
            let resp = client
                .post(format!("{base}/addresses/{user_id}"))
                .json(&body)
                .send()
                .await
                .expect("create request");
            assert_eq!(resp.status(), StatusCode::CREATED);
            resp.json::<Value>().await.expect("create body")
        }
    };

    let fetch_user = || {
        let client = &client;
        let base = base.clone();
        async move {
            let resp = client
                .get(format!("{base}/users/{user_id}"))
                .send()
                .await
                .expect("user request");
            assert_eq!(resp.status(), StatusCode::OK);
            resp.json::<Value>().await.expect("user body")
        }
    };

    let fetch_address = |id: i64| {
        let client = &client;
        let base = base.clone();
        async move {
            let resp = client
                .get(format!("{base}/addresses/{id}"))
                .send()
                .await
                .expect("address request");
            assert_eq!(resp.status(), StatusCode::OK);
            resp.json::<Value>().await.expect("address body")
        }
    };

    let a = create(address_body()).await;
    let a_id = a["id"].as_i64().expect("a id");
    assert_eq!(a["twilio"], "18005551212");

    // Promote A to shipping, then billing
    let resp = client
        .put(format!("{base}/addresses/{a_id}"))
        .json(&json!({ "shipping": true }))
        .send()
        .await
        .expect("update request");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .put(format!("{base}/addresses/{a_id}"))
        .json(&json!({ "billing": true }))
        .send()
        .await
        .expect("update request");
    assert_eq!(resp.status(), StatusCode::OK);

    let a = fetch_address(a_id).await;
    assert_eq!(a["billing"], true);
    assert_eq!(a["shipping"], true);

    let u = fetch_user().await;
    assert_eq!(u["billing_address_id"].as_i64(), Some(a_id));
    assert_eq!(u["shipping_address_id"].as_i64(), Some(a_id));
    assert_eq!(u["billing_address"]["id"].as_i64(), Some(a_id));

    // Promote B to both in one write; A loses both flags
    let b = create(address_body()).await;
    let b_id = b["id"].as_i64().expect("b id");

    let resp = client
        .put(format!("{base}/addresses/{b_id}"))
        .json(&json!({ "billing": true, "shipping": true }))
        .send()
        .await
        .expect("update request");
    assert_eq!(resp.status(), StatusCode::OK);

    let a = fetch_address(a_id).await;
    let b = fetch_address(b_id).await;
    assert_eq!(a["billing"], false);
    assert_eq!(a["shipping"], false);
    assert_eq!(b["billing"], true);
    assert_eq!(b["shipping"], true);

    let u = fetch_user().await;
    assert_eq!(u["billing_address_id"].as_i64(), Some(b_id));
    assert_eq!(u["shipping_address_id"].as_i64(), Some(b_id));

    // Demote B's billing; shipping and its pointer stay put
    let resp = client
        .put(format!("{base}/addresses/{b_id}"))
        .json(&json!({ "billing": false }))
        .send()
        .await
        .expect("update request");
    assert_eq!(resp.status(), StatusCode::OK);

    let b = fetch_address(b_id).await;
    assert_eq!(b["billing"], false);
    assert_eq!(b["shipping"], true);

    let u = fetch_user().await;
    assert!(u["billing_address_id"].is_null());
    assert_eq!(u["shipping_address_id"].as_i64(), Some(b_id));

    // Demoting a non-current address must not clear the pointer
    let resp = client
        .put(format!("{base}/addresses/{a_id}"))
        .json(&json!({ "shipping": true }))
        .send()
        .await
        .expect("update request");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .put(format!("{base}/addresses/{b_id}"))
        .json(&json!({ "shipping": false }))
        .send()
        .await
        .expect("update request");
    assert_eq!(resp.status(), StatusCode::OK);

    let u = fetch_user().await;
    // B was no longer current when demoted, so A's pointer survives
    assert_eq!(u["shipping_address_id"].as_i64(), Some(a_id));
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_delete_clears_pointer() {
    let client = client();
    let base = base_url();
    let user = signup_and_login(&client, &unique_email("addr-delete"), "password123").await;
    let user_id = user["id"].as_i64().expect("user id");

    let resp = client
        .post(format!("{base}/addresses/{user_id}"))
        .json(&address_body())
        .send()
        .await
        .expect("create request");
    let address: Value = resp.json().await.expect("create body");
    let address_id = address["id"].as_i64().expect("address id");

    let resp = client
        .put(format!("{base}/addresses/{address_id}"))
        .json(&json!({ "billing": true, "shipping": true }))
        .send()
        .await
        .expect("update request");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .delete(format!("{base}/addresses/{address_id}"))
        .send()
        .await
        .expect("delete request");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base}/addresses/{address_id}"))
        .send()
        .await
        .expect("read request");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client
        .get(format!("{base}/users/{user_id}"))
        .send()
        .await
        .expect("user request");
    let u: Value = resp.json().await.expect("user body");
    assert!(u["billing_address_id"].is_null());
    assert!(u["shipping_address_id"].is_null());

    // Deleting again is a 404
    let resp = client
        .delete(format!("{base}/addresses/{address_id}"))
        .send()
        .await
        .expect("delete request");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
