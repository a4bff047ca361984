use axum::http::StatusCode;
use serde_json::json;
use wiremock::{
    Mock, ResponseTemplate,
    matchers::{any, body_json, body_partial_json, method, path},
};

use super::{account_json, item_json, link_session, received_bodies, test_request};

fn link_token_json() -> serde_json::Value {
    json!({
        "link_token": "link-sandbox-af1a0311-da53-4636-b754-dd15cc058176",
        "expiration": "2024-03-15T16:00:00Z",
        "request_id": "req-link",
        "hosted_link_url": null
    })
}

/// Expects exactly one balance call made with `access_token`.
async fn expect_balance_call_with(app: &super::TestApp, access_token: &str) {
    Mock::given(method("POST"))
        .and(path("/accounts/balance/get"))
        .and(body_json(json!({ "access_token": access_token })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accounts": [account_json("acc-1", None)],
            "item": item_json(),
            "request_id": "req-balance"
        })))
        .expect(1)
        .mount(&app.plaid)
        .await;

    app.server
        .get("/api/accountBalance")
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn exchange_public_token_returns_the_token_and_keeps_it_in_the_session() {
    test_request(|app| async move {
        Mock::given(method("POST"))
            .and(path("/item/public_token/exchange"))
            .and(body_json(json!({ "public_token": "public-sandbox-abc" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "access-xyz",
                "item_id": "item-1",
                "request_id": "req-exchange"
            })))
            .expect(1)
            .mount(&app.plaid)
            .await;

        let response = app
            .server
            .post("/api/exchange_public_token")
            .json(&json!({ "public_token": "public-sandbox-abc" }))
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({
            "access_token": "access-xyz",
            "item_id": "item-1",
            "error": null,
            "status": true
        }));

        app.server
            .get("/api/is_user_connected")
            .await
            .assert_json(&json!({ "status": true }));

        expect_balance_call_with(&app, "access-xyz").await;
    })
    .await
}

#[tokio::test]
async fn exchange_public_token_replaces_an_earlier_access_token() {
    test_request(|app| async move {
        link_session(&app, "public-sandbox-first", "access-first").await;
        link_session(&app, "public-sandbox-second", "access-second").await;

        expect_balance_call_with(&app, "access-second").await;
    })
    .await
}

#[tokio::test]
async fn exchange_public_token_reports_rejected_tokens_and_stays_unlinked() {
    test_request(|app| async move {
        Mock::given(path("/item/public_token/exchange"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error_type": "INVALID_INPUT",
                "error_code": "INVALID_PUBLIC_TOKEN",
                "error_message": "provided public token is in an invalid format",
                "display_message": null,
                "request_id": "req-exchange"
            })))
            .expect(1)
            .mount(&app.plaid)
            .await;

        let response = app
            .server
            .post("/api/exchange_public_token")
            .json(&json!({ "public_token": "garbage" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({
            "status": false,
            "error": "provided public token is in an invalid format"
        }));

        app.server
            .get("/api/is_user_connected")
            .await
            .assert_json(&json!({ "status": false }));
    })
    .await
}

#[tokio::test]
async fn exchange_public_token_rejects_a_body_without_public_token() {
    test_request(|app| async move {
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&app.plaid)
            .await;

        let response = app
            .server
            .post("/api/exchange_public_token")
            .json(&json!({ "token": "public-sandbox-abc" }))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.json::<serde_json::Value>()["status"], json!(false));
    })
    .await
}

#[tokio::test]
async fn create_link_token_passes_the_plaid_payload_through() {
    test_request(|app| async move {
        Mock::given(method("POST"))
            .and(path("/link/token/create"))
            .and(body_partial_json(json!({
                "client_name": "Link Proxy",
                "language": "en",
                "country_codes": ["US"],
                "products": ["auth", "transactions", "identity"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(link_token_json()))
            .expect(1)
            .mount(&app.plaid)
            .await;

        let response = app.server.get("/api/create_link_token").await;

        response.assert_status_ok();
        response.assert_json(&link_token_json());

        let bodies = received_bodies(&app, "/link/token/create").await;
        let client_user_id = bodies[0]["user"]["client_user_id"]
            .as_str()
            .expect("client_user_id is not a string");
        assert!(!client_user_id.is_empty(), "client_user_id must be the session id");
    })
    .await
}

#[tokio::test]
async fn create_link_token_twice_leaves_the_access_token_alone() {
    test_request(|app| async move {
        link_session(&app, "public-sandbox-abc", "access-xyz").await;

        Mock::given(path("/link/token/create"))
            .respond_with(ResponseTemplate::new(200).set_body_json(link_token_json()))
            .expect(2)
            .mount(&app.plaid)
            .await;

        app.server
            .get("/api/create_link_token")
            .await
            .assert_status_ok();
        app.server
            .get("/api/create_link_token")
            .await
            .assert_status_ok();

        let bodies = received_bodies(&app, "/link/token/create").await;
        assert_eq!(bodies.len(), 2);
        assert_eq!(
            bodies[0]["user"]["client_user_id"], bodies[1]["user"]["client_user_id"],
            "both link tokens belong to the same session"
        );

        app.server
            .get("/api/is_user_connected")
            .await
            .assert_json(&json!({ "status": true }));

        expect_balance_call_with(&app, "access-xyz").await;
    })
    .await
}

#[tokio::test]
async fn create_link_token_reports_plaid_outages() {
    test_request(|app| async move {
        Mock::given(path("/link/token/create"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&app.plaid)
            .await;

        let response = app.server.get("/api/create_link_token").await;

        response.assert_status(StatusCode::BAD_GATEWAY);
        response.assert_json(&json!({
            "status": false,
            "error": "the bank data provider could not be reached"
        }));
    })
    .await
}

#[tokio::test]
async fn create_link_token_keeps_one_client_user_id_before_linking() {
    test_request(|app| async move {
        Mock::given(path("/link/token/create"))
            .respond_with(ResponseTemplate::new(200).set_body_json(link_token_json()))
            .expect(2)
            .mount(&app.plaid)
            .await;

        let response = app.server.get("/api/create_link_token").await;
        response.assert_status_ok();
        assert!(
            response.maybe_cookie("id").is_some(),
            "the session cookie must be set on the first link token"
        );

        app.server
            .get("/api/create_link_token")
            .await
            .assert_status_ok();

        let bodies = received_bodies(&app, "/link/token/create").await;
        assert_eq!(bodies.len(), 2);
        assert_eq!(
            bodies[0]["user"]["client_user_id"], bodies[1]["user"]["client_user_id"],
            "an unlinked browser must keep its client_user_id"
        );

        app.server
            .get("/api/is_user_connected")
            .await
            .assert_json(&json!({ "status": false }));
    })
    .await
}
