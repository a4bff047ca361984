use axum::http::StatusCode;
use serde_json::json;
use wiremock::{
    Mock, ResponseTemplate,
    matchers::{any, body_json, method, path},
};

use super::{item_json, link_session, test_request};

#[tokio::test]
async fn get_bank_name_returns_the_institution_of_the_linked_item() {
    test_request(|app| async move {
        link_session(&app, "public-sandbox-abc", "access-xyz").await;

        Mock::given(method("POST"))
            .and(path("/item/get"))
            .and(body_json(json!({ "access_token": "access-xyz" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "item": item_json(), "request_id": "req-item" })),
            )
            .expect(1)
            .mount(&app.plaid)
            .await;

        Mock::given(method("POST"))
            .and(path("/institutions/get_by_id"))
            .and(body_json(
                json!({ "institution_id": "ins_1", "country_codes": ["US"] }),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "institution": {
                    "institution_id": "ins_1",
                    "name": "Test Bank",
                    "country_codes": ["US"],
                    "products": ["auth", "transactions", "identity"],
                    "routing_numbers": ["011401533"]
                },
                "request_id": "req-institution"
            })))
            .expect(1)
            .mount(&app.plaid)
            .await;

        let response = app.server.get("/api/get_bank_name").await;

        response.assert_status_ok();
        response.assert_json(&json!({ "name": "Test Bank" }));
    })
    .await
}

#[tokio::test]
async fn get_bank_name_requires_a_linked_account() {
    test_request(|app| async move {
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&app.plaid)
            .await;

        let response = app.server.get("/api/get_bank_name").await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<serde_json::Value>()["status"], json!(false));
    })
    .await
}

#[tokio::test]
async fn get_bank_name_fails_when_the_institution_lookup_fails() {
    test_request(|app| async move {
        link_session(&app, "public-sandbox-abc", "access-xyz").await;

        Mock::given(path("/item/get"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "item": item_json(), "request_id": "req-item" })),
            )
            .mount(&app.plaid)
            .await;

        Mock::given(path("/institutions/get_by_id"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error_type": "API_ERROR",
                "error_code": "INTERNAL_SERVER_ERROR",
                "error_message": "an unexpected error occurred",
                "display_message": null,
                "request_id": "req-institution"
            })))
            .mount(&app.plaid)
            .await;

        let response = app.server.get("/api/get_bank_name").await;

        response.assert_status(StatusCode::BAD_GATEWAY);
        response.assert_json(&json!({
            "status": false,
            "error": "an unexpected error occurred"
        }));
    })
    .await
}

#[tokio::test]
async fn get_bank_name_is_a_bad_gateway_when_the_item_has_no_institution() {
    test_request(|app| async move {
        link_session(&app, "public-sandbox-abc", "access-xyz").await;

        let mut item = item_json();
        item["institution_id"] = json!(null);

        Mock::given(path("/item/get"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "item": item, "request_id": "req-item" })),
            )
            .expect(1)
            .mount(&app.plaid)
            .await;

        Mock::given(path("/institutions/get_by_id"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&app.plaid)
            .await;

        let response = app.server.get("/api/get_bank_name").await;

        response.assert_status(StatusCode::BAD_GATEWAY);
        response.assert_json(&json!({
            "status": false,
            "error": "the linked item has no institution"
        }));
    })
    .await
}
