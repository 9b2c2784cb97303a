mod utils;

use httpmock::prelude::*;
use plop_client::{
    Client, CreateMailboxParams, CreateWebhookParams, Error, ListDeliveriesParams,
    ListMailboxesParams, UpdateMailboxParams,
};
use serde_json::json;
use utils::{TEST_API_KEY, bearer, client_for};

fn mailbox(id: &str, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "domain": null,
        "createdAt": "2025-01-01T00:00:00Z",
        "updatedAt": "2025-01-01T00:00:00Z",
        "address": format!("{name}@in.plop.email")
    })
}

fn webhook_endpoint() -> serde_json::Value {
    json!({
        "id": "wh-1",
        "url": "https://example.com/hook",
        "description": null,
        "secretMasked": "whsec_****abcd",
        "events": ["message.received"],
        "active": true,
        "createdAt": "2025-01-01T00:00:00Z",
        "updatedAt": "2025-01-01T00:00:00Z"
    })
}

#[tokio::test]
async fn sends_bearer_authorization() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1/mailboxes")
                .header("authorization", bearer());
            then.status(200).json_body(json!({ "data": [] }));
        })
        .await;

    let mailboxes = client_for(&server)
        .mailboxes()
        .list(&ListMailboxesParams::default())
        .await
        .unwrap();

    assert!(mailboxes.is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn trailing_slash_in_base_url_is_ignored() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/mailboxes");
            then.status(200).json_body(json!({ "data": [] }));
        })
        .await;

    let client = Client::builder()
        .api_key(TEST_API_KEY)
        .base_url(format!("{}/", server.base_url()))
        .build()
        .unwrap();
    client
        .mailboxes()
        .list(&ListMailboxesParams::default())
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn api_error_carries_status_and_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/mailboxes");
            then.status(401).json_body(json!({ "error": "Unauthorized" }));
        })
        .await;

    let err = client_for(&server)
        .mailboxes()
        .list(&ListMailboxesParams::default())
        .await
        .unwrap_err();

    assert_eq!(err.status(), 401);
    assert_eq!(err.to_string(), "Unauthorized");
    assert!(err.details().is_none());
}

#[tokio::test]
async fn validation_error_carries_details() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/messages");
            then.status(400).json_body(json!({
                "error": "Validation failed",
                "details": { "limit": ["Must be between 1 and 200"] }
            }));
        })
        .await;

    let params = plop_client::ListMessagesParams {
        limit: Some(999),
        ..Default::default()
    };
    let err = client_for(&server)
        .messages()
        .list(&params)
        .await
        .unwrap_err();

    assert_eq!(err.status(), 400);
    let details = err.details().unwrap();
    assert_eq!(details["limit"], ["Must be between 1 and 200"]);
}

#[tokio::test]
async fn non_json_error_body_uses_generic_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(DELETE).path("/v1/mailboxes/mbox-1");
            then.status(502).body("<html>Bad Gateway</html>");
        })
        .await;

    let err = client_for(&server)
        .mailboxes()
        .delete("mbox-1")
        .await
        .unwrap_err();

    assert_eq!(err.status(), 502);
    assert_eq!(err.to_string(), "Request failed with status 502");
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    let client = Client::builder()
        .api_key(TEST_API_KEY)
        .base_url("http://127.0.0.1:1")
        .build()
        .unwrap();

    let err = client
        .mailboxes()
        .list(&ListMailboxesParams::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Network(_)));
    assert_eq!(err.status(), 0);
}

#[tokio::test]
async fn malformed_success_body_is_a_json_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/webhooks");
            then.status(200).body("not json");
        })
        .await;

    let err = client_for(&server).webhooks().list().await.unwrap_err();
    assert!(matches!(err, Error::Json(_)));
}

#[tokio::test]
async fn mailbox_crud() {
    let server = MockServer::start_async().await;
    let list = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1/mailboxes")
                .query_param("mailbox", "qa");
            then.status(200)
                .json_body(json!({ "data": [mailbox("mbox-1", "qa")] }));
        })
        .await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/mailboxes")
                .header("content-type", "application/json")
                .json_body(json!({ "name": "qa" }));
            then.status(201)
                .json_body(json!({ "data": mailbox("mbox-1", "qa") }));
        })
        .await;
    let update = server
        .mock_async(|when, then| {
            when.method(httpmock::Method::PATCH)
                .path("/v1/mailboxes/mbox-1")
                .json_body(json!({ "name": "staging" }));
            then.status(200)
                .json_body(json!({ "data": mailbox("mbox-1", "staging") }));
        })
        .await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/v1/mailboxes/mbox-1");
            then.status(200).json_body(json!({ "data": { "id": "mbox-1" } }));
        })
        .await;

    let client = client_for(&server);
    let mailboxes = client.mailboxes();

    let listed = mailboxes
        .list(&ListMailboxesParams {
            mailbox: Some("qa".into()),
        })
        .await
        .unwrap();
    assert_eq!(listed[0].address, "qa@in.plop.email");

    let created = mailboxes
        .create(&CreateMailboxParams { name: "qa".into() })
        .await
        .unwrap();
    assert_eq!(created.id, "mbox-1");

    let updated = mailboxes
        .update(
            "mbox-1",
            &UpdateMailboxParams {
                name: "staging".into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "staging");

    let deleted = mailboxes.delete("mbox-1").await.unwrap();
    assert_eq!(deleted.id, "mbox-1");

    list.assert_async().await;
    create.assert_async().await;
    update.assert_async().await;
    delete.assert_async().await;
}

#[tokio::test]
async fn rotates_api_key() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/api-keys/rotate");
            then.status(200).json_body(json!({
                "data": {
                    "key": "plop_new",
                    "apiKey": {
                        "id": "key-1",
                        "name": "CI",
                        "keyMasked": "plop_****_new",
                        "scopes": ["messages:read"],
                        "mailboxName": null,
                        "expiresAt": null
                    }
                }
            }));
        })
        .await;

    let rotated = client_for(&server).api_keys().rotate().await.unwrap();
    assert_eq!(rotated.key, "plop_new");
    assert_eq!(rotated.api_key.scopes, ["messages:read"]);
    assert!(rotated.api_key.expires_at.is_none());
    mock.assert_async().await;
}

#[tokio::test]
async fn webhook_endpoints() {
    let server = MockServer::start_async().await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/webhooks")
                .json_body(json!({ "url": "https://example.com/hook" }));
            then.status(201).json_body(json!({
                "data": { "endpoint": webhook_endpoint(), "secret": "whsec_full" }
            }));
        })
        .await;
    let toggle = server
        .mock_async(|when, then| {
            when.method(httpmock::Method::PATCH)
                .path("/v1/webhooks/wh-1")
                .json_body(json!({ "active": false }));
            then.status(200)
                .json_body(json!({ "data": { "id": "wh-1", "active": false } }));
        })
        .await;
    let deliveries = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1/webhooks/wh-1/deliveries")
                .query_param("limit", "10")
                .query_param("offset", "20");
            then.status(200).json_body(json!({
                "data": [{
                    "id": "del-1",
                    "event": "message.received",
                    "messageId": "msg-1",
                    "status": "failed",
                    "httpStatus": 500,
                    "responseBody": "oops",
                    "latencyMs": 120,
                    "attempt": 2,
                    "error": "HTTP 500",
                    "createdAt": "2025-01-01T00:00:00Z"
                }]
            }));
        })
        .await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/v1/webhooks/wh-1");
            then.status(200).json_body(json!({ "data": { "id": "wh-1" } }));
        })
        .await;

    let client = client_for(&server);
    let webhooks = client.webhooks();

    let created = webhooks
        .create(&CreateWebhookParams {
            url: "https://example.com/hook".into(),
            description: None,
        })
        .await
        .unwrap();
    assert_eq!(created.secret, "whsec_full");
    assert_eq!(created.endpoint.events, ["message.received"]);

    let toggled = webhooks.toggle("wh-1", false).await.unwrap();
    assert!(!toggled.active);

    let listed = webhooks
        .deliveries(
            "wh-1",
            &ListDeliveriesParams {
                limit: Some(10),
                offset: Some(20),
            },
        )
        .await
        .unwrap();
    assert_eq!(listed[0].http_status, Some(500));
    assert_eq!(listed[0].attempt, 2);

    webhooks.delete("wh-1").await.unwrap();

    create.assert_async().await;
    toggle.assert_async().await;
    deliveries.assert_async().await;
    delete.assert_async().await;
}
