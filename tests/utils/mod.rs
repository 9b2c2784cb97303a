#![allow(dead_code)]

use httpmock::MockServer;
use plop_client::Client;
use serde_json::{Value, json};

pub const TEST_API_KEY: &str = "plop_aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

pub fn client_for(server: &MockServer) -> Client {
    Client::builder()
        .api_key(TEST_API_KEY)
        .base_url(server.base_url())
        .build()
        .unwrap()
}

pub fn bearer() -> String {
    format!("Bearer {TEST_API_KEY}")
}

pub fn message_summary(id: &str, subject: &str) -> Value {
    json!({
        "id": id,
        "mailboxId": "mbox-1",
        "mailbox": "qa",
        "mailboxWithTag": "qa",
        "tag": null,
        "from": "sender@example.com",
        "to": "qa@in.plop.email",
        "subject": subject,
        "receivedAt": "2025-01-01T00:00:00Z"
    })
}

pub fn message_detail() -> Value {
    json!({
        "id": "uuid-1",
        "mailboxId": "mbox-1",
        "mailbox": "qa",
        "mailboxWithTag": "qa+verify",
        "tag": "verify",
        "from": "noreply@example.com",
        "to": "qa+verify@in.plop.email",
        "subject": "Verify your email",
        "receivedAt": "2025-01-01T00:00:00Z",
        "headers": [{ "name": "From", "value": "noreply@example.com" }],
        "htmlContent": "<p>Code: 123456</p>",
        "textContent": "Code: 123456",
        "domain": "in.plop.email",
        "tenantSubdomain": null
    })
}
