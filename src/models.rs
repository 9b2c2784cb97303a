//! Request and response types for the Plop API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Successful responses are wrapped as `{ "data": ... }`.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

/// Body of a non-2xx response.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: Option<String>,
    pub details: Option<crate::error::ErrorDetails>,
}

/// A mailbox that receives mail at `address`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mailbox {
    pub id: String,
    pub name: String,
    /// Custom domain, or `None` for the shared inbound domain.
    pub domain: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub address: String,
}

/// Summary of a received message, as listed and as pushed on the live stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSummary {
    pub id: String,
    pub mailbox_id: String,
    /// Mailbox name without the tag.
    pub mailbox: String,
    /// Mailbox name including `+tag`, when the message was sent to a tagged address.
    pub mailbox_with_tag: String,
    pub tag: Option<String>,
    pub from: String,
    pub to: String,
    pub subject: Option<String>,
    pub received_at: DateTime<Utc>,
}

/// A single raw header of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHeader {
    pub name: String,
    pub value: String,
}

/// Full message including headers and body content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDetail {
    #[serde(flatten)]
    pub summary: MessageSummary,
    pub headers: Vec<MessageHeader>,
    pub html_content: Option<String>,
    pub text_content: Option<String>,
    pub domain: String,
    pub tenant_subdomain: Option<String>,
}

/// One page of [`MessageSummary`] values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageList {
    pub data: Vec<MessageSummary>,
    /// More messages are available after the last one in `data`.
    pub has_more: bool,
}

/// A registered webhook endpoint. The signing secret is only shown masked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEndpoint {
    pub id: String,
    pub url: String,
    pub description: Option<String>,
    pub secret_masked: String,
    pub events: Vec<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Record of one attempt to deliver an event to a webhook endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookDelivery {
    pub id: String,
    pub event: String,
    pub message_id: Option<String>,
    pub status: String,
    pub http_status: Option<u16>,
    pub response_body: Option<String>,
    pub latency_ms: Option<u64>,
    pub attempt: u32,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Response to creating a webhook. `secret` is returned only this once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookCreated {
    pub endpoint: WebhookEndpoint,
    pub secret: String,
}

/// Result of enabling or disabling a webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookToggled {
    pub id: String,
    pub active: bool,
}

/// Metadata about an API key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyInfo {
    pub id: String,
    pub name: String,
    pub key_masked: String,
    pub scopes: Vec<String>,
    pub mailbox_name: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// A freshly rotated API key. `key` is the only time the full key is visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyRotation {
    pub key: String,
    pub api_key: ApiKeyInfo,
}

/// Id of a deleted resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted {
    pub id: String,
}

/// Filters for listing mailboxes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListMailboxesParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mailbox: Option<String>,
}

/// Body for creating a mailbox.
#[derive(Debug, Clone, Serialize)]
pub struct CreateMailboxParams {
    pub name: String,
}

/// Body for renaming a mailbox.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateMailboxParams {
    pub name: String,
}

/// Filters for listing and looking up messages.
///
/// Unset fields are left out of the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListMessagesParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mailbox: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Comma-separated list of tags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    /// Free-text search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    /// Only messages received at or after this RFC 3339 timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Cursor: only messages after this id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_id: Option<String>,
}

impl ListMessagesParams {
    /// Filter by mailbox name.
    pub fn mailbox(mut self, mailbox: impl Into<String>) -> Self {
        self.mailbox = Some(mailbox.into());
        self
    }

    /// Filter by tag.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

/// Filters for the live message stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreamParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mailbox: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
}

/// Body for registering a webhook endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CreateWebhookParams {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Paging for webhook deliveries.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListDeliveriesParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}
