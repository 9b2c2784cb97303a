//! # Plop Client
//! Asynchronous wrapper around the Plop email inbox HTTP API, providing methods to manage mailboxes, read and wait for messages, follow the live message stream, manage webhooks, and verify webhook signatures, using [`Client`] and [`ClientBuilder`].
//!
//! ## Audience and uses
//! For Rust developers who need to assert on real email in integration tests, end-to-end suites, or automation: send mail to a Plop mailbox, then fetch it with [`Messages::latest`], block on it with [`Messages::wait_for`], or react to it as it lands with [`Messages::stream`].
//!
//! ## Runtime requirements
//! Async-only; run inside a Tokio (v1) runtime. HTTP calls use `reqwest`. The live stream spawns one Tokio task per open [`MessageStream`].
//!
//! ## Logging
//! The crate emits [`tracing`](https://docs.rs/tracing) events and never installs a subscriber; configure one in your application to see them.
//!
//! ## Errors
//! Transport failures surface as [`Error::Network`] and non-2xx statuses as [`Error::Api`], carrying the status, server message, and field-level details. Malformed bodies become [`Error::Json`] or [`Error::Decode`]. [`Messages::wait_for`] fails with [`Error::Timeout`] and signature checks with [`Error::MalformedSignature`] when the header cannot be parsed. The crate-wide [`Result`] alias wraps these errors.
//!
//! ## Example
//! ```no_run
//! use plop_client::{Client, ListMessagesParams, WaitForOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), plop_client::Error> {
//!     let client = Client::builder().api_key("plop_...").build()?;
//!
//!     let message = client
//!         .messages()
//!         .wait_for(
//!             &ListMessagesParams::default().mailbox("qa").tag("login"),
//!             WaitForOptions::default(),
//!         )
//!         .await?;
//!     println!("From: {}, Subject: {:?}", message.summary.from, message.summary.subject);
//!
//!     client.messages().delete(&message.summary.id).await?;
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod models;
mod resources;
pub mod sse;
mod stream;
pub mod wait;
pub mod webhook;

pub use client::{Client, ClientBuilder};
pub use error::{Error, ErrorDetails};
pub use models::{
    ApiKeyInfo, ApiKeyRotation, CreateMailboxParams, CreateWebhookParams, Deleted,
    ListDeliveriesParams, ListMailboxesParams, ListMessagesParams, Mailbox, MessageDetail,
    MessageHeader, MessageList, MessageSummary, StreamParams, UpdateMailboxParams,
    WebhookCreated, WebhookDelivery, WebhookEndpoint, WebhookToggled,
};
pub use resources::{ApiKeys, Mailboxes, Messages, Webhooks};
pub use stream::{MESSAGE_RECEIVED, MessageStream};
pub use tokio_util::sync::CancellationToken;
pub use wait::WaitForOptions;

/// Result type alias for Plop operations.
///
/// This is equivalent to `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
