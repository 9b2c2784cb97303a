//! Typed wrappers over the REST endpoints, one per resource.

mod api_keys;
mod mailboxes;
mod messages;
mod webhooks;

pub use api_keys::ApiKeys;
pub use mailboxes::Mailboxes;
pub use messages::Messages;
pub use webhooks::Webhooks;
