use reqwest::Method;

use crate::models::{
    CreateMailboxParams, Deleted, ListMailboxesParams, Mailbox, UpdateMailboxParams,
};
use crate::{Client, Result};

/// Mailbox operations. Obtain with [`Client::mailboxes`].
#[derive(Debug, Clone, Copy)]
pub struct Mailboxes<'a> {
    client: &'a Client,
}

impl<'a> Mailboxes<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// List mailboxes, optionally filtered by name.
    ///
    /// # Arguments
    /// * `params` - Optional exact-name filter
    ///
    /// # Examples
    /// ```no_run
    /// # use plop_client::{Client, ListMailboxesParams};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), plop_client::Error> {
    /// let client = Client::new()?;
    /// for mailbox in client.mailboxes().list(&ListMailboxesParams::default()).await? {
    ///     println!("{} ({})", mailbox.name, mailbox.address);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn list(self, params: &ListMailboxesParams) -> Result<Vec<Mailbox>> {
        let request = self
            .client
            .request(Method::GET, &["v1", "mailboxes"])
            .query(params);
        self.client.send(request).await
    }

    /// Create a mailbox.
    ///
    /// # Returns
    /// The new mailbox with its receiving address
    pub async fn create(self, params: &CreateMailboxParams) -> Result<Mailbox> {
        let request = self
            .client
            .request(Method::POST, &["v1", "mailboxes"])
            .json(params);
        self.client.send(request).await
    }

    /// Rename a mailbox.
    ///
    /// # Arguments
    /// * `id` - The mailbox ID
    /// * `params` - The new name
    pub async fn update(self, id: &str, params: &UpdateMailboxParams) -> Result<Mailbox> {
        let request = self
            .client
            .request(Method::PATCH, &["v1", "mailboxes", id])
            .json(params);
        self.client.send(request).await
    }

    /// Delete a mailbox.
    pub async fn delete(self, id: &str) -> Result<Deleted> {
        let request = self.client.request(Method::DELETE, &["v1", "mailboxes", id]);
        self.client.send(request).await
    }
}
