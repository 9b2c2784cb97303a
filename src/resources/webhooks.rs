use reqwest::Method;
use serde_json::json;

use crate::models::{
    CreateWebhookParams, Deleted, ListDeliveriesParams, WebhookCreated, WebhookDelivery,
    WebhookEndpoint, WebhookToggled,
};
use crate::webhook::verify_signature;
use crate::{Client, Result};

/// Webhook operations. Obtain with [`Client::webhooks`].
#[derive(Debug, Clone, Copy)]
pub struct Webhooks<'a> {
    client: &'a Client,
}

impl<'a> Webhooks<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Check the signature header of an incoming webhook request.
    ///
    /// See [`verify_signature`](crate::webhook::verify_signature).
    ///
    /// # Arguments
    /// * `secret` - The endpoint's signing secret
    /// * `signature` - The signature header, `t=<unix seconds>,v1=<hex>`
    /// * `body` - The raw request body, byte for byte
    ///
    /// # Returns
    /// `true` if the signature is valid and recent
    pub fn verify(self, secret: &str, signature: &str, body: impl AsRef<[u8]>) -> Result<bool> {
        verify_signature(secret, signature, body)
    }

    /// List registered webhook endpoints.
    pub async fn list(self) -> Result<Vec<WebhookEndpoint>> {
        let request = self.client.request(Method::GET, &["v1", "webhooks"]);
        self.client.send(request).await
    }

    /// Register a webhook endpoint.
    ///
    /// # Returns
    /// The endpoint together with its signing secret, which is shown only once
    ///
    /// # Examples
    /// ```no_run
    /// # use plop_client::{Client, CreateWebhookParams};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), plop_client::Error> {
    /// let client = Client::new()?;
    /// let params = CreateWebhookParams {
    ///     url: "https://example.com/hooks/plop".into(),
    ///     description: None,
    /// };
    /// let created = client.webhooks().create(&params).await?;
    /// println!("store this secret: {}", created.secret);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create(self, params: &CreateWebhookParams) -> Result<WebhookCreated> {
        let request = self
            .client
            .request(Method::POST, &["v1", "webhooks"])
            .json(params);
        self.client.send(request).await
    }

    /// Remove a webhook endpoint.
    pub async fn delete(self, id: &str) -> Result<Deleted> {
        let request = self.client.request(Method::DELETE, &["v1", "webhooks", id]);
        self.client.send(request).await
    }

    /// Enable or disable deliveries to a webhook endpoint.
    ///
    /// # Arguments
    /// * `id` - The webhook ID
    /// * `active` - Whether deliveries should be sent
    pub async fn toggle(self, id: &str, active: bool) -> Result<WebhookToggled> {
        let request = self
            .client
            .request(Method::PATCH, &["v1", "webhooks", id])
            .json(&json!({ "active": active }));
        self.client.send(request).await
    }

    /// List recent delivery attempts for a webhook endpoint.
    ///
    /// # Arguments
    /// * `id` - The webhook ID
    /// * `params` - Optional page size
    pub async fn deliveries(
        self,
        id: &str,
        params: &ListDeliveriesParams,
    ) -> Result<Vec<WebhookDelivery>> {
        let request = self
            .client
            .request(Method::GET, &["v1", "webhooks", id, "deliveries"])
            .query(params);
        self.client.send(request).await
    }
}
