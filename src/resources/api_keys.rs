use reqwest::Method;

use crate::models::ApiKeyRotation;
use crate::{Client, Result};

/// API key operations. Obtain with [`Client::api_keys`].
#[derive(Debug, Clone, Copy)]
pub struct ApiKeys<'a> {
    client: &'a Client,
}

impl<'a> ApiKeys<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Replace the calling API key with a new one.
    ///
    /// The old key stops working; the full new key is only returned here.
    ///
    /// # Returns
    /// The new key and its metadata
    pub async fn rotate(self) -> Result<ApiKeyRotation> {
        let request = self
            .client
            .request(Method::POST, &["v1", "api-keys", "rotate"]);
        self.client.send(request).await
    }
}
