//! Plop async client implementation.

use crate::models::{Envelope, ErrorBody};
use crate::resources::{ApiKeys, Mailboxes, Messages, Webhooks};
use crate::{Error, Result};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Async client for the Plop email inbox API.
///
/// Use [`Client::new`] to pick up the API key from `PLOP_API_KEY`, or
/// [`Client::builder`] for custom settings like the base URL, proxy, and
/// timeouts. Cloning is cheap and shares the connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    authorization: HeaderValue,
    user_agent: HeaderValue,
    proxy: Option<String>,
    timeout: Duration,
}

impl Client {
    /// Create a builder for configuring the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client with default settings.
    ///
    /// The API key is read from the `PLOP_API_KEY` environment variable.
    ///
    /// # Examples
    /// ```no_run
    /// # use plop_client::Client;
    /// # fn main() -> Result<(), plop_client::Error> {
    /// let client = Client::new()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new() -> Result<Self> {
        ClientBuilder::new().build()
    }

    /// Base URL every request path is appended to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Get the proxy URL if one was configured.
    ///
    /// Returns `None` when no proxy was set on the builder.
    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    /// Mailbox operations.
    pub fn mailboxes(&self) -> Mailboxes<'_> {
        Mailboxes::new(self)
    }

    /// Message operations, including the live stream and `wait_for`.
    pub fn messages(&self) -> Messages<'_> {
        Messages::new(self)
    }

    /// Webhook endpoint management and signature verification.
    pub fn webhooks(&self) -> Webhooks<'_> {
        Webhooks::new(self)
    }

    /// API key operations.
    pub fn api_keys(&self) -> ApiKeys<'_> {
        ApiKeys::new(self)
    }

    /// Start a JSON request to the endpoint made of `segments`.
    ///
    /// Each segment is percent-encoded on its own, so ids may contain `/`.
    pub(crate) fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.endpoint(segments);
        debug!(%method, %url, "sending request");
        self.http
            .request(method, url)
            .headers(self.headers())
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .timeout(self.timeout)
    }

    /// Send a request and unwrap the `{ "data": ... }` envelope.
    pub(crate) async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let body = response.bytes().await?;
        let envelope: Envelope<T> = serde_json::from_slice(&body)?;
        Ok(envelope.data)
    }

    /// Open a long-lived `text/event-stream` response.
    ///
    /// No request timeout applies. Cancelling `cancel` before the server
    /// answers aborts the request with [`Error::Cancelled`].
    pub(crate) async fn open_stream(
        &self,
        segments: &[&str],
        query: &impl Serialize,
        cancel: &CancellationToken,
    ) -> Result<Response> {
        let url = self.endpoint(segments);
        debug!(%url, "opening event stream");
        let request = self
            .http
            .get(url)
            .headers(self.headers())
            .header(ACCEPT, HeaderValue::from_static("text/event-stream"))
            .query(query);

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            response = request.send() => response?,
        };

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        if response.status() == StatusCode::NO_CONTENT {
            return Err(Error::MissingStreamBody);
        }
        Ok(response)
    }

    /// Turn a non-2xx response into [`Error::Api`].
    async fn api_error(response: Response) -> Error {
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .ok()
            .and_then(|bytes| serde_json::from_slice::<ErrorBody>(&bytes).ok());

        let (message, details) = match body {
            Some(ErrorBody { error, details }) => (error, details),
            None => (None, None),
        };
        let message = message.unwrap_or_else(|| format!("Request failed with status {status}"));

        if status == StatusCode::NOT_FOUND.as_u16() {
            debug!(status, %message, "resource not found");
        } else {
            warn!(status, %message, "API request failed");
        }
        Error::Api {
            status,
            message,
            details,
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // The builder rejects cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Build headers for API requests.
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, self.authorization.clone());
        headers.insert(USER_AGENT, self.user_agent.clone());
        headers
    }
}

const DEFAULT_BASE_URL: &str = "https://api.plop.email";
const API_KEY_ENV: &str = "PLOP_API_KEY";
const USER_AGENT_VALUE: &str = concat!("plop-client-rust/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builder for configuring a Plop client.
///
/// Start with [`Client::builder`] to override defaults.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    api_key: Option<String>,
    base_url: String,
    proxy: Option<String>,
    user_agent: String,
    timeout: Duration,
    connect_timeout: Duration,
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    ///
    /// Defaults:
    /// - API key from `PLOP_API_KEY`
    /// - Base URL `https://api.plop.email`
    /// - No proxy
    /// - 30 second request timeout, 10 second connect timeout
    pub fn new() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            proxy: None,
            user_agent: USER_AGENT_VALUE.to_string(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Set the API key. Takes precedence over `PLOP_API_KEY`.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Override the API base URL. Trailing slashes are ignored.
    ///
    /// Useful for testing or self-hosted deployments.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set a proxy URL (e.g., "http://127.0.0.1:8080").
    ///
    /// This uses reqwest's proxy support for all requests.
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Override the default user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Timeout for each ordinary request. Does not apply to the live stream.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Timeout for establishing a connection.
    pub fn connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Build the client.
    ///
    /// Fails with [`Error::MissingApiKey`] when no key was set and
    /// `PLOP_API_KEY` is empty or unset.
    ///
    /// # Examples
    /// ```no_run
    /// # use plop_client::Client;
    /// # fn main() -> Result<(), plop_client::Error> {
    /// let client = Client::builder()
    ///     .api_key("plop_...")
    ///     .user_agent("my-app/1.0")
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn build(self) -> Result<Client> {
        let api_key = resolve_api_key(self.api_key, std::env::var(API_KEY_ENV).ok())?;
        let base_url = parse_base_url(&self.base_url)?;

        let mut authorization = HeaderValue::from_str(&format!("Bearer {api_key}"))?;
        authorization.set_sensitive(true);
        let user_agent = HeaderValue::from_str(&self.user_agent)?;

        let mut builder = reqwest::Client::builder().connect_timeout(self.connect_timeout);
        if let Some(proxy_url) = &self.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }
        let http = builder.build()?;

        Ok(Client {
            http,
            base_url,
            authorization,
            user_agent,
            proxy: self.proxy,
            timeout: self.timeout,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// An explicit key wins over the environment, even when it is empty.
fn resolve_api_key(explicit: Option<String>, from_env: Option<String>) -> Result<String> {
    explicit
        .or(from_env)
        .filter(|key| !key.is_empty())
        .ok_or(Error::MissingApiKey)
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|e| Error::InvalidBaseUrl(format!("{raw}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(Error::InvalidBaseUrl(format!("{raw}: cannot carry a path")));
    }
    Ok(url)
}
