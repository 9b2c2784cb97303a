use chrono::{SecondsFormat, Utc};
use reqwest::Method;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::models::{Deleted, ListMessagesParams, MessageDetail, MessageList, StreamParams};
use crate::stream::MessageStream;
use crate::wait::{WaitForOptions, poll_until};
use crate::{Client, Result};

/// Message operations. Obtain with [`Client::messages`].
#[derive(Debug, Clone, Copy)]
pub struct Messages<'a> {
    client: &'a Client,
}

impl<'a> Messages<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// List message summaries matching `params`, one page at a time.
    ///
    /// # Arguments
    /// * `params` - Mailbox, tag, time and paging filters
    ///
    /// # Returns
    /// One page of summaries and whether more pages follow
    ///
    /// # Examples
    /// ```no_run
    /// # use plop_client::{Client, ListMessagesParams};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), plop_client::Error> {
    /// let client = Client::new()?;
    /// let page = client
    ///     .messages()
    ///     .list(&ListMessagesParams::default().mailbox("qa"))
    ///     .await?;
    /// for message in &page.data {
    ///     println!("{} {:?}", message.id, message.subject);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn list(self, params: &ListMessagesParams) -> Result<MessageList> {
        let request = self
            .client
            .request(Method::GET, &["v1", "messages"])
            .query(params);
        self.client.send(request).await
    }

    /// Fetch a single message with headers and content.
    ///
    /// # Arguments
    /// * `id` - The message ID
    pub async fn get(self, id: &str) -> Result<MessageDetail> {
        let request = self.client.request(Method::GET, &["v1", "messages", id]);
        self.client.send(request).await
    }

    /// Fetch the most recent message matching `params`.
    ///
    /// Returns an [`Error::Api`](crate::Error::Api) with status 404 when
    /// nothing matches.
    ///
    /// # Arguments
    /// * `params` - Filters selecting which messages count
    pub async fn latest(self, params: &ListMessagesParams) -> Result<MessageDetail> {
        let request = self
            .client
            .request(Method::GET, &["v1", "messages", "latest"])
            .query(params);
        self.client.send(request).await
    }

    /// Delete a message.
    ///
    /// # Returns
    /// The ID of the deleted message
    pub async fn delete(self, id: &str) -> Result<Deleted> {
        let request = self.client.request(Method::DELETE, &["v1", "messages", id]);
        self.client.send(request).await
    }

    /// Wait for a message matching `params` to arrive.
    ///
    /// Only messages received after this call started count: `since` is set
    /// to the current time once and sent on every attempt, replacing any
    /// `since` in `params`. Polls [`latest`](Self::latest) every
    /// `options.interval` and fails with [`Error::Timeout`](crate::Error::Timeout)
    /// after `options.timeout`. Errors other than "not found" are returned
    /// immediately.
    ///
    /// # Arguments
    /// * `params` - Filters selecting the message to wait for
    /// * `options` - Overall timeout and pause between attempts
    ///
    /// # Examples
    /// ```no_run
    /// # use plop_client::{Client, ListMessagesParams, WaitForOptions};
    /// # use std::time::Duration;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), plop_client::Error> {
    /// let client = Client::new()?;
    /// // ... trigger a sign-up that sends mail to qa+verify@...
    /// let message = client
    ///     .messages()
    ///     .wait_for(
    ///         &ListMessagesParams::default().mailbox("qa").tag("verify"),
    ///         WaitForOptions::default().timeout(Duration::from_secs(60)),
    ///     )
    ///     .await?;
    /// println!("{:?}", message.text_content);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn wait_for(
        self,
        params: &ListMessagesParams,
        options: WaitForOptions,
    ) -> Result<MessageDetail> {
        let since = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        debug!(%since, ?options, "waiting for message");
        let query = ListMessagesParams {
            since: Some(since),
            ..params.clone()
        };

        let query = &query;
        poll_until(options, move || self.latest(query)).await
    }

    /// Open the live stream of newly received messages.
    ///
    /// The stream runs until the server closes it, an error occurs, or it is
    /// dropped. Reconnecting after a dropped connection is up to the caller.
    ///
    /// # Arguments
    /// * `params` - Optional mailbox, tag and `since` filters
    pub async fn stream(self, params: &StreamParams) -> Result<MessageStream> {
        self.stream_with_cancellation(params, CancellationToken::new())
            .await
    }

    /// Like [`stream`](Self::stream), stopping when `cancel` fires.
    pub async fn stream_with_cancellation(
        self,
        params: &StreamParams,
        cancel: CancellationToken,
    ) -> Result<MessageStream> {
        let response = self
            .client
            .open_stream(&["v1", "messages", "stream"], params, &cancel)
            .await?;
        Ok(MessageStream::from_byte_stream(
            response.bytes_stream(),
            cancel,
        ))
    }
}
