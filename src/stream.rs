//! Live message stream.
//!
//! A background task owns the HTTP body, runs it through the
//! [`FrameDecoder`](crate::sse::FrameDecoder) and forwards every
//! `message.received` payload into a bounded channel. [`MessageStream`] is the
//! receiving half. Dropping it, or cancelling its token, stops the task and
//! releases the connection.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::models::MessageSummary;
use crate::sse::{Frame, FrameDecoder};
use crate::{Error, Result};

/// Event name of frames that carry a new message.
pub const MESSAGE_RECEIVED: &str = "message.received";

const CHANNEL_CAPACITY: usize = 32;

/// Stream of messages pushed by the server as they arrive.
///
/// Yields `Ok(message)` per received message. A transport or decoding failure
/// is yielded once as `Err` and then the stream ends. Once the cancellation
/// token fires nothing more is yielded, even messages already buffered.
///
/// # Examples
/// ```no_run
/// # use plop_client::{Client, StreamParams};
/// use futures::StreamExt;
/// # #[tokio::main]
/// # async fn main() -> Result<(), plop_client::Error> {
/// let client = Client::new()?;
/// let params = StreamParams { mailbox: Some("qa".into()), ..Default::default() };
/// let mut stream = client.messages().stream(&params).await?;
/// while let Some(message) = stream.next().await {
///     let message = message?;
///     println!("{}: {:?}", message.from, message.subject);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MessageStream {
    rx: mpsc::Receiver<Result<MessageSummary>>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl MessageStream {
    /// Start consuming `body` on a background task.
    ///
    /// `cancel` is the caller's token; the stream stops when it, or any of
    /// its parents, is cancelled. Must be called within a Tokio runtime.
    pub fn from_byte_stream<S, B, E>(body: S, cancel: CancellationToken) -> Self
    where
        S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
        B: AsRef<[u8]> + Send + 'static,
        E: Into<Error> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let cancel = cancel.child_token();
        let task = tokio::spawn(pump(body, tx, cancel.clone()));
        Self { rx, cancel, task }
    }

    /// Stop the stream. Pending and future items are discarded.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token that cancels this stream when triggered.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl Stream for MessageStream {
    type Item = Result<MessageSummary>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.cancel.is_cancelled() {
            return Poll::Ready(None);
        }
        self.rx.poll_recv(cx)
    }
}

impl Drop for MessageStream {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

async fn pump<S, B, E>(
    body: S,
    tx: mpsc::Sender<Result<MessageSummary>>,
    cancel: CancellationToken,
) where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<Error>,
{
    let mut body = std::pin::pin!(body);
    let mut decoder = FrameDecoder::new();

    loop {
        let chunk = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("message stream cancelled");
                return;
            }
            _ = tx.closed() => return,
            chunk = body.next() => chunk,
        };

        let chunk = match chunk {
            Some(Ok(chunk)) => chunk,
            Some(Err(e)) => {
                let err: Error = e.into();
                warn!(error = %err, "message stream read failed");
                deliver(&tx, &cancel, Err(err)).await;
                return;
            }
            None => {
                if let Err(err) = decoder.finish() {
                    warn!(error = %err, "message stream truncated");
                    deliver(&tx, &cancel, Err(err)).await;
                } else {
                    debug!("message stream closed by server");
                }
                return;
            }
        };

        let frames = match decoder.push(chunk.as_ref()) {
            Ok(frames) => frames,
            Err(err) => {
                warn!(error = %err, "message stream decode failed");
                deliver(&tx, &cancel, Err(err)).await;
                return;
            }
        };

        for frame in frames {
            match decode_message(frame) {
                Ok(Some(message)) => {
                    if !deliver(&tx, &cancel, Ok(message)).await {
                        return;
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(error = %err, "message stream decode failed");
                    deliver(&tx, &cancel, Err(err)).await;
                    return;
                }
            }
        }
    }
}

/// Turn a frame into a message if it is a `message.received` event.
fn decode_message(frame: Frame) -> Result<Option<MessageSummary>> {
    if frame.event.as_deref() != Some(MESSAGE_RECEIVED) {
        trace!(event = ?frame.event, "skipping frame");
        return Ok(None);
    }
    match frame.data.as_deref() {
        Some(data) if !data.is_empty() => Ok(Some(serde_json::from_str(data)?)),
        _ => Ok(None),
    }
}

/// Returns `false` when the consumer is gone or the stream was cancelled.
async fn deliver(
    tx: &mpsc::Sender<Result<MessageSummary>>,
    cancel: &CancellationToken,
    item: Result<MessageSummary>,
) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        sent = tx.send(item) => sent.is_ok(),
    }
}
