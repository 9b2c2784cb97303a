//! Print messages as they arrive in a mailbox until Ctrl-C.
//!
//! ```text
//! PLOP_API_KEY=plop_... RUST_LOG=plop_client=debug cargo run --example watch -- qa
//! ```

use futures::StreamExt;
use plop_client::{CancellationToken, Client, StreamParams};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), plop_client::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mailbox = std::env::args().nth(1);
    let client = Client::new()?;

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        on_ctrl_c.cancel();
    });

    let params = StreamParams {
        mailbox,
        ..Default::default()
    };
    let mut stream = client
        .messages()
        .stream_with_cancellation(&params, cancel)
        .await?;

    while let Some(message) = stream.next().await {
        let message = message?;
        println!(
            "[{}] {} -> {}: {}",
            message.received_at,
            message.from,
            message.mailbox_with_tag,
            message.subject.as_deref().unwrap_or("(no subject)")
        );
    }
    Ok(())
}
