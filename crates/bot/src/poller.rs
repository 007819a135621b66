//! Long-polling loop.
//!
//! Fetches updates, hands each text message to its own task and sends any
//! reply. Handlers run concurrently with no per-chat ordering.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::handlers::{IncomingMessage, handle_message};
use crate::state::AppState;
use crate::telegram::TelegramClient;

/// Pause after a failed poll before trying again.
const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Poll for updates until `shutdown` completes, then wait for in-flight handlers.
pub async fn run<F>(state: AppState, client: TelegramClient, poll_timeout: Duration, shutdown: F)
where
    F: Future<Output = ()>,
{
    let mut offset: i64 = 0;
    let mut in_flight = JoinSet::new();
    tokio::pin!(shutdown);

    info!("Polling for updates");

    loop {
        let updates = tokio::select! {
            biased;
            () = &mut shutdown => break,
            result = client.get_updates(offset, poll_timeout) => result,
        };

        match updates {
            Ok(updates) => {
                for update in updates {
                    offset = offset.max(update.update_id + 1);
                    let Some(message) = update.into_incoming() else {
                        continue;
                    };
                    in_flight.spawn(process(state.clone(), client.clone(), message));
                }
            }
            Err(e) => {
                warn!("Telegram poll error: {e}");
                tokio::select! {
                    biased;
                    () = &mut shutdown => break,
                    () = tokio::time::sleep(POLL_ERROR_BACKOFF) => {}
                }
            }
        }

        while let Some(finished) = in_flight.try_join_next() {
            log_join_error(finished);
        }
    }

    info!(in_flight = in_flight.len(), "Polling stopped, draining handlers");
    while let Some(finished) = in_flight.join_next().await {
        log_join_error(finished);
    }
}

async fn process(state: AppState, client: TelegramClient, message: IncomingMessage) {
    let Some(reply) = handle_message(&state, &message).await else {
        return;
    };

    if let Err(e) = client
        .send_message(reply.chat_id, &reply.text, reply.keyboard.as_ref())
        .await
    {
        warn!(chat_id = reply.chat_id, "Failed to send reply: {e}");
    } else {
        debug!(chat_id = reply.chat_id, "Reply sent");
    }
}

fn log_join_error(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        warn!("Message handler task failed: {e}");
    }
}
