//! Long-polling update source.
//!
//! `UpdatePoller` wraps `getUpdates` with offset tracking and normalizes
//! the wire updates into the transport-independent
//! [`Update`](fishbot_types::event::Update) the dispatcher consumes.
//! Poll failures are logged and retried after a short backoff; the
//! polling loop itself never dies on a transport hiccup.

use std::time::Duration;

use tracing::{debug, warn};

use fishbot_types::event::{Event, Update};
use fishbot_types::ids::{ChatId, MessageId};

use super::client::TelegramBot;
use super::types::UpdatePayload;

/// Wait between retries after a failed `getUpdates` call.
const POLL_RETRY_BACKOFF: Duration = Duration::from_secs(5);

/// Pulls updates from Telegram and hands them out in normalized form.
pub struct UpdatePoller {
    bot: TelegramBot,
    poll_timeout_secs: u64,
    offset: Option<i64>,
}

impl UpdatePoller {
    pub fn new(bot: TelegramBot, poll_timeout_secs: u64) -> Self {
        Self {
            bot,
            poll_timeout_secs,
            offset: None,
        }
    }

    /// Fetch the next batch of normalized updates.
    ///
    /// Blocks through the long-poll window; an empty vec after a quiet
    /// window is normal and the caller just polls again. A failed poll
    /// is retried here after a backoff instead of surfacing.
    pub async fn next_batch(&mut self) -> Vec<Update> {
        loop {
            match self.bot.get_updates(self.offset, self.poll_timeout_secs).await {
                Ok(payloads) => {
                    let mut updates = Vec::with_capacity(payloads.len());
                    for payload in payloads {
                        // Acknowledge every update, usable or not, so a
                        // malformed one is never redelivered forever.
                        self.offset = Some(payload.update_id + 1);
                        match normalize(payload) {
                            Some(update) => updates.push(update),
                            None => debug!("Dropping update with no usable payload"),
                        }
                    }
                    return updates;
                }
                Err(err) => {
                    warn!(error = %err, "getUpdates failed, retrying after backoff");
                    tokio::time::sleep(POLL_RETRY_BACKOFF).await;
                }
            }
        }
    }
}

/// Map one wire update to the normalized form, or `None` when it
/// carries nothing the dialogue can use (no text, no payload, or a
/// button press whose carrying message Telegram no longer reports).
fn normalize(payload: UpdatePayload) -> Option<Update> {
    if let Some(message) = payload.message {
        let text = message.text?;
        let event = if text == "/start" {
            Event::Start
        } else {
            Event::Text { text }
        };
        return Some(Update {
            chat_id: ChatId(message.chat.id),
            event,
            // The user's own message is never deleted by the bot.
            message_id: None,
        });
    }

    if let Some(query) = payload.callback_query {
        let data = query.data?;
        let message = query.message?;
        return Some(Update {
            chat_id: ChatId(message.chat.id),
            event: Event::Button { payload: data },
            message_id: Some(MessageId(message.message_id)),
        });
    }

    None
}
