//! TelegramBot -- concrete [`ChatTransport`] implementation for the
//! Telegram Bot API.
//!
//! Every method is a POST to `{base}/bot{token}/{method}` with a JSON
//! body; failures come back inside the `{ok, ...}` envelope rather than
//! as bare HTTP statuses.
//!
//! The bot token is wrapped in [`secrecy::SecretString`], exposed only
//! while building the request URL, and never logged or included in
//! `Debug` output.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;

use fishbot_core::transport::ChatTransport;
use fishbot_types::error::TransportError;
use fishbot_types::event::Keyboard;
use fishbot_types::ids::{ChatId, MessageId};

use super::types::{
    ApiEnvelope, DeleteMessageRequest, GetUpdatesRequest, InlineKeyboardButton,
    InlineKeyboardMarkup, MessagePayload, SendMessageRequest, SendPhotoRequest, UpdatePayload,
};

/// Telegram Bot API client.
///
/// Implements [`ChatTransport`] for outbound messages and additionally
/// exposes [`get_updates`](TelegramBot::get_updates) for the poller.
/// Cloning is cheap: the underlying HTTP client is a shared handle, so
/// the dispatcher, the poller, and the alert forwarder can each hold
/// their own copy.
#[derive(Clone)]
pub struct TelegramBot {
    client: reqwest::Client,
    token: SecretString,
    base_url: String,
}

// TelegramBot intentionally does NOT derive Debug so the bot token
// cannot leak through formatting.

impl TelegramBot {
    /// Create a new bot client.
    ///
    /// The HTTP timeout must sit above the long-poll window, or quiet
    /// `getUpdates` calls would be cut off mid-wait.
    pub fn new(token: SecretString, base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(90))
            .build()
            .expect("failed to create reqwest client");
        Self {
            client,
            token,
            base_url,
        }
    }

    /// Build the full API URL for a method. The token is part of the
    /// path, which is why it must never appear in error messages.
    fn url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.base_url,
            self.token.expose_secret(),
            method
        )
    }

    /// One Bot API round trip: POST the body, unwrap the envelope.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &impl Serialize,
    ) -> Result<T, TransportError> {
        let response = self
            .client
            .post(self.url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Request(format!("{method}: {e}")))?;

        // Telegram reports failures inside the envelope with a matching
        // non-2xx status, so the envelope is the single source of truth.
        let envelope: ApiEnvelope<T> = response
            .json()
            .await
            .map_err(|e| TransportError::Decode(format!("{method}: {e}")))?;
        unwrap_envelope(envelope)
    }

    /// Long-poll for the next batch of updates.
    ///
    /// Blocks for up to `timeout_secs` on the Telegram side; an empty
    /// vec just means nothing happened during the window.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<UpdatePayload>, TransportError> {
        let body = GetUpdatesRequest {
            offset,
            timeout: timeout_secs,
            allowed_updates: &["message", "callback_query"],
        };
        self.call("getUpdates", &body).await
    }
}

impl ChatTransport for TelegramBot {
    async fn send_message(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: &Keyboard,
    ) -> Result<MessageId, TransportError> {
        let body = SendMessageRequest {
            chat_id: chat.0,
            text: text.to_string(),
            reply_markup: markup(keyboard),
        };
        let sent: MessagePayload = self.call("sendMessage", &body).await?;
        Ok(MessageId(sent.message_id))
    }

    async fn send_photo(
        &self,
        chat: ChatId,
        photo_url: &str,
        caption: &str,
        keyboard: &Keyboard,
    ) -> Result<MessageId, TransportError> {
        let body = SendPhotoRequest {
            chat_id: chat.0,
            photo: photo_url.to_string(),
            caption: caption.to_string(),
            reply_markup: markup(keyboard),
        };
        let sent: MessagePayload = self.call("sendPhoto", &body).await?;
        Ok(MessageId(sent.message_id))
    }

    async fn delete_message(
        &self,
        chat: ChatId,
        message: MessageId,
    ) -> Result<(), TransportError> {
        let body = DeleteMessageRequest {
            chat_id: chat.0,
            message_id: message.0,
        };
        let _deleted: bool = self.call("deleteMessage", &body).await?;
        Ok(())
    }
}

/// Unwrap the `{ok, ...}` envelope into a result or a typed API error.
fn unwrap_envelope<T>(envelope: ApiEnvelope<T>) -> Result<T, TransportError> {
    if !envelope.ok {
        return Err(TransportError::Api {
            code: envelope.error_code.unwrap_or(0),
            description: envelope
                .description
                .unwrap_or_else(|| "no description".to_string()),
        });
    }
    envelope
        .result
        .ok_or_else(|| TransportError::Decode("ok envelope without result".to_string()))
}

/// Convert the engine's keyboard to the wire form; an empty keyboard
/// sends a plain message with no markup at all.
fn markup(keyboard: &Keyboard) -> Option<InlineKeyboardMarkup> {
    if keyboard.rows.is_empty() {
        return None;
    }
    Some(InlineKeyboardMarkup {
        inline_keyboard: keyboard
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|button| InlineKeyboardButton {
                        text: button.label.clone(),
                        callback_data: button.payload.clone(),
                    })
                    .collect()
            })
            .collect(),
    })
}
