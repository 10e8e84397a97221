//! Telegram Bot API wire types.
//!
//! These mirror only the fields fishbot reads from or writes to the Bot
//! API; everything else in the payloads is ignored on deserialization.
//! They are NOT the domain types from fishbot-types -- the client and
//! poller map them.

use serde::{Deserialize, Serialize};

/// Response envelope every Bot API method returns.
///
/// `ok: true` carries `result`; `ok: false` carries `error_code` and
/// `description`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub error_code: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
}

/// The slice of a sent message the client reads back: its id.
#[derive(Debug, Clone, Deserialize)]
pub struct MessagePayload {
    pub message_id: i64,
    pub chat: ChatPayload,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatPayload {
    pub id: i64,
}

/// One inbound update from `getUpdates`. Exactly one of the payload
/// fields is set for the update kinds fishbot subscribes to.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePayload {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<MessagePayload>,
    #[serde(default)]
    pub callback_query: Option<CallbackQueryPayload>,
}

/// An inline button press. `message` is the message that carried the
/// keyboard; Telegram omits it when that message is too old.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQueryPayload {
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub message: Option<MessagePayload>,
}

/// Body for `sendMessage`.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest {
    pub chat_id: i64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

/// Body for `sendPhoto`; `photo` is a URL the platform fetches itself.
#[derive(Debug, Clone, Serialize)]
pub struct SendPhotoRequest {
    pub chat_id: i64,
    pub photo: String,
    pub caption: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

/// Body for `deleteMessage`.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteMessageRequest {
    pub chat_id: i64,
    pub message_id: i64,
}

/// Body for `getUpdates` long polling.
#[derive(Debug, Clone, Serialize)]
pub struct GetUpdatesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    pub timeout: u64,
    pub allowed_updates: &'static [&'static str],
}

/// Wire form of an inline keyboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}
