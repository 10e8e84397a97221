//! Normalized chat events and engine actions for fishbot.
//!
//! `Update` is the transport-independent unit the dispatcher consumes:
//! one user interaction, already classified into an `Event`. `ChatAction`
//! is the engine's output: a description of what to send back, executed
//! by the transport adapter after the transition is decided.

use serde::{Deserialize, Serialize};

use crate::ids::{ChatId, MessageId};

/// One user interaction, classified by the transport adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// The `/start` command; resets the dialogue regardless of stored state.
    Start,
    /// An inline button press carrying its opaque payload.
    Button { payload: String },
    /// Free-form text the dialogue has no handler for.
    Text { text: String },
}

impl Event {
    pub fn button(payload: impl Into<String>) -> Self {
        Event::Button {
            payload: payload.into(),
        }
    }

    /// Short label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Start => "start",
            Event::Button { .. } => "button",
            Event::Text { .. } => "text",
        }
    }
}

/// A normalized inbound update.
///
/// `message_id` is present for button presses: the id of the message
/// carrying the pressed keyboard, so the turn can delete it before
/// rendering the next screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub chat_id: ChatId,
    pub event: Event,
    pub message_id: Option<MessageId>,
}

/// One inline keyboard button.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineButton {
    pub label: String,
    /// Opaque payload echoed back in the button-press event.
    pub payload: String,
}

impl InlineButton {
    pub fn new(label: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            payload: payload.into(),
        }
    }
}

/// An inline keyboard: rows of buttons attached to an outgoing message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Keyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

impl Keyboard {
    pub fn new(rows: Vec<Vec<InlineButton>>) -> Self {
        Self { rows }
    }

    /// Flat iterator over every button, row by row.
    pub fn buttons(&self) -> impl Iterator<Item = &InlineButton> {
        self.rows.iter().flatten()
    }
}

/// A side effect the engine asks the transport to perform.
///
/// Actions are executed in order; the engine emits them as data and never
/// talks to the transport itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatAction {
    SendText {
        text: String,
        keyboard: Keyboard,
    },
    SendPhoto {
        photo_url: String,
        caption: String,
        keyboard: Keyboard,
    },
    DeleteMessage {
        message_id: MessageId,
    },
}
