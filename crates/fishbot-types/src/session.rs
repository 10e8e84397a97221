//! Dialogue session types for fishbot.
//!
//! A `Session` is the per-chat record the bot persists between updates:
//! which dialogue state the chat is in, plus the product selection while
//! the user is on a product card.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::ids::{ChatId, ProductId};

/// Position of a chat within the storefront dialogue.
///
/// Persisted by label in the session store:
/// `START`, `MENU`, `PRODUCT`, `CART`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DialogueState {
    Start,
    Menu,
    Product,
    Cart,
}

impl fmt::Display for DialogueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialogueState::Start => write!(f, "START"),
            DialogueState::Menu => write!(f, "MENU"),
            DialogueState::Product => write!(f, "PRODUCT"),
            DialogueState::Cart => write!(f, "CART"),
        }
    }
}

impl FromStr for DialogueState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "START" => Ok(DialogueState::Start),
            "MENU" => Ok(DialogueState::Menu),
            "PRODUCT" => Ok(DialogueState::Product),
            "CART" => Ok(DialogueState::Cart),
            other => Err(format!("invalid dialogue state: '{other}'")),
        }
    }
}

impl Default for DialogueState {
    fn default() -> Self {
        DialogueState::Start
    }
}

/// Per-chat dialogue record, one per chat id.
///
/// The selection fields are written by the menu -> product transition and
/// are meaningful only while `state` is `Product`; every path out of the
/// product card goes back through the menu, which clears them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub chat_id: ChatId,
    pub state: DialogueState,
    pub selected_product_id: Option<ProductId>,
    pub selected_product_name: Option<String>,
}

impl Session {
    /// Fresh session for a chat that has no stored record yet.
    pub fn new(chat_id: ChatId) -> Self {
        Self {
            chat_id,
            state: DialogueState::Start,
            selected_product_id: None,
            selected_product_name: None,
        }
    }

    /// Successor session in `state` with the selection cleared.
    pub fn with_state(&self, state: DialogueState) -> Self {
        Self {
            chat_id: self.chat_id,
            state,
            selected_product_id: None,
            selected_product_name: None,
        }
    }

    /// Successor session on the product card for the given selection.
    pub fn with_selection(&self, id: ProductId, name: String) -> Self {
        Self {
            chat_id: self.chat_id,
            state: DialogueState::Product,
            selected_product_id: Some(id),
            selected_product_name: Some(name),
        }
    }
}
