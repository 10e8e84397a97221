//! Chat transport trait.
//!
//! Defines the outbound interface to the chat platform: sending screens
//! and deleting superseded ones. Implementations live in fishbot-infra.

use fishbot_types::error::TransportError;
use fishbot_types::event::Keyboard;
use fishbot_types::ids::{ChatId, MessageId};

/// Trait for the outbound side of the chat platform.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait ChatTransport: Send + Sync {
    /// Send a text message with an inline keyboard. An empty keyboard
    /// sends a plain message.
    fn send_message(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: &Keyboard,
    ) -> impl std::future::Future<Output = Result<MessageId, TransportError>> + Send;

    /// Send a photo by URL with a caption and an inline keyboard.
    fn send_photo(
        &self,
        chat: ChatId,
        photo_url: &str,
        caption: &str,
        keyboard: &Keyboard,
    ) -> impl std::future::Future<Output = Result<MessageId, TransportError>> + Send;

    /// Delete a previously sent message.
    fn delete_message(
        &self,
        chat: ChatId,
        message: MessageId,
    ) -> impl std::future::Future<Output = Result<(), TransportError>> + Send;
}
