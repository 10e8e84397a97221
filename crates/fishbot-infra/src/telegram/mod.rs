//! Telegram Bot API adapter.
//!
//! [`TelegramBot`] implements the
//! [`ChatTransport`](fishbot_core::transport::ChatTransport) port over
//! the Bot API; [`UpdatePoller`] drives `getUpdates` long polling and
//! normalizes inbound updates for the dispatcher.

pub mod client;
pub mod poller;
pub mod types;

pub use client::TelegramBot;
pub use poller::UpdatePoller;
