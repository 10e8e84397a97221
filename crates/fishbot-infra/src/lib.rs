//! Infrastructure layer for fishbot.
//!
//! Contains implementations of the port traits defined in `fishbot-core`:
//! the Moltin commerce client, the Telegram transport and update poller,
//! SQLite session persistence, and configuration loading.

pub mod config;
pub mod moltin;
pub mod sqlite;
pub mod telegram;
