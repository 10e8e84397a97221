//! Dialogue logic and port trait definitions for fishbot.
//!
//! This crate defines the "ports" (commerce, session store, chat
//! transport) that the infrastructure layer implements, plus the
//! dialogue engine and dispatcher that drive a turn. It depends only on
//! `fishbot-types` -- never on `fishbot-infra` or any IO crate.

pub mod commerce;
pub mod dispatch;
pub mod engine;
pub mod store;
pub mod transport;
