//! Shared domain types for fishbot.
//!
//! This crate contains the types used across the fishbot storefront:
//! dialogue sessions, catalog and cart values, normalized chat events,
//! engine actions, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod catalog;
pub mod config;
pub mod error;
pub mod event;
pub mod ids;
pub mod session;
