//! Moltin commerce backend adapter.
//!
//! This module provides the [`MoltinClient`] which implements the
//! [`CommerceApi`](fishbot_core::commerce::CommerceApi) trait over the
//! Moltin REST API, including the one-time client-credentials token
//! exchange at startup.

pub mod client;
pub mod types;

pub use client::MoltinClient;
