//! Observability for fishbot.
//!
//! Tracing subscriber initialization plus the operator alert mirror:
//! error-level log entries are captured by a layer and forwarded to the
//! operator's chat through the regular chat transport.

pub mod alert;
pub mod tracing_setup;
