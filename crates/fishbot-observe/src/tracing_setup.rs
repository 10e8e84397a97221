//! Tracing subscriber initialization.
//!
//! # Usage
//!
//! ```no_run
//! // Plain structured logging
//! fishbot_observe::tracing_setup::init_tracing(None).unwrap();
//!
//! // With the operator alert mirror
//! let (layer, receiver) = fishbot_observe::alert::OperatorAlertLayer::new();
//! fishbot_observe::tracing_setup::init_tracing(Some(layer)).unwrap();
//! // ... hand `receiver` to alert::spawn_operator_forwarder
//! ```

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

use crate::alert::OperatorAlertLayer;

/// Initialize the global tracing subscriber.
///
/// - Always installs a structured `fmt` layer with target visibility.
/// - Respects `RUST_LOG`; defaults to `info` when unset.
/// - When an [`OperatorAlertLayer`] is supplied, error events are
///   additionally mirrored onto its channel.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been set.
pub fn init_tracing(alert_layer: Option<OperatorAlertLayer>) -> Result<(), TryInitError> {
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(alert_layer)
        .try_init()
}
