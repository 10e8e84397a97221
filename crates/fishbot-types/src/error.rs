use thiserror::Error;

use crate::session::DialogueState;

/// Errors from the commerce backend client.
#[derive(Debug, Error)]
pub enum CommerceError {
    /// The bearer token was rejected. Fatal during the startup exchange;
    /// aborts the current turn afterwards.
    #[error("commerce authentication rejected")]
    Auth,

    #[error("not found: {0}")]
    NotFound(String),

    /// The backend answered with a non-success status outside the mapped
    /// cases.
    #[error("commerce backend error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// The request never produced an HTTP response.
    #[error("commerce request error: {0}")]
    Request(String),

    #[error("commerce response decode error: {0}")]
    Decode(String),
}

/// Errors from the session store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session store connection error: {0}")]
    Connection(String),

    #[error("session store query error: {0}")]
    Query(String),
}

/// Errors from the chat transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The chat platform rejected the call (`ok: false` envelope).
    #[error("chat api error {code}: {description}")]
    Api { code: i32, description: String },

    /// The request never produced an HTTP response.
    #[error("chat request error: {0}")]
    Request(String),

    #[error("chat response decode error: {0}")]
    Decode(String),
}

/// Errors from deciding a dialogue turn.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("commerce error: {0}")]
    Commerce(#[from] CommerceError),

    /// The (state, event) pair has no transition. The dispatcher treats
    /// this as protocol noise: no reply, no state change.
    #[error("unhandled event in state {state}: {event}")]
    UnhandledEvent { state: DialogueState, event: String },
}

/// Composite error for one dispatched update.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

impl TurnError {
    /// True when the turn failed only because the event had no transition.
    pub fn is_unhandled_event(&self) -> bool {
        matches!(
            self,
            TurnError::Engine(EngineError::UnhandledEvent { .. })
        )
    }
}

/// Errors from loading configuration at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}
