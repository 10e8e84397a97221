//! Session store trait.
//!
//! Defines the interface for per-chat dialogue persistence.
//! Implementations live in fishbot-infra.

use fishbot_types::error::StoreError;
use fishbot_types::ids::ChatId;
use fishbot_types::session::Session;

/// Trait for the per-chat session store.
///
/// One record per chat id, last write wins. A chat with no record is a
/// fresh `Session::new` -- absence is never an error.
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait SessionStore: Send + Sync {
    /// Load the chat's session, or the default session when no record
    /// exists. Fails only on store errors.
    fn load(
        &self,
        chat: ChatId,
    ) -> impl std::future::Future<Output = Result<Session, StoreError>> + Send;

    /// Persist the full session record (upsert).
    fn save(
        &self,
        session: &Session,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}
