//! Event dispatcher: one update in, one decided-and-executed turn out.
//!
//! The dispatcher owns the read-decide-execute-write cycle: load the
//! session (skipped for `/start`), let the engine decide, run the chat
//! actions, then persist the successor session. Any failure aborts the
//! turn before the persist step, so the stored state never moves on a
//! failed turn and the user's next action retries from where they were.

use fishbot_types::error::{TransportError, TurnError};
use fishbot_types::event::{ChatAction, Event, Update};
use fishbot_types::ids::ChatId;
use fishbot_types::session::Session;
use tracing::{debug, error, warn};

use crate::commerce::CommerceApi;
use crate::engine::DialogueEngine;
use crate::store::SessionStore;
use crate::transport::ChatTransport;

/// Wires the dialogue engine to a session store and a chat transport.
///
/// Generic over its three ports so core never depends on fishbot-infra;
/// the binary picks the concrete adapters at startup.
pub struct Dispatcher<C: CommerceApi, S: SessionStore, T: ChatTransport> {
    engine: DialogueEngine<C>,
    store: S,
    transport: T,
}

impl<C: CommerceApi, S: SessionStore, T: ChatTransport> Dispatcher<C, S, T> {
    pub fn new(engine: DialogueEngine<C>, store: S, transport: T) -> Self {
        Self {
            engine,
            store,
            transport,
        }
    }

    /// Process one update end to end.
    ///
    /// Partial transport execution is not rolled back; the next event
    /// from the same chat re-enters the prior state and retries the
    /// render.
    pub async fn dispatch(&self, update: &Update) -> Result<(), TurnError> {
        let session = match update.event {
            // `/start` resets unconditionally and must work even when the
            // stored record is unreadable, so it skips the load.
            Event::Start => Session::new(update.chat_id),
            _ => self.store.load(update.chat_id).await?,
        };

        let turn = self.engine.decide(&session, update).await?;
        for action in &turn.actions {
            self.execute(update.chat_id, action).await?;
        }
        self.store.save(&turn.next).await?;
        Ok(())
    }

    /// Log-and-continue wrapper for the polling loop; never propagates.
    ///
    /// Events with no transition are protocol noise and land at `warn`;
    /// everything else is operator-worthy and lands at `error`.
    pub async fn handle_update(&self, update: &Update) {
        match self.dispatch(update).await {
            Ok(()) => {
                debug!(chat_id = %update.chat_id, event = update.event.kind(), "Turn complete");
            }
            Err(err) if err.is_unhandled_event() => {
                warn!(chat_id = %update.chat_id, error = %err, "Ignoring event with no transition");
            }
            Err(err) => {
                error!(chat_id = %update.chat_id, event = update.event.kind(), error = %err, "Turn failed; session state unchanged");
            }
        }
    }

    async fn execute(&self, chat: ChatId, action: &ChatAction) -> Result<(), TransportError> {
        match action {
            ChatAction::SendText { text, keyboard } => {
                self.transport.send_message(chat, text, keyboard).await?;
            }
            ChatAction::SendPhoto {
                photo_url,
                caption,
                keyboard,
            } => {
                self.transport
                    .send_photo(chat, photo_url, caption, keyboard)
                    .await?;
            }
            ChatAction::DeleteMessage { message_id } => {
                self.transport.delete_message(chat, *message_id).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fishbot_types::catalog::{CartLine, Product, ProductSummary};
    use fishbot_types::error::{CommerceError, EngineError, StoreError};
    use fishbot_types::event::Keyboard;
    use fishbot_types::ids::{MessageId, ProductId};
    use fishbot_types::session::DialogueState;

    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FakeCommerce {
        fail_add: bool,
    }

    impl CommerceApi for FakeCommerce {
        async fn list_products(&self) -> Result<Vec<ProductSummary>, CommerceError> {
            Ok(vec![
                ProductSummary {
                    id: ProductId::from("fish-1"),
                    name: "Salmon".to_string(),
                },
                ProductSummary {
                    id: ProductId::from("fish-2"),
                    name: "Trout".to_string(),
                },
            ])
        }

        async fn product_detail(&self, id: &ProductId) -> Result<Product, CommerceError> {
            Ok(Product {
                id: id.clone(),
                name: "Salmon".to_string(),
                price_display: "$12.50".to_string(),
                description: "Atlantic, chilled".to_string(),
                weight_kg: 120.0,
                image_url: "https://cdn.example.com/salmon.jpg".to_string(),
            })
        }

        async fn add_to_cart(
            &self,
            _chat: ChatId,
            _id: &ProductId,
            _quantity: u32,
        ) -> Result<(), CommerceError> {
            if self.fail_add {
                return Err(CommerceError::Upstream {
                    status: 502,
                    message: "bad gateway".to_string(),
                });
            }
            Ok(())
        }

        async fn cart_items(&self, _chat: ChatId) -> Result<Vec<CartLine>, CommerceError> {
            Ok(Vec::new())
        }

        async fn cart_total(&self, _chat: ChatId) -> Result<String, CommerceError> {
            Ok("$0.00".to_string())
        }

        async fn remove_from_cart(
            &self,
            _chat: ChatId,
            _id: &ProductId,
        ) -> Result<(), CommerceError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        sessions: Mutex<HashMap<i64, Session>>,
        fail_load: Mutex<bool>,
    }

    impl MemoryStore {
        fn stored_state(&self, chat: i64) -> Option<DialogueState> {
            self.sessions
                .lock()
                .unwrap()
                .get(&chat)
                .map(|session| session.state)
        }

        fn insert(&self, session: Session) {
            self.sessions
                .lock()
                .unwrap()
                .insert(session.chat_id.0, session);
        }
    }

    impl SessionStore for &MemoryStore {
        async fn load(&self, chat: ChatId) -> Result<Session, StoreError> {
            if *self.fail_load.lock().unwrap() {
                return Err(StoreError::Connection("store down".to_string()));
            }
            Ok(self
                .sessions
                .lock()
                .unwrap()
                .get(&chat.0)
                .cloned()
                .unwrap_or_else(|| Session::new(chat)))
        }

        async fn save(&self, session: &Session) -> Result<(), StoreError> {
            self.sessions
                .lock()
                .unwrap()
                .insert(session.chat_id.0, session.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeTransport {
        sent: Mutex<Vec<String>>,
        fail_sends: bool,
    }

    impl FakeTransport {
        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl ChatTransport for &FakeTransport {
        async fn send_message(
            &self,
            chat: ChatId,
            text: &str,
            _keyboard: &Keyboard,
        ) -> Result<MessageId, TransportError> {
            if self.fail_sends {
                return Err(TransportError::Api {
                    code: 400,
                    description: "chat not found".to_string(),
                });
            }
            self.sent
                .lock()
                .unwrap()
                .push(format!("text {chat}: {}", text.lines().next().unwrap_or("")));
            Ok(MessageId(1))
        }

        async fn send_photo(
            &self,
            chat: ChatId,
            _photo_url: &str,
            caption: &str,
            _keyboard: &Keyboard,
        ) -> Result<MessageId, TransportError> {
            if self.fail_sends {
                return Err(TransportError::Api {
                    code: 400,
                    description: "chat not found".to_string(),
                });
            }
            self.sent.lock().unwrap().push(format!(
                "photo {chat}: {}",
                caption.lines().next().unwrap_or("")
            ));
            Ok(MessageId(2))
        }

        async fn delete_message(
            &self,
            chat: ChatId,
            message: MessageId,
        ) -> Result<(), TransportError> {
            self.sent
                .lock()
                .unwrap()
                .push(format!("delete {chat}: {message}"));
            Ok(())
        }
    }

    fn dispatcher<'a>(
        commerce: FakeCommerce,
        store: &'a MemoryStore,
        transport: &'a FakeTransport,
    ) -> Dispatcher<FakeCommerce, &'a MemoryStore, &'a FakeTransport> {
        Dispatcher::new(DialogueEngine::new(commerce), store, transport)
    }

    fn start_update(chat: i64) -> Update {
        Update {
            chat_id: ChatId(chat),
            event: Event::Start,
            message_id: None,
        }
    }

    fn button_update(chat: i64, payload: &str) -> Update {
        Update {
            chat_id: ChatId(chat),
            event: Event::button(payload),
            message_id: Some(MessageId(10)),
        }
    }

    #[tokio::test]
    async fn test_start_creates_session_and_renders_menu() {
        let store = MemoryStore::default();
        let transport = FakeTransport::default();
        let dispatcher = dispatcher(FakeCommerce { fail_add: false }, &store, &transport);

        dispatcher.dispatch(&start_update(7)).await.unwrap();

        assert_eq!(store.stored_state(7), Some(DialogueState::Menu));
        assert_eq!(transport.sent(), vec!["text 7: Choose your fish"]);
    }

    #[tokio::test]
    async fn test_start_skips_loading_the_store() {
        let store = MemoryStore::default();
        *store.fail_load.lock().unwrap() = true;
        let transport = FakeTransport::default();
        let dispatcher = dispatcher(FakeCommerce { fail_add: false }, &store, &transport);

        // The load would fail; /start must not attempt it.
        dispatcher.dispatch(&start_update(7)).await.unwrap();
        assert_eq!(store.stored_state(7), Some(DialogueState::Menu));
    }

    #[tokio::test]
    async fn test_full_purchase_path_updates_state_each_turn() {
        let store = MemoryStore::default();
        let transport = FakeTransport::default();
        let dispatcher = dispatcher(FakeCommerce { fail_add: false }, &store, &transport);

        dispatcher.dispatch(&start_update(7)).await.unwrap();
        dispatcher.dispatch(&button_update(7, "fish-1")).await.unwrap();
        assert_eq!(store.stored_state(7), Some(DialogueState::Product));

        dispatcher.dispatch(&button_update(7, "5")).await.unwrap();
        assert_eq!(store.stored_state(7), Some(DialogueState::Product));

        dispatcher.dispatch(&button_update(7, "cart")).await.unwrap();
        assert_eq!(store.stored_state(7), Some(DialogueState::Cart));

        let sent = transport.sent();
        assert!(sent.contains(&"photo 7: Salmon".to_string()));
        assert!(sent.contains(&"text 7: 5 kg Salmon added to cart".to_string()));
        // Each button turn deletes the superseded screen first.
        assert_eq!(sent.iter().filter(|s| s.starts_with("delete")).count(), 3);
    }

    #[tokio::test]
    async fn test_commerce_failure_leaves_state_unchanged() {
        let store = MemoryStore::default();
        store.insert(
            Session::new(ChatId(7))
                .with_selection(ProductId::from("fish-1"), "Salmon".to_string()),
        );
        let transport = FakeTransport::default();
        let dispatcher = dispatcher(FakeCommerce { fail_add: true }, &store, &transport);

        let err = dispatcher
            .dispatch(&button_update(7, "5"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TurnError::Engine(EngineError::Commerce(CommerceError::Upstream { .. }))
        ));
        assert_eq!(store.stored_state(7), Some(DialogueState::Product));
        // The turn aborted before any send.
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_leaves_state_unchanged() {
        let store = MemoryStore::default();
        store.insert(Session::new(ChatId(7)).with_state(DialogueState::Menu));
        let transport = FakeTransport {
            fail_sends: true,
            ..FakeTransport::default()
        };
        let dispatcher = dispatcher(FakeCommerce { fail_add: false }, &store, &transport);

        let err = dispatcher
            .dispatch(&button_update(7, "cart"))
            .await
            .unwrap_err();
        assert!(matches!(err, TurnError::Transport(_)));
        assert_eq!(store.stored_state(7), Some(DialogueState::Menu));
    }

    #[tokio::test]
    async fn test_store_failure_aborts_before_engine_runs() {
        let store = MemoryStore::default();
        *store.fail_load.lock().unwrap() = true;
        let transport = FakeTransport::default();
        let dispatcher = dispatcher(FakeCommerce { fail_add: false }, &store, &transport);

        let err = dispatcher
            .dispatch(&button_update(7, "cart"))
            .await
            .unwrap_err();
        assert!(matches!(err, TurnError::Store(_)));
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_unhandled_event_sends_nothing_and_keeps_state() {
        let store = MemoryStore::default();
        store.insert(Session::new(ChatId(7)).with_state(DialogueState::Menu));
        let transport = FakeTransport::default();
        let dispatcher = dispatcher(FakeCommerce { fail_add: false }, &store, &transport);

        let update = Update {
            chat_id: ChatId(7),
            event: Event::Text {
                text: "do you deliver?".to_string(),
            },
            message_id: None,
        };
        let err = dispatcher.dispatch(&update).await.unwrap_err();
        assert!(err.is_unhandled_event());
        assert_eq!(store.stored_state(7), Some(DialogueState::Menu));
        assert!(transport.sent().is_empty());

        // The polling-loop wrapper swallows it.
        dispatcher.handle_update(&update).await;
        assert_eq!(store.stored_state(7), Some(DialogueState::Menu));
    }

    #[tokio::test]
    async fn test_replayed_buttons_never_corrupt_session_state() {
        let store = MemoryStore::default();
        let transport = FakeTransport::default();
        let dispatcher = dispatcher(FakeCommerce { fail_add: false }, &store, &transport);

        dispatcher.dispatch(&start_update(7)).await.unwrap();
        dispatcher.dispatch(&button_update(7, "fish-1")).await.unwrap();
        let first = store.sessions.lock().unwrap().get(&7).cloned().unwrap();

        // Same product button delivered again (at-least-once transport):
        // the dialogue is already past MENU, so the replay has no
        // transition and the session is untouched.
        let replay = dispatcher.dispatch(&button_update(7, "fish-1")).await;
        assert!(replay.unwrap_err().is_unhandled_event());
        let second = store.sessions.lock().unwrap().get(&7).cloned().unwrap();
        assert_eq!(first, second);

        // A replayed quantity button stays valid: PRODUCT loops to
        // PRODUCT, the add double-applies, the state does not move.
        dispatcher.dispatch(&button_update(7, "5")).await.unwrap();
        dispatcher.dispatch(&button_update(7, "5")).await.unwrap();
        assert_eq!(store.stored_state(7), Some(DialogueState::Product));
    }
}
