//! Operator alert mirror.
//!
//! [`OperatorAlertLayer`] is a `tracing_subscriber` layer that captures
//! error-level events and pushes one formatted line per event into a
//! channel. [`spawn_operator_forwarder`] drains that channel and sends
//! each line to the operator's chat through any
//! [`ChatTransport`](fishbot_core::transport::ChatTransport).
//!
//! The mirror is a side observer: it never blocks the emitting code
//! path, and a dead forwarder just means alerts stop, not the bot.

use std::fmt;

use tokio::sync::mpsc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber, warn};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use fishbot_core::transport::ChatTransport;
use fishbot_types::event::Keyboard;
use fishbot_types::ids::ChatId;

/// Captures `ERROR` events as formatted lines on a channel.
pub struct OperatorAlertLayer {
    sender: mpsc::UnboundedSender<String>,
}

impl OperatorAlertLayer {
    /// Create the layer together with the receiving end the forwarder
    /// drains.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl<S: Subscriber> Layer<S> for OperatorAlertLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if *metadata.level() != Level::ERROR {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let mut line = format!(
            "ERROR {}: {}",
            metadata.target(),
            visitor.message.unwrap_or_default()
        );
        for field in visitor.fields {
            line.push(' ');
            line.push_str(&field);
        }

        // A closed channel means the forwarder is gone (shutdown);
        // dropping the line is the right thing then.
        let _ = self.sender.send(line);
    }
}

/// Collects the event message and its remaining fields as `key=value`.
#[derive(Default)]
struct EventVisitor {
    message: Option<String>,
    fields: Vec<String>,
}

impl Visit for EventVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.push(format!("{}={value}", field.name()));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        } else {
            self.fields.push(format!("{}={value:?}", field.name()));
        }
    }
}

/// Drain alert lines and send each to the operator chat.
///
/// Runs until the layer (sender side) is dropped. Send failures are
/// logged at `warn` -- an `error!` here would feed straight back into
/// the alert layer.
pub fn spawn_operator_forwarder<T>(
    transport: T,
    operator: ChatId,
    mut receiver: mpsc::UnboundedReceiver<String>,
) -> tokio::task::JoinHandle<()>
where
    T: ChatTransport + 'static,
{
    tokio::spawn(async move {
        while let Some(line) = receiver.recv().await {
            if let Err(err) = transport
                .send_message(operator, &line, &Keyboard::default())
                .await
            {
                warn!(error = %err, "Failed to forward alert to operator chat");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fishbot_types::error::TransportError;
    use fishbot_types::ids::MessageId;
    use tracing_subscriber::layer::SubscriberExt;

    use std::sync::{Arc, Mutex};

    #[test]
    fn test_layer_captures_only_error_events() {
        let (layer, mut receiver) = OperatorAlertLayer::new();
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("turn complete");
            tracing::warn!("ignoring event");
            tracing::error!("commerce backend down");
        });

        let line = receiver.try_recv().unwrap();
        assert!(line.starts_with("ERROR "));
        assert!(line.contains("commerce backend down"));
        assert!(receiver.try_recv().is_err(), "only the error should pass");
    }

    #[test]
    fn test_layer_appends_structured_fields() {
        let (layer, mut receiver) = OperatorAlertLayer::new();
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::error!(chat_id = 7, error = "store down", "Turn failed");
        });

        let line = receiver.try_recv().unwrap();
        assert!(line.contains("Turn failed"));
        assert!(line.contains("chat_id=7"));
        assert!(line.contains("store down"));
    }

    struct RecordingTransport {
        sent: Arc<Mutex<Vec<(ChatId, String)>>>,
        fail: bool,
    }

    impl ChatTransport for RecordingTransport {
        async fn send_message(
            &self,
            chat: ChatId,
            text: &str,
            _keyboard: &Keyboard,
        ) -> Result<MessageId, TransportError> {
            self.sent.lock().unwrap().push((chat, text.to_string()));
            if self.fail {
                return Err(TransportError::Request("offline".to_string()));
            }
            Ok(MessageId(1))
        }

        async fn send_photo(
            &self,
            _chat: ChatId,
            _photo_url: &str,
            _caption: &str,
            _keyboard: &Keyboard,
        ) -> Result<MessageId, TransportError> {
            unreachable!("alerts are text-only")
        }

        async fn delete_message(
            &self,
            _chat: ChatId,
            _message: MessageId,
        ) -> Result<(), TransportError> {
            unreachable!("alerts never delete")
        }
    }

    #[tokio::test]
    async fn test_forwarder_sends_each_line_to_operator() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let transport = RecordingTransport {
            sent: Arc::clone(&sent),
            fail: false,
        };
        let (sender, receiver) = mpsc::unbounded_channel();

        let handle = spawn_operator_forwarder(transport, ChatId(99), receiver);
        sender.send("ERROR fishbot: first".to_string()).unwrap();
        sender.send("ERROR fishbot: second".to_string()).unwrap();
        drop(sender);
        handle.await.unwrap();

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0, ChatId(99));
        assert_eq!(sent[0].1, "ERROR fishbot: first");
        assert_eq!(sent[1].1, "ERROR fishbot: second");
    }

    #[tokio::test]
    async fn test_forwarder_survives_send_failures() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let transport = RecordingTransport {
            sent: Arc::clone(&sent),
            fail: true,
        };
        let (sender, receiver) = mpsc::unbounded_channel();

        let handle = spawn_operator_forwarder(transport, ChatId(99), receiver);
        sender.send("first".to_string()).unwrap();
        sender.send("second".to_string()).unwrap();
        drop(sender);
        handle.await.unwrap();

        // Both lines were attempted despite the failures.
        assert_eq!(sent.lock().unwrap().len(), 2);
    }
}
