//! The dialogue engine: fishbot's state machine.
//!
//! `DialogueEngine::decide` is a pure function of (session, update) up to
//! the commerce calls it makes through its `CommerceApi`: it returns the
//! successor session plus the chat actions for the turn as data, and
//! performs no chat IO itself. The dispatcher executes the actions and
//! persists the session afterwards.

use fishbot_types::catalog::{CartLine, Product, ProductSummary};
use fishbot_types::error::EngineError;
use fishbot_types::event::{ChatAction, Event, InlineButton, Keyboard, Update};
use fishbot_types::ids::{ChatId, ProductId};
use fishbot_types::session::{DialogueState, Session};

use crate::commerce::CommerceApi;

/// Decided outcome of one dialogue turn: the session to persist and the
/// chat actions to execute, in order.
#[derive(Debug)]
pub struct Turn {
    pub next: Session,
    pub actions: Vec<ChatAction>,
}

/// Drives the storefront dialogue over a commerce backend.
pub struct DialogueEngine<C: CommerceApi> {
    commerce: C,
}

impl<C: CommerceApi> DialogueEngine<C> {
    pub fn new(commerce: C) -> Self {
        Self { commerce }
    }

    /// Decide the turn for one update.
    ///
    /// Transitions not covered by the dialogue (free text other than
    /// `/start`, buttons arriving before the first `/start`, malformed
    /// quantity payloads) return `EngineError::UnhandledEvent`; commerce
    /// failures propagate untouched. Either way the caller must not
    /// persist a state change.
    pub async fn decide(&self, session: &Session, update: &Update) -> Result<Turn, EngineError> {
        let chat = session.chat_id;
        let mut actions = Vec::new();

        // Button-driven turns replace the previous screen.
        if let Some(message_id) = update.message_id {
            actions.push(ChatAction::DeleteMessage { message_id });
        }

        let next = match (session.state, &update.event) {
            // `/start` resets the dialogue from any state.
            (_, Event::Start) => {
                actions.push(self.menu_screen().await?);
                session.with_state(DialogueState::Menu)
            }

            (DialogueState::Menu, Event::Button { payload }) => match payload.as_str() {
                "cart" => {
                    actions.push(self.cart_screen(chat).await?);
                    session.with_state(DialogueState::Cart)
                }
                "menu" => {
                    actions.push(self.menu_screen().await?);
                    session.with_state(DialogueState::Menu)
                }
                id => {
                    let product = self.commerce.product_detail(&ProductId::from(id)).await?;
                    actions.push(product_screen(&product));
                    session.with_selection(product.id.clone(), product.name.clone())
                }
            },

            (DialogueState::Product, Event::Button { payload }) => match payload.as_str() {
                "menu" => {
                    actions.push(self.menu_screen().await?);
                    session.with_state(DialogueState::Menu)
                }
                "cart" => {
                    actions.push(self.cart_screen(chat).await?);
                    session.with_state(DialogueState::Cart)
                }
                token => {
                    let Some(quantity) = parse_quantity(token) else {
                        return Err(unhandled(session.state, &update.event));
                    };
                    // A product session without its selection can only come
                    // from a corrupted store record.
                    let (id, name) = match (
                        &session.selected_product_id,
                        &session.selected_product_name,
                    ) {
                        (Some(id), Some(name)) => (id, name),
                        _ => return Err(unhandled(session.state, &update.event)),
                    };
                    self.commerce.add_to_cart(chat, id, quantity).await?;
                    actions.push(added_screen(quantity, name));
                    session.clone()
                }
            },

            (DialogueState::Cart, Event::Button { payload }) => match payload.as_str() {
                "menu" => {
                    actions.push(self.menu_screen().await?);
                    session.with_state(DialogueState::Menu)
                }
                // Any other payload is a cart line id; removing an absent
                // line is a no-op upstream.
                id => {
                    self.commerce
                        .remove_from_cart(chat, &ProductId::from(id))
                        .await?;
                    actions.push(removed_screen());
                    session.with_state(DialogueState::Menu)
                }
            },

            (state, event) => return Err(unhandled(state, event)),
        };

        Ok(Turn { next, actions })
    }

    async fn menu_screen(&self) -> Result<ChatAction, EngineError> {
        let products = self.commerce.list_products().await?;
        Ok(menu_screen(&products))
    }

    async fn cart_screen(&self, chat: ChatId) -> Result<ChatAction, EngineError> {
        let lines = self.commerce.cart_items(chat).await?;
        let total = self.commerce.cart_total(chat).await?;
        Ok(cart_screen(&lines, &total))
    }
}

fn unhandled(state: DialogueState, event: &Event) -> EngineError {
    let event = match event {
        Event::Start => "command '/start'".to_string(),
        Event::Button { payload } => format!("button '{payload}'"),
        Event::Text { text } => format!("text '{text}'"),
    };
    EngineError::UnhandledEvent { state, event }
}

fn parse_quantity(token: &str) -> Option<u32> {
    match token.parse::<u32>() {
        Ok(quantity) if quantity > 0 => Some(quantity),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Screens
// ---------------------------------------------------------------------------

fn menu_screen(products: &[ProductSummary]) -> ChatAction {
    let mut rows: Vec<Vec<InlineButton>> = products
        .iter()
        .map(|product| vec![InlineButton::new(&product.name, product.id.as_str())])
        .collect();
    rows.push(vec![InlineButton::new("🛒 Cart", "cart")]);
    ChatAction::SendText {
        text: "Choose your fish".to_string(),
        keyboard: Keyboard::new(rows),
    }
}

fn product_screen(product: &Product) -> ChatAction {
    let caption = format!(
        "{}\n\n{} per kg\n{} on stock\n\n{}",
        product.name, product.price_display, product.weight_kg, product.description
    );
    let keyboard = Keyboard::new(vec![
        vec![
            InlineButton::new("1 kg", "1"),
            InlineButton::new("5 kg", "5"),
            InlineButton::new("10 kg", "10"),
        ],
        vec![
            InlineButton::new("Back", "menu"),
            InlineButton::new("🛒 Cart", "cart"),
        ],
    ]);
    ChatAction::SendPhoto {
        photo_url: product.image_url.clone(),
        caption,
        keyboard,
    }
}

fn added_screen(quantity: u32, name: &str) -> ChatAction {
    ChatAction::SendText {
        text: format!("{quantity} kg {name} added to cart"),
        keyboard: confirm_keyboard(),
    }
}

fn removed_screen() -> ChatAction {
    ChatAction::SendText {
        text: "Fish removed from cart".to_string(),
        keyboard: confirm_keyboard(),
    }
}

fn cart_screen(lines: &[CartLine], total: &str) -> ChatAction {
    let mut text = String::from("Your cart:\n\n");
    let mut rows: Vec<Vec<InlineButton>> = Vec::with_capacity(lines.len() + 1);
    for line in lines {
        text.push_str(&format!(
            "{}\n{} per kg\n{}kg in cart for {}\n\n",
            line.name, line.unit_price_display, line.quantity, line.line_cost_display
        ));
        rows.push(vec![InlineButton::new(
            format!("Remove {}", line.name),
            line.product_id.as_str(),
        )]);
    }
    text.push_str(&format!("Total: {total}"));
    rows.push(vec![InlineButton::new("🐟 Menu", "menu")]);
    ChatAction::SendText {
        text,
        keyboard: Keyboard::new(rows),
    }
}

fn confirm_keyboard() -> Keyboard {
    Keyboard::new(vec![vec![
        InlineButton::new("🐟 Menu", "menu"),
        InlineButton::new("🛒 Cart", "cart"),
    ]])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
