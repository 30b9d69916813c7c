//! Session-scoped client state: the cart, delivery preferences and the
//! checkout bridge, persisted under fixed keys through a storage
//! abstraction, plus the transient chat-toast dedup.
//!
//! This is an explicit store object handed to views by reference; there is
//! no process-wide state. Hydration happens once at construction, teardown
//! on logout or after an order completes.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::warn;

pub const CART_ITEMS_KEY: &str = "cart_items";
pub const IS_TAKEAWAY_KEY: &str = "is_takeaway";
pub const USER_LOCATION_KEY: &str = "user_location";
pub const USER_PHONE_KEY: &str = "user_phone";
pub const CHECKOUT_PAYLOAD_KEY: &str = "checkout_payload";

/// Key-value persistence behind the session. Browser local storage in the
/// real client; in-memory here and in tests.
pub trait Storage: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// One line of the client-local cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub menu_item_id: String,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
    pub image_url: String,
    pub cafeteria_name: Option<String>,
    pub cafeteria_fee: Option<f64>,
}

/// The transient bridge from the cart screen to the checkout screen;
/// consumed on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutPayload {
    pub lines: Vec<CartLine>,
    pub delivery_fee: f64,
    pub takeaway_fee: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SessionError {
    #[error("You can only order from one cafeteria per order")]
    MixedCafeterias,
}

pub struct Session {
    storage: Box<dyn Storage>,
    user: Option<String>,
    cart: Vec<CartLine>,
    is_takeaway: bool,
}

impl Session {
    /// Builds a session from persisted state. Malformed persisted JSON is
    /// discarded rather than surfaced; the cart just starts empty.
    pub fn hydrate(storage: Box<dyn Storage>) -> Self {
        let cart = storage
            .get(CART_ITEMS_KEY)
            .and_then(|raw| match serde_json::from_str(&raw) {
                Ok(lines) => Some(lines),
                Err(e) => {
                    warn!(error = %e, "Discarding unreadable persisted cart");
                    None
                }
            })
            .unwrap_or_default();
        let is_takeaway = storage
            .get(IS_TAKEAWAY_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or(false);

        Self {
            storage,
            user: None,
            cart,
            is_takeaway,
        }
    }

    pub fn login(&mut self, user_id: impl Into<String>) {
        self.user = Some(user_id.into());
    }

    /// Clears the signed-in user and everything staged for them.
    pub fn logout(&mut self) {
        self.user = None;
        self.clear_cart();
        self.storage.remove(CHECKOUT_PAYLOAD_KEY);
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_deref()
    }

    // -------------------------------------------------------------------------
    // Cart
    // -------------------------------------------------------------------------

    pub fn cart(&self) -> &[CartLine] {
        &self.cart
    }

    /// Adds one unit of an item. Lines from a second cafeteria are rejected;
    /// an order is fulfilled from a single cafeteria.
    pub fn add_item(&mut self, item: CartLine) -> Result<(), SessionError> {
        let current = self
            .cart
            .iter()
            .find_map(|l| l.cafeteria_name.as_deref());
        if let (Some(current), Some(incoming)) = (current, item.cafeteria_name.as_deref()) {
            if current != incoming {
                return Err(SessionError::MixedCafeterias);
            }
        }

        if let Some(line) = self
            .cart
            .iter_mut()
            .find(|l| l.menu_item_id == item.menu_item_id)
        {
            line.quantity += 1;
        } else {
            self.cart.push(CartLine {
                quantity: 1,
                ..item
            });
        }
        self.persist_cart();
        Ok(())
    }

    pub fn remove_item(&mut self, menu_item_id: &str) {
        self.cart.retain(|l| l.menu_item_id != menu_item_id);
        self.persist_cart();
    }

    /// Sets a line's quantity; zero removes the line.
    pub fn update_quantity(&mut self, menu_item_id: &str, quantity: u32) {
        if quantity == 0 {
            self.remove_item(menu_item_id);
            return;
        }
        if let Some(line) = self.cart.iter_mut().find(|l| l.menu_item_id == menu_item_id) {
            line.quantity = quantity;
        }
        self.persist_cart();
    }

    pub fn total_items(&self) -> u32 {
        self.cart.iter().map(|l| l.quantity).sum()
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
        self.storage.remove(CART_ITEMS_KEY);
    }

    fn persist_cart(&mut self) {
        match serde_json::to_string(&self.cart) {
            Ok(raw) => self.storage.set(CART_ITEMS_KEY, raw),
            Err(e) => warn!(error = %e, "Failed to persist cart"),
        }
    }

    // -------------------------------------------------------------------------
    // Preferences
    // -------------------------------------------------------------------------

    pub fn is_takeaway(&self) -> bool {
        self.is_takeaway
    }

    pub fn set_takeaway(&mut self, is_takeaway: bool) {
        self.is_takeaway = is_takeaway;
        self.storage
            .set(IS_TAKEAWAY_KEY, is_takeaway.to_string());
    }

    pub fn location(&self) -> Option<String> {
        self.storage.get(USER_LOCATION_KEY)
    }

    pub fn set_location(&mut self, address: impl Into<String>) {
        self.storage.set(USER_LOCATION_KEY, address.into());
    }

    pub fn phone(&self) -> Option<String> {
        self.storage.get(USER_PHONE_KEY)
    }

    pub fn set_phone(&mut self, phone: impl Into<String>) {
        self.storage.set(USER_PHONE_KEY, phone.into());
    }

    // -------------------------------------------------------------------------
    // Checkout bridge
    // -------------------------------------------------------------------------

    pub fn stage_checkout(&mut self, payload: &CheckoutPayload) {
        match serde_json::to_string(payload) {
            Ok(raw) => self.storage.set(CHECKOUT_PAYLOAD_KEY, raw),
            Err(e) => warn!(error = %e, "Failed to stage checkout payload"),
        }
    }

    /// Reads and removes the staged checkout payload.
    pub fn take_checkout(&mut self) -> Option<CheckoutPayload> {
        let payload = self
            .storage
            .get(CHECKOUT_PAYLOAD_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())?;
        self.storage.remove(CHECKOUT_PAYLOAD_KEY);
        Some(payload)
    }
}

/// Dedup for chat toast notifications, keyed by message timestamp.
/// Deliberately transient: a reload forgets what was already shown, which is
/// acceptable for a notification nicety.
#[derive(Debug, Default)]
pub struct ChatNotifier {
    notified: HashSet<u64>,
}

impl ChatNotifier {
    /// True exactly once per message timestamp.
    pub fn should_notify(&mut self, message_timestamp: u64) -> bool {
        self.notified.insert(message_timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: &str, cafeteria: &str, price: f64) -> CartLine {
        CartLine {
            menu_item_id: id.to_string(),
            name: id.to_string(),
            price,
            quantity: 1,
            image_url: String::new(),
            cafeteria_name: Some(cafeteria.to_string()),
            cafeteria_fee: Some(500.0),
        }
    }

    #[test]
    fn cart_persists_and_rehydrates_under_the_fixed_key() {
        let mut storage = MemoryStorage::default();
        {
            let mut session = Session::hydrate(Box::new(MemoryStorage::default()));
            session.add_item(line("menu_item_1", "Grills", 1000.0)).unwrap();
            session.add_item(line("menu_item_1", "Grills", 1000.0)).unwrap();
            session.set_takeaway(true);
            // Move the persisted state over as if it were the same browser.
            storage.set(
                CART_ITEMS_KEY,
                session.storage.get(CART_ITEMS_KEY).unwrap(),
            );
            storage.set(IS_TAKEAWAY_KEY, session.storage.get(IS_TAKEAWAY_KEY).unwrap());
        }

        let session = Session::hydrate(Box::new(storage));
        assert_eq!(session.cart().len(), 1);
        assert_eq!(session.cart()[0].quantity, 2);
        assert!(session.is_takeaway());
    }

    #[test]
    fn malformed_persisted_cart_is_discarded() {
        let mut storage = MemoryStorage::default();
        storage.set(CART_ITEMS_KEY, "{not json".to_string());
        let session = Session::hydrate(Box::new(storage));
        assert!(session.cart().is_empty());
    }

    #[test]
    fn items_from_a_second_cafeteria_are_rejected() {
        let mut session = Session::hydrate(Box::new(MemoryStorage::default()));
        session.add_item(line("menu_item_1", "Grills", 1000.0)).unwrap();
        assert_eq!(
            session.add_item(line("menu_item_9", "BTO", 700.0)),
            Err(SessionError::MixedCafeterias)
        );
        assert_eq!(session.cart().len(), 1);
    }

    #[test]
    fn zero_quantity_removes_the_line() {
        let mut session = Session::hydrate(Box::new(MemoryStorage::default()));
        session.add_item(line("menu_item_1", "Grills", 1000.0)).unwrap();
        session.update_quantity("menu_item_1", 3);
        assert_eq!(session.total_items(), 3);
        session.update_quantity("menu_item_1", 0);
        assert!(session.cart().is_empty());
    }

    #[test]
    fn delivery_preferences_persist_under_their_keys() {
        let mut session = Session::hydrate(Box::new(MemoryStorage::default()));
        session.set_location("Hall 3, Room 12");
        session.set_phone("08012345678");
        assert_eq!(session.location().as_deref(), Some("Hall 3, Room 12"));
        assert_eq!(session.phone().as_deref(), Some("08012345678"));
    }

    #[test]
    fn removing_a_line_leaves_the_rest() {
        let mut session = Session::hydrate(Box::new(MemoryStorage::default()));
        session.add_item(line("menu_item_1", "Grills", 1000.0)).unwrap();
        session.add_item(line("menu_item_2", "Grills", 700.0)).unwrap();
        session.remove_item("menu_item_1");
        assert_eq!(session.cart().len(), 1);
        assert_eq!(session.cart()[0].menu_item_id, "menu_item_2");
    }

    #[test]
    fn checkout_payload_is_consumed_on_read() {
        let mut session = Session::hydrate(Box::new(MemoryStorage::default()));
        let payload = CheckoutPayload {
            lines: vec![line("menu_item_1", "Grills", 1000.0)],
            delivery_fee: 500.0,
            takeaway_fee: 0.0,
            total: 1500.0,
        };
        session.stage_checkout(&payload);
        assert_eq!(session.take_checkout(), Some(payload));
        assert_eq!(session.take_checkout(), None);
    }

    #[test]
    fn logout_clears_user_and_cart() {
        let mut session = Session::hydrate(Box::new(MemoryStorage::default()));
        session.login("user_1");
        session.add_item(line("menu_item_1", "Grills", 1000.0)).unwrap();
        session.logout();
        assert_eq!(session.user_id(), None);
        assert!(session.cart().is_empty());
    }

    #[test]
    fn notifier_fires_once_per_timestamp() {
        let mut notifier = ChatNotifier::default();
        assert!(notifier.should_notify(1_000));
        assert!(!notifier.should_notify(1_000));
        assert!(notifier.should_notify(1_001));
    }
}
