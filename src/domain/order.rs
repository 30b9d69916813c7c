/// Lifecycle states of an order, in their allowed forward order.
///
/// `Cancelled` is the side-state; everything else advances strictly through
/// [`OrderStatus::successor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Placed,
    Confirmed,
    Preparing,
    PickedUp,
    ArrivedAtDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// The only status an order in this state may advance to, `None` for
    /// terminal states. `Placed -> Confirmed` happens through runner
    /// acceptance, never through a plain status update.
    pub fn successor(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Placed => Some(OrderStatus::Confirmed),
            OrderStatus::Confirmed => Some(OrderStatus::Preparing),
            OrderStatus::Preparing => Some(OrderStatus::PickedUp),
            OrderStatus::PickedUp => Some(OrderStatus::ArrivedAtDelivery),
            OrderStatus::ArrivedAtDelivery => Some(OrderStatus::Delivered),
            OrderStatus::Delivered | OrderStatus::Cancelled => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

/// Payment state of an order. The gateway itself is out of scope, so orders
/// stay `Pending` unless operated on externally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

/// One entry of the chat log embedded in an order.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub sender_id: String,
    pub message: String,
    pub read: bool,
    pub created_at: u64,
}

/// A customer order. `runner_id` is set at most once, by acceptance, and
/// never changes afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub runner_id: Option<String>,
    pub total: f64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub delivery_address: Option<String>,
    pub delivery_notes: Option<String>,
    pub recipient_name: Option<String>,
    pub recipient_phone: Option<String>,
    pub delivery_fee: f64,
    pub takeaway_fee: f64,
    pub is_takeaway: bool,
    pub payment_reference: Option<String>,
    pub created_at: u64,
    pub updated_at: u64,
    pub chats: Vec<ChatMessage>,
}

/// A line of an order. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub menu_item_id: String,
    pub quantity: u32,
    pub subtotal: f64,
    pub created_at: u64,
}

/// Persisted cart staging row. The primary cart lives in the session store;
/// these rows back the server-side variant.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    pub user_id: String,
    pub menu_item_id: String,
    pub quantity: u32,
    pub created_at: u64,
    pub updated_at: u64,
}

/// One cart line at checkout time; `price` is the unit price the client saw.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub menu_item_id: String,
    pub quantity: u32,
    pub price: f64,
}

/// Everything the checkout screen submits to place an order. The total is
/// computed by the caller from the cart plus fees.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub items: Vec<OrderLine>,
    pub delivery_address: String,
    pub phone: String,
    pub recipient_name: Option<String>,
    pub recipient_phone: Option<String>,
    pub is_gift: bool,
    pub is_takeaway: bool,
    pub takeaway_fee: f64,
    pub delivery_fee: f64,
    pub total: f64,
    pub payment_method: String,
    pub delivery_notes: Option<String>,
}

/// Payment record stub for a future gateway integration. Nothing mutates
/// these beyond creation.
#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)]
pub struct Transaction {
    pub order_id: String,
    pub user_id: String,
    pub reference: String,
    pub amount: f64,
    pub status: TransactionStatus,
    pub payment_method: Option<String>,
    pub created_at: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
pub enum TransactionStatus {
    Pending,
    Success,
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_advance_in_declared_order() {
        let mut status = OrderStatus::Placed;
        let expected = [
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::PickedUp,
            OrderStatus::ArrivedAtDelivery,
            OrderStatus::Delivered,
        ];
        for next in expected {
            status = status.successor().unwrap();
            assert_eq!(status, next);
        }
        assert_eq!(status.successor(), None);
    }

    #[test]
    fn terminal_states_have_no_successor() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert_eq!(OrderStatus::Cancelled.successor(), None);
        assert!(!OrderStatus::ArrivedAtDelivery.is_terminal());
    }
}
