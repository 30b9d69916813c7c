use super::error::OrderError;
use crate::domain::{CartItem, Order, OrderDraft, OrderStatus};
use tokio::sync::oneshot;

pub type OrderResponse<T> = oneshot::Sender<Result<T, OrderError>>;

/// One order line hydrated for the dispatch and runner screens.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchItem {
    pub id: String,
    pub quantity: u32,
    pub product_name: String,
    pub cafeteria_name: String,
}

/// An order as the dispatch board and runner screens see it.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOrder {
    pub id: String,
    pub runner_id: Option<String>,
    pub delivery_address: Option<String>,
    pub delivery_notes: Option<String>,
    pub customer_name: String,
    pub total: f64,
    pub status: OrderStatus,
    pub items: Vec<DispatchItem>,
    pub created_at: u64,
}

/// A fulfilled (or cancelled) order in the runner's history, with the
/// runner's commission.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryOrder {
    pub id: String,
    pub delivery_address: Option<String>,
    pub total: f64,
    pub status: OrderStatus,
    pub commission: f64,
    pub items: Vec<DispatchItem>,
    pub updated_at: u64,
}

/// One order line hydrated for the customer's order history.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerItem {
    pub id: String,
    pub menu_item_id: String,
    pub quantity: u32,
    pub subtotal: f64,
    pub product_name: String,
    pub image_url: String,
    pub cafeteria_name: String,
}

/// An order as the customer's order-history screen sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerOrder {
    pub id: String,
    pub cafeteria_name: String,
    pub items: Vec<CustomerItem>,
    pub total: f64,
    pub status: OrderStatus,
    pub created_at: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunnerInfo {
    pub name: String,
    pub rating: f64,
}

/// A single order fully hydrated for the tracking screen.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDetails {
    pub order: Order,
    pub customer_name: String,
    pub items: Vec<CustomerItem>,
    pub runner_info: Option<RunnerInfo>,
}

/// Earnings and workload summary for a runner's home screen.
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerStats {
    pub today_earnings: f64,
    pub week_earnings: f64,
    pub total_earnings: f64,
    pub available_count: usize,
    pub rating: f64,
}

/// An unread chat message addressed to the caller, hydrated with the
/// sender's name for the toast.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingMessage {
    pub order_id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub message: String,
    pub created_at: u64,
}

/// Typed messages for the order actor. Mutations carry the acting user's id;
/// authorization is re-derived inside the actor on every call.
#[derive(Debug)]
pub enum OrderRequest {
    Create {
        actor: String,
        draft: OrderDraft,
        respond_to: OrderResponse<String>,
    },
    Accept {
        actor: String,
        order_id: String,
        respond_to: OrderResponse<()>,
    },
    UpdateStatus {
        actor: String,
        order_id: String,
        status: OrderStatus,
        respond_to: OrderResponse<()>,
    },
    RateRunner {
        actor: String,
        order_id: String,
        rating: u8,
        comment: Option<String>,
        respond_to: OrderResponse<()>,
    },
    RateMenuItems {
        actor: String,
        order_id: String,
        ratings: Vec<(String, u8)>,
        respond_to: OrderResponse<()>,
    },
    HasRatedRunner {
        actor: String,
        order_id: String,
        respond_to: OrderResponse<bool>,
    },
    HasRatedItems {
        actor: String,
        order_id: String,
        respond_to: OrderResponse<bool>,
    },
    AddChatMessage {
        actor: String,
        order_id: String,
        message: String,
        respond_to: OrderResponse<()>,
    },
    MarkMessagesRead {
        actor: String,
        order_id: String,
        respond_to: OrderResponse<()>,
    },
    IncomingMessages {
        actor: String,
        respond_to: OrderResponse<Vec<IncomingMessage>>,
    },
    ListAvailable {
        respond_to: OrderResponse<Vec<DispatchOrder>>,
    },
    ListRunnerActive {
        actor: String,
        respond_to: OrderResponse<Vec<DispatchOrder>>,
    },
    ListRunnerHistory {
        actor: String,
        respond_to: OrderResponse<Vec<HistoryOrder>>,
    },
    ListMyOrders {
        actor: String,
        respond_to: OrderResponse<Vec<CustomerOrder>>,
    },
    RunnerStats {
        actor: String,
        respond_to: OrderResponse<RunnerStats>,
    },
    LatestDeliveredUnrated {
        actor: String,
        respond_to: OrderResponse<Option<Order>>,
    },
    Get {
        order_id: String,
        respond_to: OrderResponse<Option<OrderDetails>>,
    },
    AddToCart {
        actor: String,
        menu_item_id: String,
        quantity: u32,
        respond_to: OrderResponse<()>,
    },
    GetCart {
        actor: String,
        respond_to: OrderResponse<Vec<CartItem>>,
    },
    ClearCart {
        actor: String,
        respond_to: OrderResponse<()>,
    },
    Shutdown,
}
