use super::client_method;
use crate::domain::{CartItem, Order, OrderDraft, OrderStatus};
use crate::orders::{
    CustomerOrder, DispatchOrder, HistoryOrder, IncomingMessage, OrderDetails, OrderError,
    OrderRequest, RunnerStats,
};
use tokio::sync::mpsc;
use tracing::{debug, instrument};

/// Client for the order actor. Mutations take the acting user's id; the
/// service re-derives authorization from the directory on every call.
#[derive(Clone)]
pub struct OrderClient {
    sender: mpsc::Sender<OrderRequest>,
}

impl OrderClient {
    pub fn new(sender: mpsc::Sender<OrderRequest>) -> Self {
        Self { sender }
    }

    /// Convenience for the cancel buttons; cancellation is a status update.
    #[instrument(skip(self))]
    pub async fn cancel(&self, actor: String, order_id: String) -> Result<(), OrderError> {
        self.update_status(actor, order_id, OrderStatus::Cancelled)
            .await
    }

    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), OrderError> {
        debug!("Sending shutdown request");
        self.sender
            .send(OrderRequest::Shutdown)
            .await
            .map_err(|_| OrderError::ActorCommunicationError("Actor closed".to_string()))
    }
}

client_method!(OrderClient => fn create(actor: String, draft: OrderDraft) -> String as OrderRequest::Create, Error = OrderError);
client_method!(OrderClient => fn accept(actor: String, order_id: String) -> () as OrderRequest::Accept, Error = OrderError);
client_method!(OrderClient => fn update_status(actor: String, order_id: String, status: OrderStatus) -> () as OrderRequest::UpdateStatus, Error = OrderError);
client_method!(OrderClient => fn rate_runner(actor: String, order_id: String, rating: u8, comment: Option<String>) -> () as OrderRequest::RateRunner, Error = OrderError);
client_method!(OrderClient => fn rate_menu_items(actor: String, order_id: String, ratings: Vec<(String, u8)>) -> () as OrderRequest::RateMenuItems, Error = OrderError);
client_method!(OrderClient => fn has_rated_runner(actor: String, order_id: String) -> bool as OrderRequest::HasRatedRunner, Error = OrderError);
client_method!(OrderClient => fn has_rated_items(actor: String, order_id: String) -> bool as OrderRequest::HasRatedItems, Error = OrderError);
client_method!(OrderClient => fn add_chat_message(actor: String, order_id: String, message: String) -> () as OrderRequest::AddChatMessage, Error = OrderError);
client_method!(OrderClient => fn mark_messages_read(actor: String, order_id: String) -> () as OrderRequest::MarkMessagesRead, Error = OrderError);
client_method!(OrderClient => fn incoming_messages(actor: String) -> Vec<IncomingMessage> as OrderRequest::IncomingMessages, Error = OrderError);
client_method!(OrderClient => fn list_available() -> Vec<DispatchOrder> as OrderRequest::ListAvailable, Error = OrderError);
client_method!(OrderClient => fn list_runner_active(actor: String) -> Vec<DispatchOrder> as OrderRequest::ListRunnerActive, Error = OrderError);
client_method!(OrderClient => fn list_runner_history(actor: String) -> Vec<HistoryOrder> as OrderRequest::ListRunnerHistory, Error = OrderError);
client_method!(OrderClient => fn list_my_orders(actor: String) -> Vec<CustomerOrder> as OrderRequest::ListMyOrders, Error = OrderError);
client_method!(OrderClient => fn runner_stats(actor: String) -> RunnerStats as OrderRequest::RunnerStats, Error = OrderError);
client_method!(OrderClient => fn latest_delivered_unrated(actor: String) -> Option<Order> as OrderRequest::LatestDeliveredUnrated, Error = OrderError);
client_method!(OrderClient => fn get(order_id: String) -> Option<OrderDetails> as OrderRequest::Get, Error = OrderError);
client_method!(OrderClient => fn add_to_cart(actor: String, menu_item_id: String, quantity: u32) -> () as OrderRequest::AddToCart, Error = OrderError);
client_method!(OrderClient => fn get_cart(actor: String) -> Vec<CartItem> as OrderRequest::GetCart, Error = OrderError);
client_method!(OrderClient => fn clear_cart(actor: String) -> () as OrderRequest::ClearCart, Error = OrderError);
