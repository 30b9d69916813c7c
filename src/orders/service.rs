use super::error::OrderError;
use super::messages::{
    CustomerItem, CustomerOrder, DispatchItem, DispatchOrder, HistoryOrder, IncomingMessage,
    OrderDetails, OrderRequest, RunnerInfo, RunnerStats,
};
use crate::clients::{CatalogClient, DirectoryClient, OrderClient};
use crate::catalog::CatalogError;
use crate::directory::UserError;
use crate::domain::{
    now_millis, CartItem, ChatMessage, MenuItemRating, Order, OrderDraft, OrderItem, OrderStatus,
    PaymentStatus, Role, RunnerRating, User,
};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

/// Share of an order's total paid to the runner who delivered it.
const COMMISSION_RATE: f64 = 0.1;

const DAY_MS: u64 = 24 * 60 * 60 * 1000;

fn start_of_utc_day(now: u64) -> u64 {
    now - now % DAY_MS
}

/// Root actor for the order lifecycle.
///
/// Owns orders, order items, cart staging rows and both rating stores, and
/// holds directory and catalog clients for validation and view hydration.
/// Because the message loop runs each handler to completion, the
/// check-then-set on `runner_id` in accept is atomic: two racing accepts are
/// processed one after the other and the second sees the assignment.
pub struct OrderService {
    receiver: mpsc::Receiver<OrderRequest>,
    directory: DirectoryClient,
    catalog: CatalogClient,
    orders: HashMap<String, Order>,
    order_items: HashMap<String, Vec<OrderItem>>,
    carts: HashMap<String, Vec<CartItem>>,
    runner_ratings: HashMap<(String, String), RunnerRating>,
    item_ratings: HashMap<(String, String), MenuItemRating>,
    next_id: u64,
}

impl OrderService {
    pub fn new(
        buffer_size: usize,
        directory: DirectoryClient,
        catalog: CatalogClient,
    ) -> (Self, OrderClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let service = Self {
            receiver,
            directory,
            catalog,
            orders: HashMap::new(),
            order_items: HashMap::new(),
            carts: HashMap::new(),
            runner_ratings: HashMap::new(),
            item_ratings: HashMap::new(),
            next_id: 1,
        };
        let client = OrderClient::new(sender);
        (service, client)
    }

    fn next_id(&mut self, prefix: &str) -> String {
        let id = format!("{}_{}", prefix, self.next_id);
        self.next_id += 1;
        id
    }

    #[instrument(name = "order_service", skip(self))]
    pub async fn run(mut self) {
        info!("OrderService starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                OrderRequest::Create {
                    actor,
                    draft,
                    respond_to,
                } => {
                    let result = self.handle_create(actor, draft).await;
                    let _ = respond_to.send(result);
                }
                OrderRequest::Accept {
                    actor,
                    order_id,
                    respond_to,
                } => {
                    let result = self.handle_accept(actor, order_id).await;
                    let _ = respond_to.send(result);
                }
                OrderRequest::UpdateStatus {
                    actor,
                    order_id,
                    status,
                    respond_to,
                } => {
                    let result = self.handle_update_status(actor, order_id, status).await;
                    let _ = respond_to.send(result);
                }
                OrderRequest::RateRunner {
                    actor,
                    order_id,
                    rating,
                    comment,
                    respond_to,
                } => {
                    let result = self.handle_rate_runner(actor, order_id, rating, comment).await;
                    let _ = respond_to.send(result);
                }
                OrderRequest::RateMenuItems {
                    actor,
                    order_id,
                    ratings,
                    respond_to,
                } => {
                    let result = self.handle_rate_menu_items(actor, order_id, ratings).await;
                    let _ = respond_to.send(result);
                }
                OrderRequest::HasRatedRunner {
                    actor: _,
                    order_id,
                    respond_to,
                } => {
                    let _ = respond_to.send(Ok(self.handle_has_rated_runner(&order_id)));
                }
                OrderRequest::HasRatedItems {
                    actor,
                    order_id,
                    respond_to,
                } => {
                    let _ = respond_to.send(Ok(self.handle_has_rated_items(&actor, &order_id)));
                }
                OrderRequest::AddChatMessage {
                    actor,
                    order_id,
                    message,
                    respond_to,
                } => {
                    let result = self.handle_add_chat_message(actor, order_id, message);
                    let _ = respond_to.send(result);
                }
                OrderRequest::MarkMessagesRead {
                    actor,
                    order_id,
                    respond_to,
                } => {
                    let _ = respond_to.send(Ok(self.handle_mark_messages_read(&actor, &order_id)));
                }
                OrderRequest::IncomingMessages { actor, respond_to } => {
                    let result = self.handle_incoming_messages(&actor).await;
                    let _ = respond_to.send(Ok(result));
                }
                OrderRequest::ListAvailable { respond_to } => {
                    let result = self.handle_list_available().await;
                    let _ = respond_to.send(Ok(result));
                }
                OrderRequest::ListRunnerActive { actor, respond_to } => {
                    let result = self.handle_list_runner_active(&actor).await;
                    let _ = respond_to.send(Ok(result));
                }
                OrderRequest::ListRunnerHistory { actor, respond_to } => {
                    let result = self.handle_list_runner_history(&actor).await;
                    let _ = respond_to.send(Ok(result));
                }
                OrderRequest::ListMyOrders { actor, respond_to } => {
                    let result = self.handle_list_my_orders(&actor).await;
                    let _ = respond_to.send(Ok(result));
                }
                OrderRequest::RunnerStats { actor, respond_to } => {
                    let result = self.handle_runner_stats(&actor).await;
                    let _ = respond_to.send(result);
                }
                OrderRequest::LatestDeliveredUnrated { actor, respond_to } => {
                    let _ = respond_to.send(Ok(self.handle_latest_delivered_unrated(&actor)));
                }
                OrderRequest::Get { order_id, respond_to } => {
                    let result = self.handle_get(&order_id).await;
                    let _ = respond_to.send(Ok(result));
                }
                OrderRequest::AddToCart {
                    actor,
                    menu_item_id,
                    quantity,
                    respond_to,
                } => {
                    let result = self.handle_add_to_cart(actor, menu_item_id, quantity).await;
                    let _ = respond_to.send(result);
                }
                OrderRequest::GetCart { actor, respond_to } => {
                    let cart = self.carts.get(&actor).cloned().unwrap_or_default();
                    let _ = respond_to.send(Ok(cart));
                }
                OrderRequest::ClearCart { actor, respond_to } => {
                    self.carts.remove(&actor);
                    let _ = respond_to.send(Ok(()));
                }
                OrderRequest::Shutdown => {
                    info!("OrderService shutting down");
                    break;
                }
            }
        }

        info!("OrderService stopped");
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    #[instrument(fields(actor = %actor, lines = draft.items.len(), total = %draft.total), skip(self, draft))]
    async fn handle_create(&mut self, actor: String, draft: OrderDraft) -> Result<String, OrderError> {
        debug!("Processing create request");

        // The first authenticated action may arrive before the identity
        // webhook; get-or-create keeps both paths working.
        self.directory
            .get_or_create(&actor)
            .await
            .map_err(|e| OrderError::ActorCommunicationError(e.to_string()))?;

        for line in &draft.items {
            match self.catalog.get_menu_item(line.menu_item_id.clone()).await {
                Ok(Some(_)) => {}
                Ok(None) => {
                    error!(menu_item_id = %line.menu_item_id, "Unknown menu item in cart");
                    return Err(OrderError::InvalidMenuItem(line.menu_item_id.clone()));
                }
                Err(e) => return Err(OrderError::ActorCommunicationError(e.to_string())),
            }
        }

        let now = now_millis();
        let order_id = self.next_id("order");
        let recipient_phone = if draft.is_gift {
            draft.recipient_phone.clone()
        } else {
            Some(draft.phone.clone())
        };

        let items: Vec<OrderItem> = draft
            .items
            .iter()
            .map(|line| OrderItem {
                id: self.next_id("order_item"),
                order_id: order_id.clone(),
                menu_item_id: line.menu_item_id.clone(),
                quantity: line.quantity,
                subtotal: line.price * line.quantity as f64,
                created_at: now,
            })
            .collect();

        self.orders.insert(
            order_id.clone(),
            Order {
                id: order_id.clone(),
                user_id: actor,
                runner_id: None,
                total: draft.total,
                status: OrderStatus::Placed,
                payment_status: PaymentStatus::Pending,
                delivery_address: Some(draft.delivery_address),
                delivery_notes: draft.delivery_notes,
                recipient_name: draft.recipient_name,
                recipient_phone,
                delivery_fee: draft.delivery_fee,
                takeaway_fee: draft.takeaway_fee,
                is_takeaway: draft.is_takeaway,
                payment_reference: None,
                created_at: now,
                updated_at: now,
                chats: Vec::new(),
            },
        );
        self.order_items.insert(order_id.clone(), items);

        info!(order_id = %order_id, "Order placed");
        Ok(order_id)
    }

    #[instrument(fields(actor = %actor, order_id = %order_id), skip(self))]
    async fn handle_accept(&mut self, actor: String, order_id: String) -> Result<(), OrderError> {
        debug!("Processing accept request");

        let user = self.fetch_user(&actor).await?;
        if !matches!(user.role, Role::Runner | Role::Admin) {
            error!("Non-runner tried to accept an order");
            return Err(OrderError::Unauthorized);
        }

        let order = self
            .orders
            .get_mut(&order_id)
            .ok_or(OrderError::NotFound(order_id.clone()))?;
        if order.runner_id.is_some() {
            debug!("Order already has a runner");
            return Err(OrderError::AlreadyTaken);
        }

        order.runner_id = Some(actor);
        order.status = OrderStatus::Confirmed;
        order.updated_at = now_millis();
        info!("Order accepted");
        Ok(())
    }

    #[instrument(fields(actor = %actor, order_id = %order_id, status = ?status), skip(self))]
    async fn handle_update_status(
        &mut self,
        actor: String,
        order_id: String,
        status: OrderStatus,
    ) -> Result<(), OrderError> {
        debug!("Processing update_status request");

        let order = self
            .orders
            .get(&order_id)
            .cloned()
            .ok_or(OrderError::NotFound(order_id.clone()))?;

        match status {
            // Placement and confirmation have their own entry points.
            OrderStatus::Placed | OrderStatus::Confirmed => {
                return Err(OrderError::InvalidTransition {
                    from: order.status,
                    to: status,
                });
            }
            OrderStatus::Delivered => {
                if order.user_id != actor {
                    error!("Delivery confirmation attempted by someone other than the customer");
                    return Err(OrderError::NotCustomer);
                }
                if order.status.successor() != Some(OrderStatus::Delivered) {
                    return Err(OrderError::InvalidTransition {
                        from: order.status,
                        to: status,
                    });
                }
            }
            OrderStatus::Cancelled => {
                self.authorize_cancel(&order, &actor).await?;
            }
            _ => {
                if order.runner_id.as_deref() != Some(actor.as_str()) {
                    let user = self.fetch_user(&actor).await?;
                    if user.role != Role::Admin {
                        error!("Status update attempted by someone other than the runner");
                        return Err(OrderError::Unauthorized);
                    }
                }
                if order.status.successor() != Some(status) {
                    return Err(OrderError::InvalidTransition {
                        from: order.status,
                        to: status,
                    });
                }
            }
        }

        if let Some(order) = self.orders.get_mut(&order_id) {
            order.status = status;
            order.updated_at = now_millis();
        }
        info!("Order status updated");
        Ok(())
    }

    /// Cancellation rules: the customer may back out while the order is
    /// unclaimed, the assigned runner before the food is picked up, an admin
    /// at any non-terminal point.
    async fn authorize_cancel(&self, order: &Order, actor: &str) -> Result<(), OrderError> {
        let blocked = OrderError::InvalidTransition {
            from: order.status,
            to: OrderStatus::Cancelled,
        };
        if order.status.is_terminal() {
            return Err(blocked);
        }
        if order.runner_id.as_deref() == Some(actor) {
            return if matches!(order.status, OrderStatus::Confirmed | OrderStatus::Preparing) {
                Ok(())
            } else {
                Err(blocked)
            };
        }
        if order.user_id == actor {
            return if order.status == OrderStatus::Placed {
                Ok(())
            } else {
                Err(blocked)
            };
        }
        let user = self.fetch_user(actor).await?;
        if user.role == Role::Admin {
            Ok(())
        } else {
            Err(OrderError::Unauthorized)
        }
    }

    #[instrument(fields(actor = %actor, order_id = %order_id, rating = rating), skip(self, comment))]
    async fn handle_rate_runner(
        &mut self,
        actor: String,
        order_id: String,
        rating: u8,
        comment: Option<String>,
    ) -> Result<(), OrderError> {
        debug!("Processing rate_runner request");

        if !(1..=5).contains(&rating) {
            return Err(OrderError::InvalidRating(rating));
        }
        let order = self
            .orders
            .get(&order_id)
            .ok_or(OrderError::NotFound(order_id.clone()))?;
        let runner_id = order
            .runner_id
            .clone()
            .ok_or(OrderError::NoRunnerAssigned)?;

        let key = (runner_id.clone(), order_id.clone());
        if self.runner_ratings.contains_key(&key) {
            debug!("Runner already rated for this order");
            return Err(OrderError::AlreadyRated);
        }

        self.runner_ratings.insert(
            key,
            RunnerRating {
                runner_id: runner_id.clone(),
                user_id: actor,
                order_id,
                rating,
                comment,
                created_at: now_millis(),
            },
        );

        match self.directory.record_runner_rating(&runner_id, rating).await {
            Ok((avg, count)) => info!(avg = avg, count = count, "Runner rating recorded"),
            // The rating row stands even if the runner record vanished.
            Err(UserError::NotFound(id)) => warn!(runner_id = %id, "Runner record missing"),
            Err(e) => return Err(OrderError::ActorCommunicationError(e.to_string())),
        }
        Ok(())
    }

    #[instrument(fields(actor = %actor, order_id = %order_id, lines = ratings.len()), skip(self, ratings))]
    async fn handle_rate_menu_items(
        &mut self,
        actor: String,
        order_id: String,
        ratings: Vec<(String, u8)>,
    ) -> Result<(), OrderError> {
        debug!("Processing rate_menu_items request");

        if !self.orders.contains_key(&order_id) {
            return Err(OrderError::NotFound(order_id));
        }

        // Validate every line before touching any aggregate.
        for (menu_item_id, rating) in &ratings {
            if !(1..=5).contains(rating) {
                return Err(OrderError::InvalidRating(*rating));
            }
            if self
                .item_ratings
                .contains_key(&(actor.clone(), menu_item_id.clone()))
            {
                debug!(menu_item_id = %menu_item_id, "Menu item already rated by this user");
                return Err(OrderError::AlreadyRated);
            }
        }

        for (menu_item_id, rating) in ratings {
            match self.catalog.rate_menu_item(menu_item_id.clone(), rating).await {
                Ok(()) => {
                    self.item_ratings.insert(
                        (actor.clone(), menu_item_id.clone()),
                        MenuItemRating {
                            user_id: actor.clone(),
                            menu_item_id,
                            rating,
                            created_at: now_millis(),
                        },
                    );
                }
                Err(CatalogError::MenuItemNotFound(id)) => {
                    return Err(OrderError::InvalidMenuItem(id))
                }
                Err(e) => return Err(OrderError::ActorCommunicationError(e.to_string())),
            }
        }
        info!("Menu items rated");
        Ok(())
    }

    fn handle_has_rated_runner(&self, order_id: &str) -> bool {
        let Some(order) = self.orders.get(order_id) else {
            return false;
        };
        let Some(runner_id) = order.runner_id.as_ref() else {
            return false;
        };
        self.runner_ratings
            .contains_key(&(runner_id.clone(), order_id.to_string()))
    }

    fn handle_has_rated_items(&self, actor: &str, order_id: &str) -> bool {
        let Some(items) = self.order_items.get(order_id) else {
            return false;
        };
        // The rating modal submits every line at once, so probing the first
        // line is enough.
        items.first().is_some_and(|item| {
            self.item_ratings
                .contains_key(&(actor.to_string(), item.menu_item_id.clone()))
        })
    }

    // -------------------------------------------------------------------------
    // Chat
    // -------------------------------------------------------------------------

    #[instrument(fields(actor = %actor, order_id = %order_id), skip(self, message))]
    fn handle_add_chat_message(
        &mut self,
        actor: String,
        order_id: String,
        message: String,
    ) -> Result<(), OrderError> {
        debug!("Processing add_chat_message request");

        let order = self
            .orders
            .get_mut(&order_id)
            .ok_or(OrderError::NotFound(order_id))?;
        let now = now_millis();
        order.chats.push(ChatMessage {
            sender_id: actor,
            message,
            read: false,
            created_at: now,
        });
        order.updated_at = now;
        Ok(())
    }

    /// Flips `read` on every message not authored by the caller. A missing
    /// order is a no-op, matching the best-effort client call.
    fn handle_mark_messages_read(&mut self, actor: &str, order_id: &str) {
        if let Some(order) = self.orders.get_mut(order_id) {
            for chat in order.chats.iter_mut() {
                if chat.sender_id != actor {
                    chat.read = true;
                }
            }
        }
    }

    async fn handle_incoming_messages(&self, actor: &str) -> Vec<IncomingMessage> {
        let mut names: HashMap<String, String> = HashMap::new();
        let mut incoming = Vec::new();

        for order in self.orders.values() {
            let mine = order.user_id == actor || order.runner_id.as_deref() == Some(actor);
            if !mine {
                continue;
            }
            for chat in order.chats.iter().filter(|c| !c.read && c.sender_id != actor) {
                let sender_name = match names.get(&chat.sender_id) {
                    Some(name) => name.clone(),
                    None => {
                        let name = self
                            .directory
                            .get_user(&chat.sender_id)
                            .await
                            .ok()
                            .flatten()
                            .map(|u| u.name)
                            .unwrap_or_else(|| "Someone".to_string());
                        names.insert(chat.sender_id.clone(), name.clone());
                        name
                    }
                };
                incoming.push(IncomingMessage {
                    order_id: order.id.clone(),
                    sender_id: chat.sender_id.clone(),
                    sender_name,
                    message: chat.message.clone(),
                    created_at: chat.created_at,
                });
            }
        }
        incoming.sort_by_key(|m| m.created_at);
        incoming
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    async fn handle_list_available(&self) -> Vec<DispatchOrder> {
        let mut open: Vec<&Order> = self
            .orders
            .values()
            .filter(|o| o.status == OrderStatus::Placed && o.runner_id.is_none())
            .collect();
        // Oldest orders first so they get claimed first.
        open.sort_by_key(|o| o.created_at);

        let mut views = Vec::with_capacity(open.len());
        for order in open {
            views.push(self.dispatch_view(order).await);
        }
        views
    }

    async fn handle_list_runner_active(&self, actor: &str) -> Vec<DispatchOrder> {
        let mut active: Vec<&Order> = self
            .orders
            .values()
            .filter(|o| o.runner_id.as_deref() == Some(actor) && !o.status.is_terminal())
            .collect();
        active.sort_by_key(|o| o.created_at);

        let mut views = Vec::with_capacity(active.len());
        for order in active {
            views.push(self.dispatch_view(order).await);
        }
        views
    }

    async fn handle_list_runner_history(&self, actor: &str) -> Vec<HistoryOrder> {
        let mut history: Vec<&Order> = self
            .orders
            .values()
            .filter(|o| o.runner_id.as_deref() == Some(actor))
            .collect();
        history.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        let mut views = Vec::with_capacity(history.len());
        for order in history {
            views.push(HistoryOrder {
                id: order.id.clone(),
                delivery_address: order.delivery_address.clone(),
                total: order.total,
                status: order.status,
                commission: order.total * COMMISSION_RATE,
                items: self.dispatch_items(&order.id).await,
                updated_at: order.updated_at,
            });
        }
        views
    }

    async fn handle_list_my_orders(&self, actor: &str) -> Vec<CustomerOrder> {
        let mut mine: Vec<&Order> = self
            .orders
            .values()
            .filter(|o| o.user_id == actor)
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut views = Vec::with_capacity(mine.len());
        for order in mine {
            let items = self.customer_items(&order.id).await;
            views.push(CustomerOrder {
                id: order.id.clone(),
                cafeteria_name: items
                    .first()
                    .map(|i| i.cafeteria_name.clone())
                    .unwrap_or_else(|| "Campus Eats".to_string()),
                items,
                total: order.total,
                status: order.status,
                created_at: order.created_at,
            });
        }
        views
    }

    async fn handle_runner_stats(&self, actor: &str) -> Result<RunnerStats, OrderError> {
        let now = now_millis();
        let today_start = start_of_utc_day(now);
        let week_start = today_start.saturating_sub(7 * DAY_MS);

        let mut today_earnings = 0.0;
        let mut week_earnings = 0.0;
        let mut total_earnings = 0.0;
        for order in self.orders.values().filter(|o| {
            o.runner_id.as_deref() == Some(actor) && o.status == OrderStatus::Delivered
        }) {
            let commission = order.total * COMMISSION_RATE;
            total_earnings += commission;
            if order.updated_at >= today_start {
                today_earnings += commission;
            }
            if order.updated_at >= week_start {
                week_earnings += commission;
            }
        }

        let available_count = self
            .orders
            .values()
            .filter(|o| o.status == OrderStatus::Placed && o.runner_id.is_none())
            .count();

        let rating = self
            .directory
            .get_user(actor)
            .await
            .map_err(|e| OrderError::ActorCommunicationError(e.to_string()))?
            .map(|u| u.runner_avg_rating)
            .unwrap_or(0.0);

        Ok(RunnerStats {
            today_earnings,
            week_earnings,
            total_earnings,
            available_count,
            rating,
        })
    }

    fn handle_latest_delivered_unrated(&self, actor: &str) -> Option<Order> {
        let latest = self
            .orders
            .values()
            .filter(|o| o.user_id == actor && o.status == OrderStatus::Delivered)
            .max_by_key(|o| o.created_at)?;

        if let Some(runner_id) = latest.runner_id.as_ref() {
            if self
                .runner_ratings
                .contains_key(&(runner_id.clone(), latest.id.clone()))
            {
                return None;
            }
        }
        Some(latest.clone())
    }

    async fn handle_get(&self, order_id: &str) -> Option<OrderDetails> {
        let order = self.orders.get(order_id)?;
        let customer_name = self.user_name(&order.user_id, "Customer").await;

        let runner_info = match order.runner_id.as_ref() {
            Some(runner_id) => {
                self.directory
                    .get_user(runner_id)
                    .await
                    .ok()
                    .flatten()
                    .map(|runner| RunnerInfo {
                        name: runner.name,
                        // New runners show a neutral 4.5 until their first
                        // rating lands.
                        rating: if runner.runner_total_ratings == 0 {
                            4.5
                        } else {
                            runner.runner_avg_rating
                        },
                    })
            }
            None => None,
        };

        Some(OrderDetails {
            order: order.clone(),
            customer_name,
            items: self.customer_items(order_id).await,
            runner_info,
        })
    }

    // -------------------------------------------------------------------------
    // Cart staging
    // -------------------------------------------------------------------------

    #[instrument(fields(actor = %actor, menu_item_id = %menu_item_id, quantity = quantity), skip(self))]
    async fn handle_add_to_cart(
        &mut self,
        actor: String,
        menu_item_id: String,
        quantity: u32,
    ) -> Result<(), OrderError> {
        self.directory
            .get_or_create(&actor)
            .await
            .map_err(|e| OrderError::ActorCommunicationError(e.to_string()))?;

        let now = now_millis();
        let cart = self.carts.entry(actor.clone()).or_default();
        if let Some(line) = cart.iter_mut().find(|l| l.menu_item_id == menu_item_id) {
            line.quantity += quantity;
            line.updated_at = now;
        } else {
            cart.push(CartItem {
                user_id: actor,
                menu_item_id,
                quantity,
                created_at: now,
                updated_at: now,
            });
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Hydration helpers
    // -------------------------------------------------------------------------

    async fn fetch_user(&self, id: &str) -> Result<User, OrderError> {
        match self.directory.get_user(id).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(OrderError::UnknownUser(id.to_string())),
            Err(e) => Err(OrderError::ActorCommunicationError(e.to_string())),
        }
    }

    async fn user_name(&self, id: &str, fallback: &str) -> String {
        self.directory
            .get_user(id)
            .await
            .ok()
            .flatten()
            .map(|u| u.name)
            .unwrap_or_else(|| fallback.to_string())
    }

    async fn dispatch_view(&self, order: &Order) -> DispatchOrder {
        DispatchOrder {
            id: order.id.clone(),
            runner_id: order.runner_id.clone(),
            delivery_address: order.delivery_address.clone(),
            delivery_notes: order.delivery_notes.clone(),
            customer_name: self.user_name(&order.user_id, "Customer").await,
            total: order.total,
            status: order.status,
            items: self.dispatch_items(&order.id).await,
            created_at: order.created_at,
        }
    }

    async fn dispatch_items(&self, order_id: &str) -> Vec<DispatchItem> {
        let Some(items) = self.order_items.get(order_id) else {
            return Vec::new();
        };
        let mut views = Vec::with_capacity(items.len());
        for item in items {
            let label = self
                .catalog
                .describe_menu_item(item.menu_item_id.clone())
                .await
                .ok()
                .flatten();
            views.push(DispatchItem {
                id: item.id.clone(),
                quantity: item.quantity,
                product_name: label
                    .as_ref()
                    .map(|l| l.product_name.clone())
                    .unwrap_or_else(|| "Unknown Item".to_string()),
                cafeteria_name: label
                    .map(|l| l.cafeteria_name)
                    .unwrap_or_else(|| "Unknown Cafeteria".to_string()),
            });
        }
        views
    }

    async fn customer_items(&self, order_id: &str) -> Vec<CustomerItem> {
        let Some(items) = self.order_items.get(order_id) else {
            return Vec::new();
        };
        let mut views = Vec::with_capacity(items.len());
        for item in items {
            let label = self
                .catalog
                .describe_menu_item(item.menu_item_id.clone())
                .await
                .ok()
                .flatten();
            views.push(CustomerItem {
                id: item.id.clone(),
                menu_item_id: item.menu_item_id.clone(),
                quantity: item.quantity,
                subtotal: item.subtotal,
                product_name: label
                    .as_ref()
                    .map(|l| l.product_name.clone())
                    .unwrap_or_else(|| "Unknown Item".to_string()),
                image_url: label.as_ref().map(|l| l.image_url.clone()).unwrap_or_default(),
                cafeteria_name: label
                    .map(|l| l.cafeteria_name)
                    .unwrap_or_else(|| "Unknown Cafeteria".to_string()),
            });
        }
        views
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_boundary_is_utc_midnight() {
        // 2024-01-02T03:04:05Z
        let ts = 1_704_164_645_000u64;
        let midnight = start_of_utc_day(ts);
        assert_eq!(midnight % DAY_MS, 0);
        assert!(ts - midnight < DAY_MS);
    }
}
