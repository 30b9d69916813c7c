use crate::domain::OrderStatus;
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(String),
    #[error("Order already taken")]
    AlreadyTaken,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Only the customer can confirm delivery")]
    NotCustomer,
    #[error("Invalid status transition: {from:?} -> {to:?}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("No runner assigned to this order")]
    NoRunnerAssigned,
    #[error("Already rated")]
    AlreadyRated,
    #[error("Invalid rating: {0}")]
    InvalidRating(u8),
    #[error("Invalid menu item: {0}")]
    InvalidMenuItem(String),
    #[error("Not authenticated")]
    NotAuthenticated,
    #[error("User not found: {0}")]
    UnknownUser(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
