use thiserror::Error;

/// Errors that can occur during catalog operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("Cafeteria not found: {0}")]
    CafeteriaNotFound(String),
    #[error("Category not found: {0}")]
    CategoryNotFound(String),
    #[error("Product not found: {0}")]
    ProductNotFound(String),
    #[error("Menu item not found: {0}")]
    MenuItemNotFound(String),
    #[error("Invalid rating: {0}")]
    InvalidRating(u8),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
