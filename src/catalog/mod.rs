//! Cafeteria and menu catalog: reference data, browse/search queries and
//! menu-item rating aggregates.

pub mod error;
pub mod messages;
pub mod service;

pub use error::*;
pub use messages::*;
pub use service::*;
