//! Order lifecycle: creation, runner assignment, status advancement,
//! ratings, the embedded chat log and every order-facing query.

pub mod error;
pub mod messages;
pub mod service;

pub use error::*;
pub use messages::*;
pub use service::*;
