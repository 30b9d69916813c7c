pub mod cafeteria;
pub mod catalog;
pub mod order;
pub mod rating;
pub mod user;

pub use cafeteria::*;
pub use catalog::*;
pub use order::*;
pub use rating::*;
pub use user::*;

use std::time::{SystemTime, UNIX_EPOCH};

/// Current time as epoch milliseconds, the precision all records carry.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
