//! System orchestration, configuration and observability setup.

pub mod config;
pub mod delivery_system;
pub mod tracing;

pub use config::*;
pub use delivery_system::*;
pub use tracing::*;
