//! sharex-core: shared infrastructure for the ShareX web client.
pub mod error;
pub mod middleware;
pub mod observability;

pub use axum;
pub use tracing;
