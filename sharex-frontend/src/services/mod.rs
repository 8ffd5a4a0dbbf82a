pub mod api_client;
pub mod auth_session;
pub mod client_context;
pub mod client_registry;
pub mod metrics;
