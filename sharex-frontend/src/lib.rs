pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;

use services::client_registry::ClientRegistry;
use std::sync::Arc;

/// Shared application state: the per-session client contexts and the
/// browser-facing origin used for share links.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ClientRegistry>,
    pub public_url: Arc<str>,
}

impl AppState {
    pub fn new(registry: Arc<ClientRegistry>, public_url: &str) -> Self {
        Self {
            registry,
            public_url: Arc::from(public_url.trim_end_matches('/')),
        }
    }
}
