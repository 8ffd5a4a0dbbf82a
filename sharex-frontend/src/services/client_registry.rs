use crate::config::ApiSettings;
use crate::services::api_client::ApiError;
use crate::services::client_context::ClientContext;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Live client contexts keyed by the id stored in each browser session.
pub struct ClientRegistry {
    contexts: DashMap<Uuid, Arc<ClientContext>>,
    api_settings: ApiSettings,
}

impl ClientRegistry {
    pub fn new(api_settings: ApiSettings) -> Self {
        Self {
            contexts: DashMap::new(),
            api_settings,
        }
    }

    pub fn get(&self, id: &Uuid) -> Option<Arc<ClientContext>> {
        self.contexts.get(id).map(|entry| entry.value().clone())
    }

    /// Existing context for `id`, or a freshly mounted one under a new id.
    pub async fn get_or_mount(
        &self,
        id: Option<Uuid>,
    ) -> Result<(Uuid, Arc<ClientContext>), ApiError> {
        if let Some(id) = id {
            if let Some(context) = self.get(&id) {
                context.touch();
                return Ok((id, context));
            }
        }

        // Mount outside the map lock; it awaits the API.
        let context = Arc::new(ClientContext::mount(&self.api_settings).await?);
        let id = Uuid::new_v4();
        self.contexts.insert(id, context.clone());

        tracing::debug!(client_id = %id, active = self.contexts.len(), "Client context mounted");
        metrics::gauge!("sharex_client_contexts").set(self.contexts.len() as f64);
        Ok((id, context))
    }

    pub fn remove(&self, id: &Uuid) -> bool {
        let removed = self.contexts.remove(id).is_some();
        metrics::gauge!("sharex_client_contexts").set(self.contexts.len() as f64);
        removed
    }

    /// Drop contexts idle for longer than `max_idle`. Returns how many went.
    pub fn purge_idle(&self, max_idle: Duration) -> usize {
        let before = self.contexts.len();
        self.contexts
            .retain(|_, context| context.idle_for() <= max_idle);
        let purged = before.saturating_sub(self.contexts.len());

        if purged > 0 {
            tracing::info!(purged, remaining = self.contexts.len(), "Purged idle client contexts");
        }
        metrics::gauge!("sharex_client_contexts").set(self.contexts.len() as f64);
        purged
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_api() -> ApiSettings {
        ApiSettings {
            // Nothing listens on port 9; mounting settles as logged out.
            url: "http://127.0.0.1:9".to_string(),
            timeout_seconds: 2,
        }
    }

    #[tokio::test]
    async fn mounts_once_per_id() {
        let registry = ClientRegistry::new(unreachable_api());

        let (id, first) = registry.get_or_mount(None).await.unwrap();
        let (same_id, second) = registry.get_or_mount(Some(id)).await.unwrap();

        assert_eq!(id, same_id);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
        assert!(!first.auth().is_logged_in().await);
    }

    #[tokio::test]
    async fn unknown_id_gets_a_new_context() {
        let registry = ClientRegistry::new(unreachable_api());
        let stale = Uuid::new_v4();

        let (id, _) = registry.get_or_mount(Some(stale)).await.unwrap();
        assert_ne!(id, stale);
    }

    #[tokio::test]
    async fn purge_and_remove() {
        let registry = ClientRegistry::new(unreachable_api());
        let (id, _) = registry.get_or_mount(None).await.unwrap();

        assert_eq!(registry.purge_idle(Duration::from_secs(3600)), 0);
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(registry.purge_idle(Duration::ZERO), 1);
        assert!(registry.is_empty());
        assert!(!registry.remove(&id));
    }
}
