//! In-memory client store for development and tests.
use super::{ClientStore, OAuthClient, StoreError, StoreResult};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryStore {
    clients: RwLock<HashMap<String, OAuthClient>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClientStore for InMemoryStore {
    async fn find_by_client_id(&self, client_id: &str) -> StoreResult<Option<OAuthClient>> {
        let clients = self.clients.read().await;
        Ok(clients.get(client_id).cloned())
    }

    async fn insert_client(&self, client: OAuthClient) -> StoreResult<()> {
        let mut clients = self.clients.write().await;
        if clients.contains_key(&client.client_id) {
            return Err(StoreError::Conflict(client.client_id));
        }
        clients.insert(client.client_id.clone(), client);
        metrics::gauge!("authserver_registered_clients").set(clients.len() as f64);
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
