// libs/directory-cell/src/services/tokens.rs
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_models::external::{ExternalError, PushTokenRegistry};

/// One push token per user. A user without a token is a normal condition
/// (fresh install, logged-out device); lookups return `None` rather than
/// an error.
pub struct InMemoryTokenRegistry {
    tokens: RwLock<HashMap<Uuid, String>>,
}

impl InMemoryTokenRegistry {
    pub fn new() -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
        }
    }

    pub async fn register(&self, user_id: Uuid, token: String) {
        debug!("Registering push token for user {}", user_id);
        self.tokens.write().await.insert(user_id, token);
    }

    pub async fn remove(&self, user_id: Uuid) -> bool {
        self.tokens.write().await.remove(&user_id).is_some()
    }
}

impl Default for InMemoryTokenRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PushTokenRegistry for InMemoryTokenRegistry {
    async fn get_token(&self, user_id: Uuid) -> Result<Option<String>, ExternalError> {
        Ok(self.tokens.read().await.get(&user_id).cloned())
    }
}
