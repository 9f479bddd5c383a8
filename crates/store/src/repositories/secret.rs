//! Secret repository.

use async_trait::async_trait;
use std::collections::HashMap;
use tidepub_common::AppResult;
use tokio::sync::RwLock;

/// Opaque key-value store for server-side secrets, such as the signing
/// keys used by the token service.
#[async_trait]
pub trait SecretRepository: Send + Sync {
    /// Read a secret.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Write a secret, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> AppResult<()>;
}

/// In-memory [`SecretRepository`].
#[derive(Debug, Default)]
pub struct MemorySecretRepository {
    secrets: RwLock<HashMap<String, String>>,
}

impl MemorySecretRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecretRepository for MemorySecretRepository {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.secrets.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.secrets
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
