//! User repository.

use async_trait::async_trait;
use std::collections::HashMap;
use tidepub_common::{AppError, AppResult};
use tokio::sync::RwLock;

use crate::entities::User;
use crate::values::{ObjectId, Username};

/// Store of user accounts.
///
/// Accounts are keyed by id; the `(username, hostname)` pair is unique
/// across the store, with a `None` hostname meaning a local account.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by ID.
    async fn find_by_id(&self, id: &ObjectId) -> AppResult<Option<User>>;

    /// Find a user by username and hostname. `None` hostname selects local users.
    async fn find_by_username_and_hostname(
        &self,
        username: &Username,
        hostname: Option<&str>,
    ) -> AppResult<Option<User>>;

    /// Persist a user.
    ///
    /// Fails with [`AppError::Conflict`] if a different user already holds
    /// the same `(username, hostname)` pair.
    async fn save(&self, user: &User) -> AppResult<()>;
}

/// In-memory [`UserRepository`].
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<ObjectId, User>>,
}

impl MemoryUserRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: &ObjectId) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_username_and_hostname(
        &self,
        username: &Username,
        hostname: Option<&str>,
    ) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.username == *username && u.hostname.as_deref() == hostname)
            .cloned())
    }

    async fn save(&self, user: &User) -> AppResult<()> {
        let mut users = self.users.write().await;
        let taken = users
            .values()
            .any(|u| u.id != user.id && u.username == user.username && u.hostname == user.hostname);
        if taken {
            return Err(AppError::Conflict(format!(
                "Username {} is already taken",
                user.username
            )));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }
}
