//! Follow repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tidepub_common::AppResult;
use tokio::sync::RwLock;

use crate::entities::Follow;
use crate::values::ObjectId;

/// Position of a follow edge in the listing order.
///
/// Listings are sorted by `(created_at, id)` descending; the id component
/// disambiguates edges created at the same instant so a listing can resume
/// from a position deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowPosition {
    pub created_at: DateTime<Utc>,
    pub id: ObjectId,
}

impl FollowPosition {
    /// The position of an existing edge.
    #[must_use]
    pub fn of(follow: &Follow) -> Self {
        Self {
            created_at: follow.created_at,
            id: follow.id.clone(),
        }
    }
}

/// Store of follow edges.
///
/// An edge is unique per `(follower_id, followee_id)`. Writes are
/// idempotent: re-following keeps the original edge and unfollowing a
/// missing edge is a no-op.
#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Persist a follow edge. Keeps the existing edge if the pair is already present.
    async fn save(&self, follow: &Follow) -> AppResult<()>;

    /// Remove the edge for the pair, if any.
    async fn delete(&self, follower_id: &ObjectId, followee_id: &ObjectId) -> AppResult<()>;

    /// Whether an edge exists for this exact pair.
    async fn is_following(&self, follower_id: &ObjectId, followee_id: &ObjectId)
    -> AppResult<bool>;

    /// Edges pointing at `user_id`, newest first. When `from` is given the
    /// listing starts at that position, inclusive.
    async fn find_followers(
        &self,
        user_id: &ObjectId,
        limit: usize,
        from: Option<&FollowPosition>,
    ) -> AppResult<Vec<Follow>>;

    /// Edges originating from `user_id`, newest first. When `from` is given
    /// the listing starts at that position, inclusive.
    async fn find_following(
        &self,
        user_id: &ObjectId,
        limit: usize,
        from: Option<&FollowPosition>,
    ) -> AppResult<Vec<Follow>>;
}

/// In-memory [`FollowRepository`].
#[derive(Debug, Default)]
pub struct MemoryFollowRepository {
    edges: RwLock<HashMap<(ObjectId, ObjectId), Follow>>,
}

impl MemoryFollowRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn page(mut edges: Vec<Follow>, limit: usize, from: Option<&FollowPosition>) -> Vec<Follow> {
        edges.sort_by(|a, b| (b.created_at, &b.id).cmp(&(a.created_at, &a.id)));
        edges
            .into_iter()
            .filter(|f| from.is_none_or(|pos| (f.created_at, &f.id) <= (pos.created_at, &pos.id)))
            .take(limit)
            .collect()
    }
}

#[async_trait]
impl FollowRepository for MemoryFollowRepository {
    async fn save(&self, follow: &Follow) -> AppResult<()> {
        let key = (follow.follower_id.clone(), follow.followee_id.clone());
        self.edges
            .write()
            .await
            .entry(key)
            .or_insert_with(|| follow.clone());
        Ok(())
    }

    async fn delete(&self, follower_id: &ObjectId, followee_id: &ObjectId) -> AppResult<()> {
        let key = (follower_id.clone(), followee_id.clone());
        self.edges.write().await.remove(&key);
        Ok(())
    }

    async fn is_following(
        &self,
        follower_id: &ObjectId,
        followee_id: &ObjectId,
    ) -> AppResult<bool> {
        let key = (follower_id.clone(), followee_id.clone());
        Ok(self.edges.read().await.contains_key(&key))
    }

    async fn find_followers(
        &self,
        user_id: &ObjectId,
        limit: usize,
        from: Option<&FollowPosition>,
    ) -> AppResult<Vec<Follow>> {
        let edges = self.edges.read().await;
        let matching = edges
            .values()
            .filter(|f| f.followee_id == *user_id)
            .cloned()
            .collect();
        Ok(Self::page(matching, limit, from))
    }

    async fn find_following(
        &self,
        user_id: &ObjectId,
        limit: usize,
        from: Option<&FollowPosition>,
    ) -> AppResult<Vec<Follow>> {
        let edges = self.edges.read().await;
        let matching = edges
            .values()
            .filter(|f| f.follower_id == *user_id)
            .cloned()
            .collect();
        Ok(Self::page(matching, limit, from))
    }
}
