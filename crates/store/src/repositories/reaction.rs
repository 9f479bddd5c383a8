//! Reaction repository.

use async_trait::async_trait;
use std::collections::HashMap;
use tidepub_common::AppResult;
use tokio::sync::RwLock;

use crate::entities::{Reaction, ReactionKind};
use crate::values::ObjectId;

/// Store of reaction facts, keyed by `(kind, user_id, post_id)`.
///
/// An emoji reaction's kind carries the emoji, so one user can hold
/// several different emoji reactions on the same post. Writes are
/// idempotent the same way follow edges are.
#[async_trait]
pub trait ReactionRepository: Send + Sync {
    /// Find the reaction for this key, if any.
    async fn find(
        &self,
        kind: &ReactionKind,
        user_id: &ObjectId,
        post_id: &ObjectId,
    ) -> AppResult<Option<Reaction>>;

    /// Persist a reaction. Keeps the existing fact if the key is already present.
    async fn save(&self, reaction: &Reaction) -> AppResult<()>;

    /// Remove the reaction for this key, if any.
    async fn delete(
        &self,
        kind: &ReactionKind,
        user_id: &ObjectId,
        post_id: &ObjectId,
    ) -> AppResult<()>;
}

type ReactionKey = (ReactionKind, ObjectId, ObjectId);

/// In-memory [`ReactionRepository`].
#[derive(Debug, Default)]
pub struct MemoryReactionRepository {
    reactions: RwLock<HashMap<ReactionKey, Reaction>>,
}

impl MemoryReactionRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn key(kind: &ReactionKind, user_id: &ObjectId, post_id: &ObjectId) -> ReactionKey {
        (kind.clone(), user_id.clone(), post_id.clone())
    }
}

#[async_trait]
impl ReactionRepository for MemoryReactionRepository {
    async fn find(
        &self,
        kind: &ReactionKind,
        user_id: &ObjectId,
        post_id: &ObjectId,
    ) -> AppResult<Option<Reaction>> {
        let key = Self::key(kind, user_id, post_id);
        Ok(self.reactions.read().await.get(&key).cloned())
    }

    async fn save(&self, reaction: &Reaction) -> AppResult<()> {
        let key = Self::key(&reaction.kind, &reaction.user_id, &reaction.post_id);
        self.reactions
            .write()
            .await
            .entry(key)
            .or_insert_with(|| reaction.clone());
        Ok(())
    }

    async fn delete(
        &self,
        kind: &ReactionKind,
        user_id: &ObjectId,
        post_id: &ObjectId,
    ) -> AppResult<()> {
        let key = Self::key(kind, user_id, post_id);
        self.reactions.write().await.remove(&key);
        Ok(())
    }
}
