//! Favorites, bookmarks, and emoji reactions.

use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

use tidepub_common::{AppError, AppResult, IdGenerator};
use tidepub_store::entities::{Reaction, ReactionKind};
use tidepub_store::repositories::{ReactionRepository, UserRepository};
use tidepub_store::values::ObjectId;

use crate::services::visibility::VisibilityService;

/// Service for attaching and removing per-user reaction facts on posts.
///
/// Favorites, bookmarks, and emoji reactions all go through the same two
/// checks: the acting user must exist, and the target post must exist and
/// be visible to them. A post that exists but is hidden reads as missing,
/// the same as everywhere else.
#[derive(Clone)]
pub struct ReactionService {
    user_repo: Arc<dyn UserRepository>,
    reaction_repo: Arc<dyn ReactionRepository>,
    visibility: VisibilityService,
    id_gen: IdGenerator,
}

impl ReactionService {
    /// Create a new reaction service.
    #[must_use]
    pub const fn new(
        user_repo: Arc<dyn UserRepository>,
        reaction_repo: Arc<dyn ReactionRepository>,
        visibility: VisibilityService,
        id_gen: IdGenerator,
    ) -> Self {
        Self {
            user_repo,
            reaction_repo,
            visibility,
            id_gen,
        }
    }

    /// Favorite a post.
    pub async fn add_favorite(&self, user_id: &ObjectId, post_id: &ObjectId) -> AppResult<()> {
        self.store(user_id, post_id, ReactionKind::Favorite).await
    }

    /// Remove a favorite. Removing one that was never set is a no-op.
    pub async fn remove_favorite(&self, user_id: &ObjectId, post_id: &ObjectId) -> AppResult<()> {
        self.discard(user_id, post_id, ReactionKind::Favorite).await
    }

    /// Bookmark a post.
    pub async fn add_bookmark(&self, user_id: &ObjectId, post_id: &ObjectId) -> AppResult<()> {
        self.store(user_id, post_id, ReactionKind::Bookmark).await
    }

    /// Remove a bookmark. Removing one that was never set is a no-op.
    pub async fn remove_bookmark(&self, user_id: &ObjectId, post_id: &ObjectId) -> AppResult<()> {
        self.discard(user_id, post_id, ReactionKind::Bookmark).await
    }

    /// React to a post with an emoji. Each distinct emoji is its own fact,
    /// so one user can hold several emoji reactions on the same post.
    pub async fn add_emoji(
        &self,
        user_id: &ObjectId,
        post_id: &ObjectId,
        emoji: &str,
    ) -> AppResult<()> {
        self.store(user_id, post_id, emoji_kind(emoji)?).await
    }

    /// Remove an emoji reaction. Removing one that was never set is a no-op.
    pub async fn remove_emoji(
        &self,
        user_id: &ObjectId,
        post_id: &ObjectId,
        emoji: &str,
    ) -> AppResult<()> {
        self.discard(user_id, post_id, emoji_kind(emoji)?).await
    }

    /// Validate and persist one reaction fact.
    ///
    /// Re-adding an existing reaction keeps the original fact, so the
    /// operation is idempotent end to end.
    async fn store(
        &self,
        user_id: &ObjectId,
        post_id: &ObjectId,
        kind: ReactionKind,
    ) -> AppResult<()> {
        self.require_user(user_id).await?;
        self.require_visible_post(user_id, post_id).await?;

        let reaction = Reaction {
            id: ObjectId::new(self.id_gen.generate())?,
            kind,
            user_id: user_id.clone(),
            post_id: post_id.clone(),
            created_at: Utc::now(),
        };
        self.reaction_repo.save(&reaction).await?;

        debug!(user_id = %user_id, post_id = %post_id, kind = %reaction.kind, "Added reaction");
        Ok(())
    }

    async fn discard(
        &self,
        user_id: &ObjectId,
        post_id: &ObjectId,
        kind: ReactionKind,
    ) -> AppResult<()> {
        self.require_user(user_id).await?;

        self.reaction_repo.delete(&kind, user_id, post_id).await?;

        debug!(user_id = %user_id, post_id = %post_id, kind = %kind, "Removed reaction");
        Ok(())
    }

    async fn require_user(&self, user_id: &ObjectId) -> AppResult<()> {
        match self.user_repo.find_by_id(user_id).await? {
            Some(user) if user.deleted_at.is_none() => Ok(()),
            _ => Err(AppError::UserNotFound(user_id.to_string())),
        }
    }

    /// The target must exist and be visible; a hidden post reads as missing.
    async fn require_visible_post(&self, user_id: &ObjectId, post_id: &ObjectId) -> AppResult<()> {
        if self.visibility.is_visible_to(Some(user_id), post_id).await? {
            Ok(())
        } else {
            Err(AppError::PostNotFound(post_id.to_string()))
        }
    }
}

fn emoji_kind(emoji: &str) -> AppResult<ReactionKind> {
    if emoji.trim().is_empty() {
        return Err(AppError::Validation("Emoji must not be empty".to_string()));
    }
    Ok(ReactionKind::Emoji(emoji.to_string()))
}
