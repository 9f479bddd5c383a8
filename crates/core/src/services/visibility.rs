//! Post visibility policy.

use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::debug;

use tidepub_common::{AppError, AppResult};
use tidepub_store::entities::Post;
use tidepub_store::repositories::{FollowRepository, PostRepository, UserRepository};
use tidepub_store::values::{ObjectId, Privacy, Username};

/// Decides who may see, and who may delete, a post.
///
/// Every decision is a pure function of freshly read data; the service
/// holds no state besides its repositories, so concurrent requests never
/// contend on it.
#[derive(Clone)]
pub struct VisibilityService {
    user_repo: Arc<dyn UserRepository>,
    post_repo: Arc<dyn PostRepository>,
    follow_repo: Arc<dyn FollowRepository>,
}

impl VisibilityService {
    /// Create a new visibility service.
    #[must_use]
    pub const fn new(
        user_repo: Arc<dyn UserRepository>,
        post_repo: Arc<dyn PostRepository>,
        follow_repo: Arc<dyn FollowRepository>,
    ) -> Self {
        Self {
            user_repo,
            post_repo,
            follow_repo,
        }
    }

    /// Whether `viewer_id` may read the post. `None` is an anonymous viewer.
    ///
    /// Public and unlisted posts are visible to everyone. Follower posts
    /// require a follow edge from the viewer to the author, private posts
    /// are for the author alone, and either restriction is lifted for a
    /// viewer the post's text mentions by handle. The author always sees
    /// their own post.
    ///
    /// # Errors
    ///
    /// Fails with [`AppError::PostNotFound`] when the post does not exist.
    /// "Does not exist" and "exists but is hidden from this viewer" are
    /// deliberately distinct results here; only the HTTP boundary folds
    /// them together.
    pub async fn is_visible_to(
        &self,
        viewer_id: Option<&ObjectId>,
        post_id: &ObjectId,
    ) -> AppResult<bool> {
        let post = self.load_existing(post_id).await?;

        if viewer_id == Some(&post.author_id) {
            return Ok(true);
        }

        match post.privacy {
            Privacy::Public | Privacy::Unlisted => Ok(true),
            Privacy::Follower | Privacy::Private => {
                let Some(viewer_id) = viewer_id else {
                    return Ok(false);
                };
                if self.is_mentioned(viewer_id, &post).await? {
                    return Ok(true);
                }
                if post.privacy == Privacy::Follower {
                    self.follow_repo
                        .is_following(viewer_id, &post.author_id)
                        .await
                } else {
                    Ok(false)
                }
            }
        }
    }

    /// Whether a follow edge exists from `follower_id` to `followee_id`.
    ///
    /// Exact pair only; there are no transitive or mutual semantics.
    pub async fn is_following(
        &self,
        follower_id: &ObjectId,
        followee_id: &ObjectId,
    ) -> AppResult<bool> {
        self.follow_repo.is_following(follower_id, followee_id).await
    }

    /// Whether `viewer_id` may delete the post. Only the author may.
    ///
    /// # Errors
    ///
    /// Fails with [`AppError::PostNotFound`] when the post does not exist.
    pub async fn is_allowed_to_delete(
        &self,
        viewer_id: &ObjectId,
        post_id: &ObjectId,
    ) -> AppResult<bool> {
        let post = self.load_existing(post_id).await?;
        Ok(*viewer_id == post.author_id)
    }

    /// Load a post, treating soft-deleted posts as missing.
    async fn load_existing(&self, post_id: &ObjectId) -> AppResult<Post> {
        match self.post_repo.find_by_id(post_id).await? {
            Some(post) if !post.is_deleted() => Ok(post),
            _ => Err(AppError::PostNotFound(post_id.to_string())),
        }
    }

    /// Whether the post's text mentions the viewer by handle.
    async fn is_mentioned(&self, viewer_id: &ObjectId, post: &Post) -> AppResult<bool> {
        let Some(content) = post.content.as_ref() else {
            return Ok(false);
        };
        for mention in extract_mentions(content.as_str()) {
            // Handles that cannot be valid usernames resolve to nobody.
            let Ok(username) = Username::new(mention.username) else {
                continue;
            };
            let user = self
                .user_repo
                .find_by_username_and_hostname(&username, mention.hostname.as_deref())
                .await?;
            if user.is_some_and(|u| u.id == *viewer_id) {
                debug!(post_id = %post.id, viewer_id = %viewer_id, "Mention grants visibility");
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// A parsed `@user` or `@user@host` handle.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Mention {
    username: String,
    hostname: Option<String>,
}

#[allow(clippy::unwrap_used)]
static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\B@([a-zA-Z0-9_-]+)(?:@([.a-zA-Z0-9_-]+))?").unwrap());

/// Extract mention handles from post text.
fn extract_mentions(text: &str) -> Vec<Mention> {
    MENTION_RE
        .captures_iter(text)
        .map(|caps| Mention {
            username: caps[1].to_string(),
            hostname: caps.get(2).map(|m| m.as_str().to_string()),
        })
        .collect()
}
