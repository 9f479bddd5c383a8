//! Post repository.

use async_trait::async_trait;
use std::collections::HashMap;
use tidepub_common::{AppError, AppResult};
use tokio::sync::RwLock;

use crate::entities::Post;
use crate::values::ObjectId;

/// Store of posts.
///
/// Posts are written once and updated only to record a soft-delete; rows
/// are never removed. Soft-deleted posts are still returned by
/// [`PostRepository::find_by_id`], and the read path decides how to
/// present them.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Find a post by ID.
    async fn find_by_id(&self, id: &ObjectId) -> AppResult<Option<Post>>;

    /// Persist a new post.
    async fn save(&self, post: &Post) -> AppResult<()>;

    /// Rewrite an existing post. Used only to record a soft-delete.
    async fn update(&self, post: &Post) -> AppResult<()>;
}

/// In-memory [`PostRepository`].
#[derive(Debug, Default)]
pub struct MemoryPostRepository {
    posts: RwLock<HashMap<ObjectId, Post>>,
}

impl MemoryPostRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostRepository for MemoryPostRepository {
    async fn find_by_id(&self, id: &ObjectId) -> AppResult<Option<Post>> {
        Ok(self.posts.read().await.get(id).cloned())
    }

    async fn save(&self, post: &Post) -> AppResult<()> {
        self.posts
            .write()
            .await
            .insert(post.id.clone(), post.clone());
        Ok(())
    }

    async fn update(&self, post: &Post) -> AppResult<()> {
        let mut posts = self.posts.write().await;
        if !posts.contains_key(&post.id) {
            return Err(AppError::Storage(format!(
                "Cannot update missing post {}",
                post.id
            )));
        }
        posts.insert(post.id.clone(), post.clone());
        Ok(())
    }
}
