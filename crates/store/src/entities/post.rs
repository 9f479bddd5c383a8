//! Post entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::values::{ObjectId, PostContent, Privacy};

/// A post, possibly a reply to or a repost of another post.
///
/// Posts are immutable once created, with one exception: a post can be
/// soft-deleted through [`Post::delete`]. The deletion timestamp is not
/// otherwise assignable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: ObjectId,

    /// Canonical URL (remote posts only)
    pub url: Option<String>,

    pub author_id: ObjectId,

    /// Body text. None means a pure repost.
    pub content: Option<PostContent>,

    pub privacy: Privacy,

    /// Post this one replies to
    pub reply_to_id: Option<ObjectId>,

    /// Post this one reposts or quotes
    pub repost_of_id: Option<ObjectId>,

    pub created_at: DateTime<Utc>,

    deleted_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Create a post with no reply or repost linkage.
    #[must_use]
    pub const fn new(
        id: ObjectId,
        author_id: ObjectId,
        content: Option<PostContent>,
        privacy: Privacy,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            url: None,
            author_id,
            content,
            privacy,
            reply_to_id: None,
            repost_of_id: None,
            created_at,
            deleted_at: None,
        }
    }

    /// Link this post as a reply to another post.
    #[must_use]
    pub fn with_reply_to(mut self, reply_to_id: ObjectId) -> Self {
        self.reply_to_id = Some(reply_to_id);
        self
    }

    /// Link this post as a repost or quote of another post.
    #[must_use]
    pub fn with_repost_of(mut self, repost_of_id: ObjectId) -> Self {
        self.repost_of_id = Some(repost_of_id);
        self
    }

    /// When this post was soft-deleted, if it was.
    #[must_use]
    pub const fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// Whether this post has been soft-deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Soft-delete this post. The first deletion timestamp sticks.
    pub fn delete(&mut self, at: DateTime<Utc>) {
        if self.deleted_at.is_none() {
            self.deleted_at = Some(at);
        }
    }

    /// Whether this is a contentless repost.
    #[must_use]
    pub const fn is_pure_repost(&self) -> bool {
        self.content.is_none() && self.repost_of_id.is_some()
    }
}
