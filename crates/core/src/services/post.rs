//! Post composition and lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use tidepub_common::{AppError, AppResult, IdGenerator};
use tidepub_store::entities::Post;
use tidepub_store::repositories::PostRepository;
use tidepub_store::values::{ObjectId, PostContent, Privacy};

use crate::services::visibility::VisibilityService;

/// A fully-shaped request to create a post.
///
/// The variant pins down which combination of fields is present, so the
/// composition rules live in one place ([`CreatePostCmd::from_parts`]) and
/// the rest of the pipeline never re-checks field shapes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CreatePostCmd {
    /// A plain post.
    Normal {
        content: PostContent,
        privacy: Privacy,
    },
    /// A reply to another post.
    Reply {
        content: PostContent,
        privacy: Privacy,
        reply_to_id: ObjectId,
    },
    /// A content-less share of another post.
    Repost {
        privacy: Privacy,
        repost_of_id: ObjectId,
    },
    /// A share with commentary attached.
    Quote {
        content: PostContent,
        privacy: Privacy,
        repost_of_id: ObjectId,
    },
}

impl CreatePostCmd {
    /// Classify raw request fields into a post shape.
    ///
    /// Exactly four combinations are legal: content alone, content plus a
    /// reply target, a repost target alone, and content plus a repost
    /// target. A reply target combined with a repost target, or no content
    /// and no repost target, is rejected.
    ///
    /// # Errors
    ///
    /// [`AppError::InvalidPostFields`] for an illegal combination,
    /// [`AppError::Validation`] for content or IDs that fail parsing.
    pub fn from_parts(
        content: Option<String>,
        privacy: Privacy,
        reply_to_id: Option<String>,
        repost_of_id: Option<String>,
    ) -> AppResult<Self> {
        match (content, reply_to_id, repost_of_id) {
            (Some(content), None, None) => Ok(Self::Normal {
                content: PostContent::new(content)?,
                privacy,
            }),
            (Some(content), Some(reply_to_id), None) => Ok(Self::Reply {
                content: PostContent::new(content)?,
                privacy,
                reply_to_id: reply_to_id.parse()?,
            }),
            (None, None, Some(repost_of_id)) => Ok(Self::Repost {
                privacy,
                repost_of_id: repost_of_id.parse()?,
            }),
            (Some(content), None, Some(repost_of_id)) => Ok(Self::Quote {
                content: PostContent::new(content)?,
                privacy,
                repost_of_id: repost_of_id.parse()?,
            }),
            _ => Err(AppError::InvalidPostFields),
        }
    }

    /// The requested audience of the post.
    #[must_use]
    pub const fn privacy(&self) -> Privacy {
        match self {
            Self::Normal { privacy, .. }
            | Self::Reply { privacy, .. }
            | Self::Repost { privacy, .. }
            | Self::Quote { privacy, .. } => *privacy,
        }
    }
}

/// A post as presented to API clients.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDto {
    pub id: ObjectId,
    pub url: Option<String>,
    pub author_id: ObjectId,
    pub created_at: DateTime<Utc>,
    pub content: Option<String>,
    pub privacy: Privacy,
    pub reply_to_id: Option<ObjectId>,
    pub repost_of_id: Option<ObjectId>,
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            url: post.url,
            author_id: post.author_id,
            created_at: post.created_at,
            content: post.content.map(Into::into),
            privacy: post.privacy,
            reply_to_id: post.reply_to_id,
            repost_of_id: post.repost_of_id,
        }
    }
}

/// Result of a successful post creation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedPost {
    pub id: ObjectId,
}

/// Which referenced post a validation failure is about.
#[derive(Clone, Copy, Debug)]
enum TargetKind {
    Reply,
    Repost,
}

impl TargetKind {
    fn not_found(self, id: &ObjectId) -> AppError {
        match self {
            Self::Reply => AppError::ReplyTargetNotFound(id.to_string()),
            Self::Repost => AppError::RepostTargetNotFound(id.to_string()),
        }
    }

    fn not_visible(self, id: &ObjectId) -> AppError {
        match self {
            Self::Reply => AppError::ReplyTargetNotVisible(id.to_string()),
            Self::Repost => AppError::RepostTargetNotVisible(id.to_string()),
        }
    }
}

/// Service for creating, reading, and deleting posts.
#[derive(Clone)]
pub struct PostService {
    post_repo: Arc<dyn PostRepository>,
    visibility: VisibilityService,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub const fn new(
        post_repo: Arc<dyn PostRepository>,
        visibility: VisibilityService,
        id_gen: IdGenerator,
    ) -> Self {
        Self {
            post_repo,
            visibility,
            id_gen,
        }
    }

    /// Create a post on behalf of `author_id`.
    ///
    /// Referenced posts are validated in order: a reply target must exist
    /// and be visible to the author, then a repost target must exist and be
    /// visible, and finally a content-less repost must be public on both
    /// sides. The post is only stored once every check passes.
    pub async fn create(&self, author_id: &ObjectId, cmd: CreatePostCmd) -> AppResult<CreatedPost> {
        self.validate(author_id, &cmd).await?;

        let id = ObjectId::new(self.id_gen.generate())?;
        let now = Utc::now();
        let post = match cmd {
            CreatePostCmd::Normal { content, privacy } => Post::new(
                id.clone(),
                author_id.clone(),
                Some(content),
                privacy,
                now,
            ),
            CreatePostCmd::Reply {
                content,
                privacy,
                reply_to_id,
            } => Post::new(
                id.clone(),
                author_id.clone(),
                Some(content),
                privacy,
                now,
            )
            .with_reply_to(reply_to_id),
            CreatePostCmd::Repost {
                privacy,
                repost_of_id,
            } => {
                Post::new(id.clone(), author_id.clone(), None, privacy, now)
                    .with_repost_of(repost_of_id)
            }
            CreatePostCmd::Quote {
                content,
                privacy,
                repost_of_id,
            } => Post::new(
                id.clone(),
                author_id.clone(),
                Some(content),
                privacy,
                now,
            )
            .with_repost_of(repost_of_id),
        };
        self.post_repo.save(&post).await?;

        debug!(post_id = %post.id, author_id = %author_id, privacy = %post.privacy, "Created post");
        Ok(CreatedPost { id })
    }

    /// Fetch a post as seen by `viewer_id`.
    ///
    /// # Errors
    ///
    /// Fails with [`AppError::PostNotFound`] when the post does not exist
    /// or is hidden from this viewer; the two cases are indistinguishable
    /// to the caller.
    pub async fn fetch_post(
        &self,
        viewer_id: Option<&ObjectId>,
        post_id: &ObjectId,
    ) -> AppResult<PostDto> {
        let post = match self.post_repo.find_by_id(post_id).await? {
            Some(post) if !post.is_deleted() => post,
            _ => return Err(AppError::PostNotFound(post_id.to_string())),
        };
        if !self.visibility.is_visible_to(viewer_id, post_id).await? {
            return Err(AppError::PostNotFound(post_id.to_string()));
        }
        Ok(PostDto::from(post))
    }

    /// Soft-delete a post on behalf of `actor_id`.
    ///
    /// # Errors
    ///
    /// Fails with [`AppError::PostNotFound`] when the post does not exist
    /// (or was already deleted) and [`AppError::Forbidden`] when the actor
    /// is not the author.
    pub async fn delete_post(&self, actor_id: &ObjectId, post_id: &ObjectId) -> AppResult<()> {
        if !self.visibility.is_allowed_to_delete(actor_id, post_id).await? {
            return Err(AppError::Forbidden(
                "Only the author can delete a post".to_string(),
            ));
        }

        let Some(mut post) = self.post_repo.find_by_id(post_id).await? else {
            return Err(AppError::PostNotFound(post_id.to_string()));
        };
        post.delete(Utc::now());
        self.post_repo.update(&post).await?;

        debug!(post_id = %post_id, actor_id = %actor_id, "Deleted post");
        Ok(())
    }

    /// Check the command's references against what the author may use.
    async fn validate(&self, author_id: &ObjectId, cmd: &CreatePostCmd) -> AppResult<()> {
        match cmd {
            CreatePostCmd::Normal { .. } => Ok(()),
            CreatePostCmd::Reply { reply_to_id, .. } => {
                self.require_usable(author_id, reply_to_id, TargetKind::Reply)
                    .await?;
                Ok(())
            }
            CreatePostCmd::Repost {
                privacy,
                repost_of_id,
            } => {
                let target = self
                    .require_usable(author_id, repost_of_id, TargetKind::Repost)
                    .await?;
                // A repost reaches an audience the target's author never
                // chose, so neither side may be restricted.
                if privacy.is_restricted() || target.privacy.is_restricted() {
                    return Err(AppError::BadRepostPrivacy);
                }
                Ok(())
            }
            CreatePostCmd::Quote { repost_of_id, .. } => {
                self.require_usable(author_id, repost_of_id, TargetKind::Repost)
                    .await?;
                Ok(())
            }
        }
    }

    /// Load a referenced post and confirm the author may see it.
    async fn require_usable(
        &self,
        author_id: &ObjectId,
        target_id: &ObjectId,
        kind: TargetKind,
    ) -> AppResult<Post> {
        let target = match self.post_repo.find_by_id(target_id).await? {
            Some(post) if !post.is_deleted() => post,
            _ => return Err(kind.not_found(target_id)),
        };
        if self
            .visibility
            .is_visible_to(Some(author_id), target_id)
            .await?
        {
            Ok(target)
        } else {
            Err(kind.not_visible(target_id))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tidepub_store::entities::Follow;
    use tidepub_store::repositories::{
        FollowRepository, MemoryFollowRepository, MemoryPostRepository, MemoryUserRepository,
    };

    fn oid(ch: char) -> ObjectId {
        ObjectId::new(ch.to_string().repeat(32)).unwrap()
    }

    struct Fixture {
        service: PostService,
        posts: Arc<MemoryPostRepository>,
        follows: Arc<MemoryFollowRepository>,
    }

    fn fixture() -> Fixture {
        let users = Arc::new(MemoryUserRepository::new());
        let posts = Arc::new(MemoryPostRepository::new());
        let follows = Arc::new(MemoryFollowRepository::new());
        let visibility = VisibilityService::new(users, posts.clone(), follows.clone());
        let service = PostService::new(posts.clone(), visibility, IdGenerator::new());
        Fixture {
            service,
            posts,
            follows,
        }
    }

    async fn follow(fx: &Fixture, id: char, follower: char, followee: char) {
        fx.follows
            .save(&Follow {
                id: oid(id),
                follower_id: oid(follower),
                followee_id: oid(followee),
                created_at: Utc::now(),
            })
            .await
            .unwrap();
    }

    async fn seed_post(fx: &Fixture, id: char, author: char, privacy: Privacy) {
        let post = Post::new(
            oid(id),
            oid(author),
            Some(PostContent::new("seed").unwrap()),
            privacy,
            Utc::now(),
        );
        fx.posts.save(&post).await.unwrap();
    }

    fn normal(content: &str, privacy: Privacy) -> CreatePostCmd {
        CreatePostCmd::Normal {
            content: PostContent::new(content).unwrap(),
            privacy,
        }
    }

    #[tokio::test]
    async fn test_create_normal_post() {
        let fx = fixture();

        let created = fx
            .service
            .create(&oid('a'), normal("hello world", Privacy::Public))
            .await
            .unwrap();

        let saved = fx.posts.find_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(saved.author_id, oid('a'));
        assert_eq!(saved.privacy, Privacy::Public);
        assert_eq!(saved.content.unwrap().as_str(), "hello world");
        assert_eq!(saved.reply_to_id, None);
        assert_eq!(saved.repost_of_id, None);
    }

    #[tokio::test]
    async fn test_create_reply() {
        let fx = fixture();
        seed_post(&fx, '1', 'a', Privacy::Public).await;

        let cmd = CreatePostCmd::Reply {
            content: PostContent::new("replying").unwrap(),
            privacy: Privacy::Public,
            reply_to_id: oid('1'),
        };
        let created = fx.service.create(&oid('b'), cmd).await.unwrap();

        let saved = fx.posts.find_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(saved.reply_to_id, Some(oid('1')));
    }

    #[tokio::test]
    async fn test_reply_to_missing_post() {
        let fx = fixture();

        let cmd = CreatePostCmd::Reply {
            content: PostContent::new("replying").unwrap(),
            privacy: Privacy::Public,
            reply_to_id: oid('1'),
        };
        let result = fx.service.create(&oid('b'), cmd).await;

        match result {
            Err(AppError::ReplyTargetNotFound(_)) => {}
            other => panic!("Expected ReplyTargetNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_reply_to_invisible_post() {
        let fx = fixture();
        seed_post(&fx, '1', 'a', Privacy::Follower).await;

        let cmd = CreatePostCmd::Reply {
            content: PostContent::new("replying").unwrap(),
            privacy: Privacy::Public,
            reply_to_id: oid('1'),
        };
        let result = fx.service.create(&oid('b'), cmd).await;

        match result {
            Err(AppError::ReplyTargetNotVisible(_)) => {}
            other => panic!("Expected ReplyTargetNotVisible, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_reply_to_follower_post_as_follower() {
        let fx = fixture();
        seed_post(&fx, '1', 'a', Privacy::Follower).await;
        follow(&fx, '9', 'b', 'a').await;

        let cmd = CreatePostCmd::Reply {
            content: PostContent::new("replying").unwrap(),
            privacy: Privacy::Public,
            reply_to_id: oid('1'),
        };
        assert!(fx.service.create(&oid('b'), cmd).await.is_ok());
    }

    #[tokio::test]
    async fn test_repost_public_post() {
        let fx = fixture();
        seed_post(&fx, '1', 'a', Privacy::Public).await;

        let cmd = CreatePostCmd::Repost {
            privacy: Privacy::Public,
            repost_of_id: oid('1'),
        };
        let created = fx.service.create(&oid('b'), cmd).await.unwrap();

        let saved = fx.posts.find_by_id(&created.id).await.unwrap().unwrap();
        assert!(saved.is_pure_repost());
        assert_eq!(saved.repost_of_id, Some(oid('1')));
        assert_eq!(saved.content, None);
    }

    #[tokio::test]
    async fn test_repost_of_missing_post() {
        let fx = fixture();

        let cmd = CreatePostCmd::Repost {
            privacy: Privacy::Public,
            repost_of_id: oid('1'),
        };
        let result = fx.service.create(&oid('b'), cmd).await;

        match result {
            Err(AppError::RepostTargetNotFound(_)) => {}
            other => panic!("Expected RepostTargetNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_restricted_repost_of_public_post() {
        let fx = fixture();
        seed_post(&fx, '1', 'a', Privacy::Public).await;

        for privacy in [Privacy::Follower, Privacy::Private] {
            let cmd = CreatePostCmd::Repost {
                privacy,
                repost_of_id: oid('1'),
            };
            let result = fx.service.create(&oid('b'), cmd).await;

            match result {
                Err(AppError::BadRepostPrivacy) => {}
                other => panic!("Expected BadRepostPrivacy for {privacy}, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_repost_of_restricted_post_visible_to_author() {
        let fx = fixture();
        seed_post(&fx, '1', 'a', Privacy::Follower).await;
        // b follows a, so the target is visible and the failure is about
        // privacy rather than visibility.
        follow(&fx, '9', 'b', 'a').await;

        let cmd = CreatePostCmd::Repost {
            privacy: Privacy::Public,
            repost_of_id: oid('1'),
        };
        let result = fx.service.create(&oid('b'), cmd).await;

        match result {
            Err(AppError::BadRepostPrivacy) => {}
            other => panic!("Expected BadRepostPrivacy, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_repost_of_invisible_post_stays_hidden() {
        let fx = fixture();
        seed_post(&fx, '1', 'a', Privacy::Follower).await;

        let cmd = CreatePostCmd::Repost {
            privacy: Privacy::Public,
            repost_of_id: oid('1'),
        };
        let result = fx.service.create(&oid('b'), cmd).await;

        match result {
            Err(AppError::RepostTargetNotVisible(_)) => {}
            other => panic!("Expected RepostTargetNotVisible, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_quote_of_follower_post_is_allowed() {
        let fx = fixture();
        seed_post(&fx, '1', 'a', Privacy::Follower).await;
        follow(&fx, '9', 'b', 'a').await;

        // Quoting attaches commentary, so the repost privacy rule does not
        // apply; visibility still does.
        let cmd = CreatePostCmd::Quote {
            content: PostContent::new("look at this").unwrap(),
            privacy: Privacy::Follower,
            repost_of_id: oid('1'),
        };
        assert!(fx.service.create(&oid('b'), cmd).await.is_ok());
    }

    #[tokio::test]
    async fn test_quote_of_invisible_post() {
        let fx = fixture();
        seed_post(&fx, '1', 'a', Privacy::Private).await;

        let cmd = CreatePostCmd::Quote {
            content: PostContent::new("look at this").unwrap(),
            privacy: Privacy::Public,
            repost_of_id: oid('1'),
        };
        let result = fx.service.create(&oid('b'), cmd).await;

        match result {
            Err(AppError::RepostTargetNotVisible(_)) => {}
            other => panic!("Expected RepostTargetNotVisible, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_post_returns_dto() {
        let fx = fixture();
        seed_post(&fx, '1', 'a', Privacy::Public).await;

        let dto = fx.service.fetch_post(None, &oid('1')).await.unwrap();

        assert_eq!(dto.id, oid('1'));
        assert_eq!(dto.author_id, oid('a'));
        assert_eq!(dto.content.as_deref(), Some("seed"));
        assert_eq!(dto.privacy, Privacy::Public);
    }

    #[tokio::test]
    async fn test_fetch_hides_invisible_post() {
        let fx = fixture();
        seed_post(&fx, '1', 'a', Privacy::Private).await;

        let result = fx.service.fetch_post(Some(&oid('b')), &oid('1')).await;

        match result {
            Err(AppError::PostNotFound(_)) => {}
            other => panic!("Expected PostNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_missing_post() {
        let fx = fixture();

        let result = fx.service.fetch_post(None, &oid('1')).await;

        match result {
            Err(AppError::PostNotFound(_)) => {}
            other => panic!("Expected PostNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_post_by_author() {
        let fx = fixture();
        seed_post(&fx, '1', 'a', Privacy::Public).await;

        fx.service.delete_post(&oid('a'), &oid('1')).await.unwrap();

        let result = fx.service.fetch_post(Some(&oid('a')), &oid('1')).await;
        match result {
            Err(AppError::PostNotFound(_)) => {}
            other => panic!("Expected PostNotFound after delete, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_post_by_stranger() {
        let fx = fixture();
        seed_post(&fx, '1', 'a', Privacy::Public).await;

        let result = fx.service.delete_post(&oid('b'), &oid('1')).await;

        match result {
            Err(AppError::Forbidden(_)) => {}
            other => panic!("Expected Forbidden, got {other:?}"),
        }
        // The post is untouched.
        assert!(fx.service.fetch_post(None, &oid('1')).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let fx = fixture();
        seed_post(&fx, '1', 'a', Privacy::Public).await;

        fx.service.delete_post(&oid('a'), &oid('1')).await.unwrap();
        let result = fx.service.delete_post(&oid('a'), &oid('1')).await;

        match result {
            Err(AppError::PostNotFound(_)) => {}
            other => panic!("Expected PostNotFound on second delete, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_reply_to_deleted_post() {
        let fx = fixture();
        seed_post(&fx, '1', 'a', Privacy::Public).await;
        fx.service.delete_post(&oid('a'), &oid('1')).await.unwrap();

        let cmd = CreatePostCmd::Reply {
            content: PostContent::new("replying").unwrap(),
            privacy: Privacy::Public,
            reply_to_id: oid('1'),
        };
        let result = fx.service.create(&oid('b'), cmd).await;

        match result {
            Err(AppError::ReplyTargetNotFound(_)) => {}
            other => panic!("Expected ReplyTargetNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_from_parts_shapes() {
        let id = oid('1').to_string();

        let cmd = CreatePostCmd::from_parts(
            Some("hi".to_string()),
            Privacy::Public,
            None,
            None,
        )
        .unwrap();
        assert!(matches!(cmd, CreatePostCmd::Normal { .. }));

        let cmd = CreatePostCmd::from_parts(
            Some("hi".to_string()),
            Privacy::Public,
            Some(id.clone()),
            None,
        )
        .unwrap();
        assert!(matches!(cmd, CreatePostCmd::Reply { .. }));

        let cmd =
            CreatePostCmd::from_parts(None, Privacy::Public, None, Some(id.clone())).unwrap();
        assert!(matches!(cmd, CreatePostCmd::Repost { .. }));

        let cmd =
            CreatePostCmd::from_parts(Some("hi".to_string()), Privacy::Public, None, Some(id))
                .unwrap();
        assert!(matches!(cmd, CreatePostCmd::Quote { .. }));
    }

    #[test]
    fn test_from_parts_rejects_bad_shapes() {
        let id = oid('1').to_string();
        let bad_shapes = [
            // Nothing at all.
            (None, None, None),
            // A reply without content.
            (None, Some(id.clone()), None),
            // A reply and a repost at once.
            (Some("hi".to_string()), Some(id.clone()), Some(id.clone())),
            // A content-less reply to a repost target.
            (None, Some(id.clone()), Some(id.clone())),
        ];

        for (content, reply_to, repost_of) in bad_shapes {
            let result = CreatePostCmd::from_parts(content, Privacy::Public, reply_to, repost_of);
            match result {
                Err(AppError::InvalidPostFields) => {}
                other => panic!("Expected InvalidPostFields, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_from_parts_rejects_overlong_content() {
        let result =
            CreatePostCmd::from_parts(Some("x".repeat(2049)), Privacy::Public, None, None);

        match result {
            Err(AppError::Validation(_)) => {}
            other => panic!("Expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_from_parts_rejects_malformed_ids() {
        let result = CreatePostCmd::from_parts(
            Some("hi".to_string()),
            Privacy::Public,
            Some("not-an-id".to_string()),
            None,
        );

        match result {
            Err(AppError::Validation(_)) => {}
            other => panic!("Expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_post_dto_wire_shape() {
        let post = Post::new(
            oid('1'),
            oid('a'),
            Some(PostContent::new("hi").unwrap()),
            Privacy::Unlisted,
            Utc::now(),
        )
        .with_reply_to(oid('2'));

        let json = serde_json::to_value(PostDto::from(post)).unwrap();

        assert_eq!(json["authorId"], oid('a').to_string());
        assert_eq!(json["replyToId"], oid('2').to_string());
        assert_eq!(json["repostOfId"], serde_json::Value::Null);
        assert_eq!(json["privacy"], "unlisted");
    }
}
