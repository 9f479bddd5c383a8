//! Follow management.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use tidepub_common::{AppError, AppResult, CursorPage, IdGenerator, Paginator};
use tidepub_store::entities::{Follow, User};
use tidepub_store::repositories::{FollowPosition, FollowRepository, UserRepository};
use tidepub_store::values::ObjectId;

/// A follower or followee as presented in listings.
///
/// Carries the user's profile fields plus when the follow edge was made.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUserDto {
    pub id: ObjectId,
    pub username: String,
    pub hostname: Option<String>,
    pub nickname: String,
    pub bio: String,
    pub created_at: DateTime<Utc>,
    /// When the follow edge was created.
    pub follow_at: DateTime<Utc>,
}

/// Which end of a follow edge a listing presents.
#[derive(Clone, Copy, Debug)]
enum EdgeSide {
    Follower,
    Followee,
}

/// Service for creating, removing, and listing follow relations.
#[derive(Clone)]
pub struct FollowService {
    user_repo: Arc<dyn UserRepository>,
    follow_repo: Arc<dyn FollowRepository>,
    id_gen: IdGenerator,
}

impl FollowService {
    /// Create a new follow service.
    #[must_use]
    pub const fn new(
        user_repo: Arc<dyn UserRepository>,
        follow_repo: Arc<dyn FollowRepository>,
        id_gen: IdGenerator,
    ) -> Self {
        Self {
            user_repo,
            follow_repo,
            id_gen,
        }
    }

    /// Make `follower_id` follow `followee_id`.
    ///
    /// Idempotent: following an already-followed user keeps the original
    /// edge and its timestamp.
    ///
    /// # Errors
    ///
    /// Fails with [`AppError::UserNotFound`] when either user is unknown.
    pub async fn follow(&self, follower_id: &ObjectId, followee_id: &ObjectId) -> AppResult<()> {
        self.require_user(follower_id).await?;
        self.require_user(followee_id).await?;

        let follow = Follow {
            id: ObjectId::new(self.id_gen.generate())?,
            follower_id: follower_id.clone(),
            followee_id: followee_id.clone(),
            created_at: Utc::now(),
        };
        self.follow_repo.save(&follow).await?;

        debug!(follower_id = %follower_id, followee_id = %followee_id, "Followed user");
        Ok(())
    }

    /// Make `follower_id` stop following `followee_id`.
    ///
    /// Idempotent: unfollowing a user who is not followed is a no-op.
    ///
    /// # Errors
    ///
    /// Fails with [`AppError::UserNotFound`] when either user is unknown.
    pub async fn unfollow(&self, follower_id: &ObjectId, followee_id: &ObjectId) -> AppResult<()> {
        self.require_user(follower_id).await?;
        self.require_user(followee_id).await?;

        self.follow_repo.delete(follower_id, followee_id).await?;

        debug!(follower_id = %follower_id, followee_id = %followee_id, "Unfollowed user");
        Ok(())
    }

    /// One page of the users following `user_id`, newest edge first.
    ///
    /// An unknown `user_id` simply yields an empty page.
    pub async fn get_followers(
        &self,
        user_id: &ObjectId,
        limit: usize,
        cursor: Option<String>,
    ) -> AppResult<CursorPage<FollowUserDto>> {
        let repo = Arc::clone(&self.follow_repo);
        let target = user_id.clone();
        let paginator = Paginator::new(
            limit,
            move |fetch_limit, from: Option<FollowPosition>| {
                let repo = Arc::clone(&repo);
                let target = target.clone();
                async move {
                    repo.find_followers(&target, fetch_limit, from.as_ref())
                        .await
                }
            },
            |edge: Follow| FollowPosition::of(&edge),
        );
        let page = paginator.fetch_page(cursor).await?;
        self.hydrate(page, EdgeSide::Follower).await
    }

    /// One page of the users `user_id` follows, newest edge first.
    ///
    /// An unknown `user_id` simply yields an empty page.
    pub async fn get_following(
        &self,
        user_id: &ObjectId,
        limit: usize,
        cursor: Option<String>,
    ) -> AppResult<CursorPage<FollowUserDto>> {
        let repo = Arc::clone(&self.follow_repo);
        let target = user_id.clone();
        let paginator = Paginator::new(
            limit,
            move |fetch_limit, from: Option<FollowPosition>| {
                let repo = Arc::clone(&repo);
                let target = target.clone();
                async move {
                    repo.find_following(&target, fetch_limit, from.as_ref())
                        .await
                }
            },
            |edge: Follow| FollowPosition::of(&edge),
        );
        let page = paginator.fetch_page(cursor).await?;
        self.hydrate(page, EdgeSide::Followee).await
    }

    /// Replace each edge in a page with the profile on the requested side.
    async fn hydrate(
        &self,
        page: CursorPage<Follow>,
        side: EdgeSide,
    ) -> AppResult<CursorPage<FollowUserDto>> {
        let mut items = Vec::with_capacity(page.items.len());
        for edge in page.items {
            let user_id = match side {
                EdgeSide::Follower => &edge.follower_id,
                EdgeSide::Followee => &edge.followee_id,
            };
            // An edge pointing at a user that is gone means the store is
            // inconsistent, not that the client asked for something bad.
            let user = self.user_repo.find_by_id(user_id).await?.ok_or_else(|| {
                AppError::Storage(format!(
                    "Follow edge {} references missing user {user_id}",
                    edge.id
                ))
            })?;
            items.push(Self::to_dto(user, edge.created_at));
        }
        Ok(CursorPage {
            items,
            next_cursor: page.next_cursor,
        })
    }

    fn to_dto(user: User, follow_at: DateTime<Utc>) -> FollowUserDto {
        FollowUserDto {
            id: user.id,
            username: user.username.into(),
            hostname: user.hostname,
            nickname: user.nickname.into(),
            bio: user.bio,
            created_at: user.created_at,
            follow_at,
        }
    }

    async fn require_user(&self, user_id: &ObjectId) -> AppResult<()> {
        match self.user_repo.find_by_id(user_id).await? {
            Some(user) if user.deleted_at.is_none() => Ok(()),
            _ => Err(AppError::UserNotFound(user_id.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tidepub_store::repositories::{MemoryFollowRepository, MemoryUserRepository};
    use tidepub_store::values::{Nickname, Username};

    fn oid(ch: char) -> ObjectId {
        ObjectId::new(ch.to_string().repeat(32)).unwrap()
    }

    fn create_test_user(id: char, username: &str) -> User {
        User {
            id: oid(id),
            username: Username::new(username).unwrap(),
            hostname: None,
            password_hash: Some("hash".to_string()),
            nickname: Nickname::new(username).unwrap(),
            bio: String::new(),
            url: None,
            public_key: None,
            private_key: None,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    struct Fixture {
        service: FollowService,
        users: Arc<MemoryUserRepository>,
        follows: Arc<MemoryFollowRepository>,
    }

    fn fixture() -> Fixture {
        let users = Arc::new(MemoryUserRepository::new());
        let follows = Arc::new(MemoryFollowRepository::new());
        let service = FollowService::new(users.clone(), follows.clone(), IdGenerator::new());
        Fixture {
            service,
            users,
            follows,
        }
    }

    async fn seed_user(fx: &Fixture, id: char, username: &str) {
        fx.users.save(&create_test_user(id, username)).await.unwrap();
    }

    async fn seed_edge(fx: &Fixture, id: char, follower: char, followee: char, at: DateTime<Utc>) {
        fx.follows
            .save(&Follow {
                id: oid(id),
                follower_id: oid(follower),
                followee_id: oid(followee),
                created_at: at,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_follow_creates_edge() {
        let fx = fixture();
        seed_user(&fx, 'a', "alice").await;
        seed_user(&fx, 'b', "bob").await;

        fx.service.follow(&oid('b'), &oid('a')).await.unwrap();

        assert!(fx.follows.is_following(&oid('b'), &oid('a')).await.unwrap());
        assert!(!fx.follows.is_following(&oid('a'), &oid('b')).await.unwrap());
    }

    #[tokio::test]
    async fn test_follow_is_idempotent() {
        let fx = fixture();
        seed_user(&fx, 'a', "alice").await;
        seed_user(&fx, 'b', "bob").await;

        fx.service.follow(&oid('b'), &oid('a')).await.unwrap();
        fx.service.follow(&oid('b'), &oid('a')).await.unwrap();

        let page = fx.service.get_followers(&oid('a'), 10, None).await.unwrap();
        assert_eq!(page.items.len(), 1);
    }

    #[tokio::test]
    async fn test_follow_unknown_followee() {
        let fx = fixture();
        seed_user(&fx, 'b', "bob").await;

        let result = fx.service.follow(&oid('b'), &oid('a')).await;

        match result {
            Err(AppError::UserNotFound(_)) => {}
            other => panic!("Expected UserNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_follow_unknown_follower() {
        let fx = fixture();
        seed_user(&fx, 'a', "alice").await;

        let result = fx.service.follow(&oid('b'), &oid('a')).await;

        match result {
            Err(AppError::UserNotFound(_)) => {}
            other => panic!("Expected UserNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_self_follow_is_allowed() {
        let fx = fixture();
        seed_user(&fx, 'a', "alice").await;

        fx.service.follow(&oid('a'), &oid('a')).await.unwrap();

        assert!(fx.follows.is_following(&oid('a'), &oid('a')).await.unwrap());
    }

    #[tokio::test]
    async fn test_unfollow_removes_edge() {
        let fx = fixture();
        seed_user(&fx, 'a', "alice").await;
        seed_user(&fx, 'b', "bob").await;
        fx.service.follow(&oid('b'), &oid('a')).await.unwrap();

        fx.service.unfollow(&oid('b'), &oid('a')).await.unwrap();

        assert!(!fx.follows.is_following(&oid('b'), &oid('a')).await.unwrap());
    }

    #[tokio::test]
    async fn test_unfollow_without_edge_is_ok() {
        let fx = fixture();
        seed_user(&fx, 'a', "alice").await;
        seed_user(&fx, 'b', "bob").await;

        assert!(fx.service.unfollow(&oid('b'), &oid('a')).await.is_ok());
    }

    #[tokio::test]
    async fn test_followers_are_hydrated_newest_first() {
        let fx = fixture();
        seed_user(&fx, 'a', "alice").await;
        seed_user(&fx, 'b', "bob").await;
        seed_user(&fx, 'c', "carol").await;
        let base = Utc::now();
        seed_edge(&fx, '1', 'b', 'a', base).await;
        seed_edge(&fx, '2', 'c', 'a', base + Duration::seconds(1)).await;

        let page = fx.service.get_followers(&oid('a'), 10, None).await.unwrap();

        assert_eq!(page.items.len(), 2);
        assert!(page.next_cursor.is_none());
        assert_eq!(page.items[0].username, "carol");
        assert_eq!(page.items[0].follow_at, base + Duration::seconds(1));
        assert_eq!(page.items[1].username, "bob");
    }

    #[tokio::test]
    async fn test_followers_paginate_without_loss() {
        let fx = fixture();
        seed_user(&fx, 'a', "alice").await;
        let base = Utc::now();
        for (i, id) in ['b', 'c', 'd', 'e', 'f'].into_iter().enumerate() {
            seed_user(&fx, id, &format!("user{id}")).await;
            seed_edge(&fx, id, id, 'a', base + Duration::seconds(i as i64)).await;
        }

        let mut seen = Vec::new();
        let mut cursor = None;
        loop {
            let page = fx
                .service
                .get_followers(&oid('a'), 2, cursor)
                .await
                .unwrap();
            assert!(page.items.len() <= 2);
            seen.extend(page.items.iter().map(|u| u.username.clone()));
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        assert_eq!(seen, vec!["userf", "usere", "userd", "userc", "userb"]);
    }

    #[tokio::test]
    async fn test_following_lists_other_side() {
        let fx = fixture();
        seed_user(&fx, 'a', "alice").await;
        seed_user(&fx, 'b', "bob").await;
        fx.service.follow(&oid('a'), &oid('b')).await.unwrap();

        let page = fx.service.get_following(&oid('a'), 10, None).await.unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].username, "bob");

        let none = fx.service.get_following(&oid('b'), 10, None).await.unwrap();
        assert!(none.items.is_empty());
    }

    #[tokio::test]
    async fn test_followers_of_unknown_user_is_empty() {
        let fx = fixture();

        let page = fx.service.get_followers(&oid('a'), 10, None).await.unwrap();

        assert!(page.items.is_empty());
        assert!(page.next_cursor.is_none());
    }

    #[tokio::test]
    async fn test_bad_cursor_is_rejected() {
        let fx = fixture();
        seed_user(&fx, 'a', "alice").await;

        let result = fx
            .service
            .get_followers(&oid('a'), 10, Some("spurious".to_string()))
            .await;

        match result {
            Err(AppError::BadCursor) => {}
            other => panic!("Expected BadCursor, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_follow_user_dto_wire_shape() {
        let fx = fixture();
        seed_user(&fx, 'a', "alice").await;
        seed_user(&fx, 'b', "bob").await;
        fx.service.follow(&oid('b'), &oid('a')).await.unwrap();

        let page = fx.service.get_followers(&oid('a'), 10, None).await.unwrap();
        let json = serde_json::to_value(&page.items[0]).unwrap();

        assert_eq!(json["username"], "bob");
        assert_eq!(json["hostname"], serde_json::Value::Null);
        assert!(json.get("followAt").is_some());
        assert!(json.get("createdAt").is_some());
    }
}
