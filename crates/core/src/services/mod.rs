//! Business logic services.

#![allow(missing_docs)]

pub mod auth;
pub mod follow;
pub mod post;
pub mod reaction;
pub mod user;
pub mod visibility;

pub use auth::AuthService;
pub use follow::{FollowService, FollowUserDto};
pub use post::{CreatePostCmd, CreatedPost, PostDto, PostService};
pub use reaction::ReactionService;
pub use user::{UserDto, UserService, UserSpec};
pub use visibility::VisibilityService;
