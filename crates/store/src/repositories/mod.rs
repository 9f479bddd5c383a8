//! Repository traits and their in-memory implementations.
//!
//! Services depend on these traits, never on a concrete store, so tests
//! can run against the same in-memory implementations the server uses.

pub mod follow;
pub mod post;
pub mod reaction;
pub mod secret;
pub mod user;

pub use follow::{FollowPosition, FollowRepository, MemoryFollowRepository};
pub use post::{MemoryPostRepository, PostRepository};
pub use reaction::{MemoryReactionRepository, ReactionRepository};
pub use secret::{MemorySecretRepository, SecretRepository};
pub use user::{MemoryUserRepository, UserRepository};
