//! Storage layer for tidepub.
//!
//! This crate defines the validated value types, the domain records, and
//! the repository traits the service layer is written against, together
//! with in-memory implementations of every repository:
//!
//! - **Values**: [`ObjectId`], [`Username`], [`Nickname`], [`PostContent`], [`Privacy`]
//! - **Entities**: [`User`], [`Post`], [`Follow`], [`Reaction`]
//! - **Repositories**: traits plus `Memory*` implementations

pub mod entities;
pub mod repositories;
pub mod values;

pub use entities::{Follow, Post, Reaction, ReactionKind, User};
pub use repositories::{
    FollowPosition, FollowRepository, MemoryFollowRepository, MemoryPostRepository,
    MemoryReactionRepository, MemorySecretRepository, MemoryUserRepository, PostRepository,
    ReactionRepository, SecretRepository, UserRepository,
};
pub use values::{Nickname, ObjectId, PostContent, Privacy, Username};
