//! Domain records persisted by the repositories.

pub mod follow;
pub mod post;
pub mod reaction;
pub mod user;

pub use follow::Follow;
pub use post::Post;
pub use reaction::{Reaction, ReactionKind};
pub use user::User;
