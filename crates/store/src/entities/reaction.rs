//! Reaction entities (favorites, bookmarks, emoji reactions).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::values::ObjectId;

/// What kind of reaction a [`Reaction`] records.
///
/// The kind is part of the reaction's identity: a user holds at most one
/// favorite, one bookmark, and one reaction per emoji on a given post.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReactionKind {
    Favorite,
    Bookmark,
    Emoji(String),
}

impl fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Favorite => f.write_str("favorite"),
            Self::Bookmark => f.write_str("bookmark"),
            Self::Emoji(emoji) => write!(f, "emoji({emoji})"),
        }
    }
}

/// A single user-post reaction fact.
///
/// Reactions have no lifecycle beyond creation and deletion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub id: ObjectId,

    pub kind: ReactionKind,

    pub user_id: ObjectId,

    pub post_id: ObjectId,

    pub created_at: DateTime<Utc>,
}
