//! Follow entity (follow relationships between users).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::values::ObjectId;

/// A directed follow edge, unique per `(follower_id, followee_id)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follow {
    pub id: ObjectId,

    /// The user who is following
    pub follower_id: ObjectId,

    /// The user being followed
    pub followee_id: ObjectId,

    pub created_at: DateTime<Utc>,
}
