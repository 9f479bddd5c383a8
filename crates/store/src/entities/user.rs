//! User entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::values::{Nickname, ObjectId, Username};

/// A user account, local or remote.
///
/// Identity is the `(username, hostname)` pair; `id` is a stable surrogate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: ObjectId,

    pub username: Username,

    /// None = local user, Some(host) = remote user
    pub hostname: Option<String>,

    /// Password hash (local users only)
    pub password_hash: Option<String>,

    /// Display name
    pub nickname: Nickname,

    /// Profile description
    pub bio: String,

    /// Profile URL (remote users)
    pub url: Option<String>,

    /// Signing public key, PEM encoded
    pub public_key: Option<String>,

    /// Signing private key, PEM encoded (local users only)
    pub private_key: Option<String>,

    pub created_at: DateTime<Utc>,

    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Whether this account lives on this server.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        self.hostname.is_none()
    }
}
