//! Validated value types used throughout the domain model.
//!
//! Each type is immutable after construction and compares by value. The
//! constructors reject malformed input with [`AppError::Validation`], so a
//! value that exists is always well-formed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use tidepub_common::{AppError, AppResult};

/// Opaque entity identifier.
///
/// The canonical form is a 32-character lowercase hex string (a UUID with
/// the hyphens stripped). IDs compare by equality; no ordering is part of
/// the contract, though the derived lexicographic order is used internally
/// as a stable tie-breaker.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(String);

impl ObjectId {
    /// Validate and wrap an identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let canonical = value.len() == 32
            && value
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !canonical {
            return Err(AppError::Validation(
                "ID must be a 32-character lowercase hex string".to_string(),
            ));
        }
        Ok(Self(value))
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ObjectId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ObjectId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Account name, unique per host.
///
/// 3 to 32 characters from `[a-zA-Z0-9_-]`. May not start with a separator
/// and may not contain two separators in a row.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and wrap a username.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.len() < 3 || value.len() > 32 {
            return Err(AppError::Validation(
                "Username must be 3 to 32 characters".to_string(),
            ));
        }
        if !value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        {
            return Err(AppError::Validation(
                "Username may only contain letters, digits, '_' and '-'".to_string(),
            ));
        }
        let is_separator = |b: u8| b == b'_' || b == b'-';
        if value.bytes().next().is_some_and(is_separator) {
            return Err(AppError::Validation(
                "Username must not start with '_' or '-'".to_string(),
            ));
        }
        if value
            .as_bytes()
            .windows(2)
            .any(|pair| is_separator(pair[0]) && is_separator(pair[1]))
        {
            return Err(AppError::Validation(
                "Username must not contain consecutive '_' or '-'".to_string(),
            ));
        }
        Ok(Self(value))
    }

    /// The username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Username {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Username {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Username> for String {
    fn from(username: Username) -> Self {
        username.0
    }
}

/// Display name shown alongside the username.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Nickname(String);

impl Nickname {
    /// Maximum length in characters.
    pub const MAX_CHARS: usize = 128;

    /// Validate and wrap a nickname.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let chars = value.chars().count();
        if chars == 0 || chars > Self::MAX_CHARS {
            return Err(AppError::Validation(format!(
                "Nickname must be 1 to {} characters",
                Self::MAX_CHARS
            )));
        }
        Ok(Self(value))
    }

    /// The nickname as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Nickname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Nickname {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Nickname> for String {
    fn from(nickname: Nickname) -> Self {
        nickname.0
    }
}

/// Body text of a post.
///
/// May be empty but is capped at [`PostContent::MAX_CHARS`] characters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostContent(String);

impl PostContent {
    /// Maximum length in characters.
    pub const MAX_CHARS: usize = 2048;

    /// Validate and wrap post content.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.chars().count() > Self::MAX_CHARS {
            return Err(AppError::Validation(format!(
                "Post content must be at most {} characters",
                Self::MAX_CHARS
            )));
        }
        Ok(Self(value))
    }

    /// The content as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PostContent {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PostContent> for String {
    fn from(content: PostContent) -> Self {
        content.0
    }
}

/// Who may read a post.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    /// Readable by anyone, listed in public feeds.
    Public,
    /// Readable by anyone, excluded from public feeds.
    Unlisted,
    /// Readable by the author's followers.
    Follower,
    /// Readable by the author only.
    Private,
}

impl Privacy {
    /// Whether this level limits the audience to a subset of viewers.
    #[must_use]
    pub const fn is_restricted(self) -> bool {
        matches!(self, Self::Follower | Self::Private)
    }

    /// Lowercase name of the level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Unlisted => "unlisted",
            Self::Follower => "follower",
            Self::Private => "private",
        }
    }
}

impl fmt::Display for Privacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
