//! User profile reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tidepub_common::{AppError, AppResult};
use tidepub_store::entities::User;
use tidepub_store::repositories::UserRepository;
use tidepub_store::values::{ObjectId, Username};

/// A way of naming a user in the API.
///
/// Either a handle (`@name` for a local user, `@name@host` for a remote
/// one) or a bare user ID.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserSpec {
    Handle {
        username: Username,
        hostname: Option<String>,
    },
    Id(ObjectId),
}

impl FromStr for UserSpec {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(handle) = s.strip_prefix('@') else {
            return Ok(Self::Id(s.parse()?));
        };

        let (name, hostname) = match handle.split_once('@') {
            Some((name, host)) => {
                if !is_valid_hostname(host) {
                    return Err(AppError::Validation(format!("Invalid hostname: {host}")));
                }
                (name, Some(host.to_string()))
            }
            None => (handle, None),
        };
        Ok(Self::Handle {
            username: Username::new(name)?,
            hostname,
        })
    }
}

impl fmt::Display for UserSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handle {
                username,
                hostname: Some(host),
            } => write!(f, "@{username}@{host}"),
            Self::Handle {
                username,
                hostname: None,
            } => write!(f, "@{username}"),
            Self::Id(id) => write!(f, "{id}"),
        }
    }
}

fn is_valid_hostname(host: &str) -> bool {
    !host.is_empty()
        && host
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'-' || b == b'_')
}

/// A user profile as presented to API clients.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: ObjectId,
    pub username: String,
    pub hostname: Option<String>,
    pub nickname: String,
    pub bio: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username.into(),
            hostname: user.hostname,
            nickname: user.nickname.into(),
            bio: user.bio,
            created_at: user.created_at,
        }
    }
}

/// Service for resolving user specs and reading profiles.
#[derive(Clone)]
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: Arc<dyn UserRepository>) -> Self {
        Self { user_repo }
    }

    /// Resolve a spec to a user ID.
    ///
    /// A bare ID passes through without an existence check; whether the
    /// user exists is the next read's concern. A handle must resolve.
    ///
    /// # Errors
    ///
    /// Fails with [`AppError::UserNotFound`] for a handle nobody holds.
    pub async fn find_user_id(&self, spec: &UserSpec) -> AppResult<ObjectId> {
        match spec {
            UserSpec::Id(id) => Ok(id.clone()),
            UserSpec::Handle { username, hostname } => {
                let user = self
                    .user_repo
                    .find_by_username_and_hostname(username, hostname.as_deref())
                    .await?
                    .ok_or_else(|| AppError::UserNotFound(spec.to_string()))?;
                Ok(user.id)
            }
        }
    }

    /// Fetch the profile addressed by a [`UserSpec`].
    ///
    /// # Errors
    ///
    /// Fails with [`AppError::UserNotFound`] when no such user exists.
    pub async fn get_user(&self, spec: &UserSpec) -> AppResult<UserDto> {
        let user = match spec {
            UserSpec::Id(id) => self.user_repo.find_by_id(id).await?,
            UserSpec::Handle { username, hostname } => {
                self.user_repo
                    .find_by_username_and_hostname(username, hostname.as_deref())
                    .await?
            }
        };
        let user = user
            .filter(|u| u.deleted_at.is_none())
            .ok_or_else(|| AppError::UserNotFound(spec.to_string()))?;
        Ok(UserDto::from(user))
    }
}
