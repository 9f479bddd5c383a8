//! Registration, login, and access-token handling.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use tidepub_common::{AppError, AppResult, IdGenerator, generate_rsa_keypair};
use tidepub_store::entities::User;
use tidepub_store::repositories::{SecretRepository, UserRepository};
use tidepub_store::values::{Nickname, ObjectId, Username};

/// Secret-store key for the token-signing private key.
const PRIVATE_KEY_NAME: &str = "private_key";
/// Secret-store key for the token-signing public key.
const PUBLIC_KEY_NAME: &str = "public_key";

/// Claims carried by an access token.
///
/// There is no expiry claim; a token stays valid until the signing keys
/// rotate.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// ID of the authenticated user.
    sub: String,
    /// Unix timestamp the token was issued at.
    iat: i64,
}

/// Service for account registration and token-based authentication.
///
/// Tokens are RS256-signed. The signing keypair is generated lazily on the
/// first login and persisted through the secret store, so every instance
/// sharing that store accepts the same tokens.
#[derive(Clone)]
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    secret_repo: Arc<dyn SecretRepository>,
    id_gen: IdGenerator,
}

impl AuthService {
    /// Create a new auth service.
    #[must_use]
    pub const fn new(
        user_repo: Arc<dyn UserRepository>,
        secret_repo: Arc<dyn SecretRepository>,
        id_gen: IdGenerator,
    ) -> Self {
        Self {
            user_repo,
            secret_repo,
            id_gen,
        }
    }

    /// Register a local account and return its ID.
    ///
    /// The nickname defaults to the username when not given. Each account
    /// gets its own RSA keypair for signing outbound activity.
    ///
    /// # Errors
    ///
    /// Fails with [`AppError::Validation`] for a malformed username,
    /// nickname, or empty password, and [`AppError::Conflict`] when the
    /// username is already taken on this server.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        nickname: Option<&str>,
    ) -> AppResult<ObjectId> {
        let username = Username::new(username)?;
        let nickname = Nickname::new(nickname.unwrap_or_else(|| username.as_str()))?;
        if password.is_empty() {
            return Err(AppError::Validation("Password must not be empty".to_string()));
        }

        if self
            .user_repo
            .find_by_username_and_hostname(&username, None)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Username {username} is already taken"
            )));
        }

        let keypair = generate_rsa_keypair()?;
        let user = User {
            id: ObjectId::new(self.id_gen.generate_user_id())?,
            username,
            hostname: None,
            password_hash: Some(hash_password(password)?),
            nickname,
            bio: String::new(),
            url: None,
            public_key: Some(keypair.public_key_pem),
            private_key: Some(keypair.private_key_pem),
            created_at: Utc::now(),
            deleted_at: None,
        };
        self.user_repo.save(&user).await?;

        debug!(user_id = %user.id, username = %user.username, "Registered user");
        Ok(user.id)
    }

    /// Log a local user in and return a signed access token.
    ///
    /// # Errors
    ///
    /// Every failure reads as [`AppError::Unauthorized`]; which part of the
    /// credential pair was wrong is never disclosed.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<String> {
        let username = Username::new(username).map_err(|_| AppError::Unauthorized)?;
        let user = self
            .user_repo
            .find_by_username_and_hostname(&username, None)
            .await?
            .filter(|u| u.deleted_at.is_none())
            .ok_or(AppError::Unauthorized)?;

        // Remote users have no password hash and cannot log in here.
        let hash = user.password_hash.as_deref().ok_or(AppError::Unauthorized)?;
        if !verify_password(password, hash)? {
            return Err(AppError::Unauthorized);
        }

        let (private_pem, _) = self.signing_keys().await?;
        let token = sign_token(&private_pem, &user.id)?;

        debug!(user_id = %user.id, "Issued access token");
        Ok(token)
    }

    /// Resolve an access token to the user it authenticates.
    ///
    /// # Errors
    ///
    /// Fails with [`AppError::Unauthorized`] for a malformed, tampered, or
    /// unverifiable token.
    pub async fn verify_token(&self, token: &str) -> AppResult<ObjectId> {
        // No key material yet means no token was ever issued.
        let public_pem = self
            .secret_repo
            .get(PUBLIC_KEY_NAME)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let claims = decode_token(&public_pem, token)?;
        claims.sub.parse().map_err(|_| AppError::Unauthorized)
    }

    /// The signing keypair, generated and persisted on first use.
    async fn signing_keys(&self) -> AppResult<(String, String)> {
        let private = self.secret_repo.get(PRIVATE_KEY_NAME).await?;
        let public = self.secret_repo.get(PUBLIC_KEY_NAME).await?;
        if let (Some(private), Some(public)) = (private, public) {
            return Ok((private, public));
        }

        let keypair = generate_rsa_keypair()?;
        self.secret_repo
            .set(PRIVATE_KEY_NAME, &keypair.private_key_pem)
            .await?;
        self.secret_repo
            .set(PUBLIC_KEY_NAME, &keypair.public_key_pem)
            .await?;
        debug!("Generated token-signing keypair");
        Ok((keypair.private_key_pem, keypair.public_key_pem))
    }
}

/// Hash a password with Argon2id and a fresh salt.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {e}")))
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn sign_token(private_pem: &str, user_id: &ObjectId) -> AppResult<String> {
    let key = EncodingKey::from_rsa_pem(private_pem.as_bytes())
        .map_err(|e| AppError::Internal(format!("Invalid signing key: {e}")))?;
    let claims = Claims {
        sub: user_id.to_string(),
        iat: Utc::now().timestamp(),
    };

    encode(&Header::new(Algorithm::RS256), &claims, &key)
        .map_err(|e| AppError::Internal(format!("Token signing failed: {e}")))
}

fn decode_token(public_pem: &str, token: &str) -> AppResult<Claims> {
    let key = DecodingKey::from_rsa_pem(public_pem.as_bytes())
        .map_err(|e| AppError::Internal(format!("Invalid verification key: {e}")))?;

    let mut validation = Validation::new(Algorithm::RS256);
    // Tokens carry no exp claim.
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthorized)
}
