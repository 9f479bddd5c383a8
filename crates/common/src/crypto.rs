//! Cryptographic utilities for access-token signing.
//!
//! This module provides RSA key generation. The server signs access
//! tokens with RS256, using a keypair generated here and persisted
//! through the secret store.
//!
//! # Examples
//!
//! ```
//! use tidepub_common::crypto::generate_rsa_keypair;
//!
//! // Generate a new key pair
//! let keypair = generate_rsa_keypair().expect("Failed to generate keypair");
//!
//! // The keys are in PEM format
//! assert!(keypair.public_key_pem.contains("BEGIN PUBLIC KEY"));
//! assert!(keypair.private_key_pem.contains("BEGIN PRIVATE KEY"));
//! ```

use rsa::{
    RsaPrivateKey, RsaPublicKey,
    pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding},
};

use crate::{AppError, AppResult};

/// RSA key pair for access-token signing.
///
/// Contains both public and private keys in PEM format, suitable for
/// RS256 signing and verification.
#[derive(Debug, Clone)]
pub struct RsaKeypair {
    /// Public key in PEM format (SPKI encoding).
    pub public_key_pem: String,
    /// Private key in PEM format (PKCS#8 encoding).
    pub private_key_pem: String,
}

/// Default RSA key size (2048 bits).
const RSA_KEY_SIZE: usize = 2048;

/// Generate a new RSA key pair for access-token signing.
///
/// Creates a 2048-bit RSA key pair and returns both keys in PEM format.
/// The private key uses PKCS#8 encoding and the public key uses SPKI encoding.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if:
/// - RSA key generation fails (e.g., insufficient randomness)
/// - PEM encoding fails (should not happen with valid keys)
pub fn generate_rsa_keypair() -> AppResult<RsaKeypair> {
    let mut rng = rand::thread_rng();

    let private_key = RsaPrivateKey::new(&mut rng, RSA_KEY_SIZE)
        .map_err(|e| AppError::Internal(format!("Failed to generate RSA key: {e}")))?;

    let public_key = RsaPublicKey::from(&private_key);

    let private_key_pem = private_key
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| AppError::Internal(format!("Failed to encode private key: {e}")))?
        .to_string();

    let public_key_pem = public_key
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| AppError::Internal(format!("Failed to encode public key: {e}")))?;

    Ok(RsaKeypair {
        public_key_pem,
        private_key_pem,
    })
}
