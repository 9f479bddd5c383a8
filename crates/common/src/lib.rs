//! Common utilities and shared types for tidepub.
//!
//! This crate provides foundational components used across all tidepub crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **Cryptography**: RSA key generation for access-token signing
//! - **ID Generation**: UUID-based unique identifiers via [`IdGenerator`]
//! - **Pagination**: Opaque-cursor pagination via [`Paginator`]
//!
//! # Example
//!
//! ```no_run
//! use tidepub_common::{AppResult, Config, IdGenerator};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID: {}", id);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crypto;
pub mod error;
pub mod id;
pub mod pagination;

pub use config::Config;
pub use crypto::{RsaKeypair, generate_rsa_keypair};
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use pagination::{CursorPage, Paginator};
