//! Core business logic for tidepub.

pub mod services;

pub use services::*;
