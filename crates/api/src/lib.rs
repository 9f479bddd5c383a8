//! HTTP API layer for tidepub.
//!
//! This crate is the axum boundary of the application:
//!
//! - **Endpoints**: auth, users, posts, and reactions routers
//! - **Extractors**: required and optional authenticated-caller extractors
//! - **Middleware**: bearer-token resolution into request extensions
//!
//! Handlers translate wire requests into service calls and never contain
//! domain rules of their own; every error reaches the client through the
//! single `AppError` mapping.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
