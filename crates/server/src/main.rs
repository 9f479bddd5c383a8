//! Tidepub server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::middleware;
use tidepub_api::{middleware::AppState, router as api_router};
use tidepub_common::{Config, IdGenerator};
use tidepub_core::{
    AuthService, FollowService, PostService, ReactionService, UserService, VisibilityService,
};
use tidepub_store::{
    MemoryFollowRepository, MemoryPostRepository, MemoryReactionRepository,
    MemorySecretRepository, MemoryUserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tidepub=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting tidepub server...");

    // Load configuration
    let config = Config::load()?;

    // Initialize repositories. The bundled store is in-memory; everything
    // lives behind the repository traits, so a persistent backend can slot
    // in without touching the services.
    let user_repo = Arc::new(MemoryUserRepository::new());
    let post_repo = Arc::new(MemoryPostRepository::new());
    let follow_repo = Arc::new(MemoryFollowRepository::new());
    let reaction_repo = Arc::new(MemoryReactionRepository::new());
    let secret_repo = Arc::new(MemorySecretRepository::new());

    // Initialize services
    let visibility = VisibilityService::new(
        user_repo.clone(),
        post_repo.clone(),
        follow_repo.clone(),
    );
    let auth_service = AuthService::new(user_repo.clone(), secret_repo, IdGenerator::new());
    let user_service = UserService::new(user_repo.clone());
    let post_service = PostService::new(post_repo, visibility.clone(), IdGenerator::new());
    let follow_service = FollowService::new(user_repo.clone(), follow_repo, IdGenerator::new());
    let reaction_service =
        ReactionService::new(user_repo, reaction_repo, visibility, IdGenerator::new());

    // Create app state
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let state = AppState {
        auth_service,
        user_service,
        post_service,
        follow_service,
        reaction_service,
        pagination: config.pagination,
    };

    // Build router
    let app = api_router()
        .layer(middleware::from_fn_with_state(
            state.clone(),
            tidepub_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
