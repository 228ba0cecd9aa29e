//! # tb-api
//!
//! The web routing and orchestration layer for Threadboard.

pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::services::ServeFile;

pub use error::ApiError;
pub use handlers::AppState;

/// Knobs the binary passes through from its settings.
#[derive(Debug, Clone, Default)]
pub struct RouterOptions {
    /// Directory holding `board.html` and `thread.html`. `None` disables the
    /// page routes that the create endpoints redirect to.
    pub static_dir: Option<PathBuf>,
    pub cors_origins: Vec<String>,
}

/// Configures the routes for the message board.
///
/// # Developer Note
/// The JSON API lives under `/api`; the `/b/...` pages are plain files that
/// call back into it from the browser.
pub fn configure_routes(state: Arc<AppState>, options: &RouterOptions) -> Router {
    let api = Router::new()
        .route(
            "/threads/{board}",
            get(handlers::list_threads)
                .post(handlers::create_thread)
                .put(handlers::report_thread)
                .delete(handlers::delete_thread),
        )
        .route(
            "/replies/{board}",
            get(handlers::get_thread)
                .post(handlers::create_reply)
                .put(handlers::report_reply)
                .delete(handlers::delete_reply),
        );

    let mut router = Router::new()
        .nest("/api", api)
        .route("/health", get(handlers::health));

    if let Some(dir) = &options.static_dir {
        router = router
            .route_service("/b/{board}", ServeFile::new(dir.join("board.html")))
            .route_service("/b/{board}/{thread_id}", ServeFile::new(dir.join("thread.html")));
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(middleware::standard_middleware())
                .layer(middleware::cors_policy(&options.cors_origins))
                .layer(axum::middleware::from_fn(middleware::security_headers)),
        )
        .with_state(state)
}
