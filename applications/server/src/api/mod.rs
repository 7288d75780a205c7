/// API routes
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::{DefaultMakeSpan, TraceLayer};

pub mod health;
pub mod storage;
pub mod upload;

/// Build the application router
///
/// The media surface handles its own CORS headers (including the OPTIONS
/// preflight) because they are part of its response contract; no blanket
/// CORS layer is applied.
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/upload", post(upload::upload))
        .route(
            "/storage/:key",
            get(storage::serve_object)
                .delete(storage::delete_object)
                .options(storage::preflight),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .with_state(app_state)
}
