//! Router assembly

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::{time::Duration, SameSite};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::handlers;
use crate::state::AppState;

/// Idle time after which a browser session (and its flashes) is dropped.
const SESSION_IDLE_HOURS: i64 = 1;

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::hours(SESSION_IDLE_HOURS)));

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        // Forms
        .route("/merge", get(handlers::merge_form).post(handlers::merge))
        .route("/split", get(handlers::split_form).post(handlers::split))
        .route("/img2pdf", get(handlers::img2pdf_form).post(handlers::img2pdf))
        .route(
            "/edit_pages",
            get(handlers::edit_pages_form).post(handlers::edit_pages),
        )
        .route(
            "/text_editor",
            get(handlers::text_editor_form).post(handlers::text_editor),
        )
        .route("/text_editor/apply", post(handlers::text_editor_apply))
        .route("/text_editor/:pdf_id", get(handlers::text_editor_resume))
        // Middleware
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
