//! Call-handler route configuration.

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::call::call_handler;
use crate::state::AppState;

/// Create the call-handler router.
///
/// # Endpoint
///
/// `GET /google-s2s` - WebSocket upgrade for the voice platform's call
/// control protocol. One connection per call; frames are documented in
/// `handlers::call::messages`.
pub fn create_call_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/google-s2s", get(call_handler))
        .layer(TraceLayer::new_for_http())
}
