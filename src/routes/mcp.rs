//! MCP tool server route configuration.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::mcp::{message_handler, sse_handler};
use crate::state::McpState;

/// Create the MCP tool server router.
///
/// # Endpoints
///
/// - `GET /sse` - establishes a server-push stream; the first event carries
///   the per-session message endpoint.
/// - `POST /messages?sessionId=..` - delivers a JSON-RPC request to the
///   stream it belongs to.
pub fn create_mcp_router() -> Router<Arc<McpState>> {
    Router::new()
        .route("/sse", get(sse_handler))
        .route("/messages", post(message_handler))
        .layer(TraceLayer::new_for_http())
}
