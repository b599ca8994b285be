//! SSE transport for the MCP tool server.
//!
//! `GET /sse` opens a server-push stream: the first event names the message
//! endpoint (with a per-connection session id), and subsequent `message`
//! events carry JSON-RPC responses. `POST /messages?sessionId=..` delivers a
//! client request to the matching stream. Each connection owns its own
//! channel; sessions are removed when their stream is dropped.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures::Stream;
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::mcp::protocol::{JsonRpcRequest, JsonRpcResponse};
use crate::state::McpState;

/// Buffered responses per connection before `POST /messages` backpressures.
const SESSION_CHANNEL_SIZE: usize = 32;

/// Query string of `POST /messages`.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

/// Removes the session entry when its SSE stream is dropped.
struct SessionGuard {
    session_id: String,
    state: Arc<McpState>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.state.sessions.remove(&self.session_id);
        info!(session_id = self.session_id, "mcp client disconnected");
    }
}

/// Open a server-push stream and register its transport session.
pub async fn sse_handler(
    State(state): State<Arc<McpState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let session_id = Uuid::new_v4().to_string();
    let (tx, mut rx) = mpsc::channel::<JsonRpcResponse>(SESSION_CHANNEL_SIZE);
    state.sessions.insert(session_id.clone(), tx);
    info!(session_id, "mcp client connected");

    let endpoint = format!("/messages?sessionId={session_id}");
    let guard = SessionGuard {
        session_id,
        state: state.clone(),
    };

    let stream = async_stream::stream! {
        let _guard = guard;
        yield Ok(Event::default().event("endpoint").data(endpoint));
        while let Some(response) = rx.recv().await {
            match serde_json::to_string(&response) {
                Ok(json) => yield Ok(Event::default().event("message").data(json)),
                Err(e) => error!("failed to serialize mcp response: {e}"),
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Deliver one client request to the transport session it belongs to.
pub async fn message_handler(
    State(state): State<Arc<McpState>>,
    Query(query): Query<MessageQuery>,
    Json(request): Json<JsonRpcRequest>,
) -> AppResult<StatusCode> {
    let Some(tx) = state
        .sessions
        .get(&query.session_id)
        .map(|entry| entry.value().clone())
    else {
        warn!(session_id = query.session_id, "message for unknown session");
        return Err(AppError::SessionNotFound(query.session_id));
    };

    if let Some(response) = state.server.handle(request).await
        && tx.send(response).await.is_err()
    {
        // Stream already gone; the guard will have removed the entry, but a
        // send can race the drop.
        state.sessions.remove(&query.session_id);
        return Err(AppError::SessionGone(query.session_id));
    }

    Ok(StatusCode::ACCEPTED)
}
