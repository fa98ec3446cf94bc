//! WebSocket streaming for real-time telemetry.

use crate::state::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Lifecycle of one streaming subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Streaming,
    Closed,
    Errored,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Connecting => "CONNECTING",
            SessionState::Streaming => "STREAMING",
            SessionState::Closed => "CLOSED",
            SessionState::Errored => "ERRORED",
        };
        f.write_str(name)
    }
}

struct Session {
    id: u64,
    state: SessionState,
}

impl Session {
    fn new() -> Self {
        let session = Self {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            state: SessionState::Connecting,
        };
        tracing::debug!(session = session.id, "Stream session {}", session.state);
        session
    }

    fn transition(&mut self, next: SessionState) {
        match next {
            SessionState::Errored => {
                tracing::warn!(session = self.id, "Stream session {} -> {}", self.state, next)
            }
            _ => tracing::info!(session = self.id, "Stream session {} -> {}", self.state, next),
        }
        self.state = next;
    }
}

/// Handler for WebSocket connections.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> axum::response::Response {
    let session = Session::new();
    let session_id = session.id;
    ws.on_failed_upgrade(move |e| {
        tracing::warn!(
            session = session_id,
            "Stream session {} -> {}: upgrade failed: {}",
            SessionState::Connecting,
            SessionState::Errored,
            e
        );
    })
    .on_upgrade(move |socket| handle_socket(socket, state, session))
    .into_response()
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>, mut session: Session) {
    let mut rx = state.subscribe();
    session.transition(SessionState::Streaming);

    let outcome = loop {
        tokio::select! {
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Ping(payload))) => {
                        if socket.send(Message::Pong(payload)).await.is_err() {
                            break SessionState::Errored;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break SessionState::Closed,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!(session = session.id, "WebSocket receive failed: {}", e);
                        break SessionState::Errored;
                    }
                }
            }
            frame = rx.recv() => {
                match frame {
                    Ok(payload) => {
                        if let Err(e) = socket.send(Message::Text(payload.as_ref().to_owned())).await {
                            tracing::debug!(session = session.id, "WebSocket send failed: {}", e);
                            break SessionState::Errored;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        // Drop missed frames; a newer snapshot is already queued.
                        tracing::debug!(session = session.id, skipped, "Subscriber lagging");
                        continue;
                    }
                    Err(RecvError::Closed) => break SessionState::Closed,
                }
            }
        }
    };

    session.transition(outcome);
}
