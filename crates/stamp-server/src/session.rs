use std::sync::Arc;

use axum::extract::ws::{Message as WsMessage, WebSocket};
use dashmap::DashMap;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Unique identifier for one open WebSocket connection.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(pub String);

impl Default for SessionId {
    fn default() -> Self {
        Self(format!("sess_{}", Uuid::now_v7()))
    }
}

impl SessionId {
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One open WebSocket connection: its identity and send handle. The
/// registry is the sole owner once inserted.
pub struct Session {
    pub id: SessionId,
    pub tx: mpsc::Sender<String>,
}

/// Registry of currently open WebSocket sessions. Internal synchronization
/// only; callers never take an external lock.
pub struct SessionRegistry {
    sessions: DashMap<SessionId, Session>,
    max_send_queue: usize,
}

impl SessionRegistry {
    pub fn new(max_send_queue: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            max_send_queue,
        }
    }

    /// Register a new session and return its ID plus the receiving end of
    /// its send queue. Inserting an existing ID overwrites the entry.
    pub fn register(&self) -> (SessionId, mpsc::Receiver<String>) {
        let id = SessionId::new();
        let (tx, rx) = mpsc::channel(self.max_send_queue);
        self.sessions.insert(id.clone(), Session { id: id.clone(), tx });
        tracing::info!(session_id = %id, "WebSocket session opened");
        (id, rx)
    }

    /// Remove a session by ID. Idempotent: removing an absent ID is a no-op.
    pub fn remove(&self, id: &SessionId) {
        if self.sessions.remove(id).is_some() {
            tracing::info!(session_id = %id, "WebSocket session closed");
        }
    }

    /// Queue a text frame for a specific session. Returns false if the
    /// session is unknown, its queue is full, or its connection is gone.
    /// Never blocks on a slow peer.
    pub fn send_to(&self, id: &SessionId, message: String) -> bool {
        let Some(session) = self.sessions.get(id) else {
            return false;
        };
        match session.tx.try_send(message) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(msg)) => {
                tracing::warn!(session_id = %id, msg_len = msg.len(), "Send queue full, dropping frame");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    /// Number of open sessions. Snapshot under concurrent mutation.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Handle a WebSocket connection: split into reader/writer, forward inbound
/// text frames to `on_frame`, and remove the session from the registry when
/// either side of the connection ends.
pub async fn handle_connection(
    socket: WebSocket,
    session_id: SessionId,
    mut rx: mpsc::Receiver<String>,
    registry: Arc<SessionRegistry>,
    on_frame: mpsc::Sender<(SessionId, String)>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    // Writer task: drain the session's send queue into the socket
    let writer = tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            if ws_tx.send(WsMessage::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    // Reader task: forward inbound text frames for processing
    let reader_sid = session_id.clone();
    let reader = tokio::spawn(async move {
        while let Some(Ok(msg)) = ws_rx.next().await {
            match msg {
                WsMessage::Text(text) => {
                    let _ = on_frame.send((reader_sid.clone(), text.to_string())).await;
                }
                WsMessage::Close(_) => break,
                WsMessage::Ping(_) => {} // axum replies automatically
                _ => {}                  // binary frames are unsupported
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = writer => {},
        _ = reader => {},
    }

    registry.remove(&session_id);
}
