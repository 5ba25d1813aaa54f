use std::sync::Arc;

use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::Router;
use chrono::Local;
use stamp_core::transform;
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;

use crate::handlers;
use crate::session::{self, SessionId, SessionRegistry};

/// Server configuration.
pub struct ServerConfig {
    pub port: u16,
    pub max_send_queue: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            max_send_queue: 256,
        }
    }
}

/// Shared application state passed to Axum handlers. The registry is an
/// explicit instance constructed at startup, not ambient global state.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
    pub frame_tx: mpsc::Sender<(SessionId, String)>,
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/api/get", get(handlers::get_echo))
        .route("/api/post", post(handlers::post_echo))
        .route("/api/put", put(handlers::put_echo))
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// Create and start the server. Returns a handle carrying the bound port.
pub async fn start(config: ServerConfig) -> Result<ServerHandle, std::io::Error> {
    let registry = Arc::new(SessionRegistry::new(config.max_send_queue));

    // Frame processing channel
    let (frame_tx, frame_rx) = mpsc::channel::<(SessionId, String)>(1024);

    let echo_registry = Arc::clone(&registry);
    let echo_handle = tokio::spawn(process_frames(frame_rx, echo_registry));

    let state = AppState {
        registry: Arc::clone(&registry),
        frame_tx,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(port = local_addr.port(), "Echo server started");

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    Ok(ServerHandle {
        port: local_addr.port(),
        _server: server_handle,
        _echo: echo_handle,
    })
}

/// Handle returned by `start()` — keeps background tasks alive.
pub struct ServerHandle {
    pub port: u16,
    _server: tokio::task::JoinHandle<()>,
    _echo: tokio::task::JoinHandle<()>,
}

/// WebSocket upgrade handler. Connections are accepted from any origin.
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle a new WebSocket connection.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (session_id, rx) = state.registry.register();
    session::handle_connection(socket, session_id, rx, state.registry, state.frame_tx).await;
}

/// Stamp each inbound text frame and send it back on the same session.
async fn process_frames(
    mut rx: mpsc::Receiver<(SessionId, String)>,
    registry: Arc<SessionRegistry>,
) {
    while let Some((session_id, payload)) = rx.recv().await {
        let reply = transform::stamp_text(&payload, Local::now());
        registry.send_to(&session_id, reply);
    }
}
