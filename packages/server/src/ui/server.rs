//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    infrastructure::{client::WebhookChatProvider, message_pusher::BroadcastHub},
    usecase::{ShutdownSignal, wait_for_shutdown},
};
use butai_shared::time::get_unix_timestamp_millis;

use super::{
    handler::{get_snapshot, get_snapshots, health_check, post_chat_event, websocket_handler},
    state::AppState,
};

/// Overlay server
///
/// Serves the WebSocket subscription endpoint and the HTTP API until the
/// shutdown flag is set, then drains open connections.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(hub, Some(chat_provider), shutdown_rx);
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    hub: Arc<BroadcastHub>,
    chat_ingest: Option<Arc<WebhookChatProvider>>,
    shutdown: ShutdownSignal,
}

impl Server {
    /// Create a new Server instance
    ///
    /// # Arguments
    ///
    /// * `hub` - Hub the WebSocket sessions subscribe to
    /// * `chat_ingest` - Target of `POST /api/chat/events`, `None` to disable it
    /// * `shutdown` - Shutdown flag shared with the background tasks
    pub fn new(
        hub: Arc<BroadcastHub>,
        chat_ingest: Option<Arc<WebhookChatProvider>>,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            hub,
            chat_ingest,
            shutdown,
        }
    }

    /// Build the router. Exposed so tests can serve it on their own listener.
    pub fn router(&self) -> Router {
        let app_state = Arc::new(AppState {
            hub: self.hub.clone(),
            chat_ingest: self.chat_ingest.clone(),
            shutdown: self.shutdown.clone(),
            started_at: get_unix_timestamp_millis(),
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/snapshots", get(get_snapshots))
            .route("/api/snapshots/{channel}", get(get_snapshot))
            .route("/api/chat/events", post(post_chat_event))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Run the overlay server
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Overlay server listening on {}", listener.local_addr()?);
        tracing::info!("Subscribe at: ws://{}/ws", bind_addr);

        self.serve(listener).await
    }

    /// Serve on an already bound listener until shutdown.
    pub async fn serve(self, listener: TcpListener) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();
        let mut shutdown = self.shutdown;

        axum::serve(listener, app)
            .with_graceful_shutdown(async move { wait_for_shutdown(&mut shutdown).await })
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
