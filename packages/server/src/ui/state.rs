//! Server state shared by the handlers.

use std::sync::Arc;

use crate::{
    infrastructure::{client::WebhookChatProvider, message_pusher::BroadcastHub},
    usecase::ShutdownSignal,
};

/// Shared application state
pub struct AppState {
    /// BroadcastHub（購読者管理とスナップショットの配信）
    pub hub: Arc<BroadcastHub>,
    /// Inbound chat bridge. `None` when chat ingestion is disabled.
    pub chat_ingest: Option<Arc<WebhookChatProvider>>,
    /// Flipped to `true` when the process is shutting down
    pub shutdown: ShutdownSignal,
    /// Unix millis
    pub started_at: i64,
}
