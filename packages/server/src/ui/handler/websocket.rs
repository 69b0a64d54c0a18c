//! WebSocket subscription handler.
//!
//! A session subscribes to the hub, receives the catch-up snapshots and then
//! every delta on its channels as `{"type", "data"}` text frames. Display
//! clients never send anything meaningful; inbound frames only matter for
//! detecting the close.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use serde::Deserialize;

use crate::{
    domain::ChannelSet,
    infrastructure::{dto::websocket::OverlayFrame, message_pusher::SubscriberReceiver},
    ui::state::AppState,
    usecase::{ShutdownSignal, wait_for_shutdown},
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct SubscribeQuery {
    /// Comma separated channel names. Absent or empty means every channel.
    pub channels: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<SubscribeQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let channels = match query.channels.as_deref() {
        Some(list) => ChannelSet::parse_list(list).map_err(|e| {
            tracing::warn!("Rejected subscription: {}", e);
            StatusCode::BAD_REQUEST
        })?,
        None => ChannelSet::all(),
    };

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, channels)))
}

/// Spawns a task that forwards hub events to the WebSocket sender.
///
/// Ends when the subscription queue closes, the client goes away or the
/// shutdown flag is set (a close frame is sent in that case).
fn pusher_loop(
    mut rx: SubscriberReceiver,
    mut sender: SplitSink<WebSocket, Message>,
    mut shutdown: ShutdownSignal,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                event = rx.recv() => match event {
                    Some(event) => event,
                    None => break,
                },
                _ = wait_for_shutdown(&mut shutdown) => {
                    let _ = sender
                        .send(Message::Close(Some(CloseFrame {
                            code: close_code::AWAY,
                            reason: "server shutting down".into(),
                        })))
                        .await;
                    break;
                }
            };

            let json = match OverlayFrame::try_from(event.as_ref()).and_then(|f| f.to_json()) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to serialize '{}' event: {}", event.channel(), e);
                    continue;
                }
            };

            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, channels: ChannelSet) {
    let (sender, mut receiver) = socket.split();

    let subscription = state.hub.subscribe(channels).await;
    let subscriber_id = subscription.id;
    tracing::info!("Subscriber '{}' connected", subscriber_id);

    // Spawn a task to watch for the client going away
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => break,
                Ok(Message::Text(text)) => {
                    tracing::debug!("Ignoring text from subscriber: {}", text);
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!("WebSocket error: {}", e);
                    break;
                }
            }
        }
    });

    let mut send_task = pusher_loop(subscription.receiver, sender, state.shutdown.clone());

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state.hub.unsubscribe(&subscriber_id).await;
    tracing::info!("Subscriber '{}' disconnected", subscriber_id);
}
