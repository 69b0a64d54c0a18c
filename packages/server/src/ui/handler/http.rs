//! HTTP API endpoint handlers.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::Channel,
    infrastructure::dto::{
        http::{ChatEventRequest, HealthDto, SnapshotDto},
        websocket::OverlayFrame,
    },
    ui::state::AppState,
};
use butai_shared::time::timestamp_to_rfc3339;

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok".to_string(),
        started_at: timestamp_to_rfc3339(state.started_at),
        subscribers: state.hub.subscriber_count().await,
    })
}

/// Current snapshot of every channel that has one, keyed by channel name
pub async fn get_snapshots(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BTreeMap<String, OverlayFrame>>, StatusCode> {
    let snapshots = state.hub.store().all().await;

    let mut frames = BTreeMap::new();
    for (channel, event) in snapshots {
        let frame = OverlayFrame::try_from(event.as_ref()).map_err(|e| {
            tracing::error!("Failed to serialize '{}' snapshot: {}", channel, e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
        frames.insert(channel.to_string(), frame);
    }

    Ok(Json(frames))
}

/// Current snapshot of one channel
pub async fn get_snapshot(
    State(state): State<Arc<AppState>>,
    Path(channel): Path<String>,
) -> Result<Json<SnapshotDto>, StatusCode> {
    let channel: Channel = channel.parse().map_err(|_| StatusCode::BAD_REQUEST)?;
    let event = state
        .hub
        .store()
        .get(channel)
        .await
        .ok_or(StatusCode::NOT_FOUND)?;

    // Domain Model から DTO への変換
    let frame = OverlayFrame::try_from(event.as_ref()).map_err(|e| {
        tracing::error!("Failed to serialize '{}' snapshot: {}", channel, e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(SnapshotDto {
        channel: channel.to_string(),
        r#type: frame.r#type,
        data: frame.data,
    }))
}

/// Inbound chat event from the chat bridge
pub async fn post_chat_event(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatEventRequest>,
) -> StatusCode {
    let Some(provider) = state.chat_ingest.as_ref() else {
        return StatusCode::SERVICE_UNAVAILABLE;
    };

    let Some(event) = request.into_event() else {
        tracing::warn!("Rejected chat event without an id");
        return StatusCode::BAD_REQUEST;
    };

    if provider.ingest(event) {
        StatusCode::ACCEPTED
    } else {
        tracing::warn!("No chat listener running, event dropped");
        StatusCode::SERVICE_UNAVAILABLE
    }
}
