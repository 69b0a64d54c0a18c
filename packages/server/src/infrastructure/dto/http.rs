//! HTTP API DTOs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::InboundChatEvent;

/// Body of `POST /api/chat/events`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatEventRequest {
    pub id: String,
    pub user: String,
    #[serde(default)]
    pub channel: String,
    pub text: String,
}

impl ChatEventRequest {
    /// Convert into the domain event. A blank id is rejected since the message
    /// could never be deleted.
    pub fn into_event(self) -> Option<InboundChatEvent> {
        if self.id.trim().is_empty() {
            return None;
        }
        Some(InboundChatEvent {
            id: self.id,
            user: self.user,
            channel: self.channel,
            text: self.text,
        })
    }
}

/// Response of `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthDto {
    pub status: String,
    pub started_at: Option<String>,
    pub subscribers: usize,
}

/// Current snapshot of one channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotDto {
    pub channel: String,
    pub r#type: super::websocket::MessageType,
    pub data: Value,
}
