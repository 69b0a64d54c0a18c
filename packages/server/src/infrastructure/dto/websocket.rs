//! WebSocket frame DTOs.
//!
//! Every frame is `{"type": <event>, "data": <payload>}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::OverlayEvent;

/// Event names understood by the display clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    PlaybackInfo,
    PlaybackLyrics,
    StatsInfo,
    ChatHistory,
    ChatMessage,
    SubtextInfo,
    SlidesInfo,
}

/// One outbound frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayFrame {
    pub r#type: MessageType,
    pub data: Value,
}

impl OverlayFrame {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl TryFrom<&OverlayEvent> for OverlayFrame {
    type Error = serde_json::Error;

    fn try_from(event: &OverlayEvent) -> Result<Self, Self::Error> {
        let (r#type, data) = match event {
            OverlayEvent::PlaybackInfo(p) => (MessageType::PlaybackInfo, serde_json::to_value(p)?),
            OverlayEvent::PlaybackLyrics(l) => {
                (MessageType::PlaybackLyrics, serde_json::to_value(l)?)
            }
            OverlayEvent::StatsInfo(s) => (MessageType::StatsInfo, serde_json::to_value(s)?),
            OverlayEvent::ChatHistory(h) => (MessageType::ChatHistory, serde_json::to_value(h)?),
            OverlayEvent::ChatMessage(m) => (MessageType::ChatMessage, serde_json::to_value(m)?),
            OverlayEvent::SubtextInfo(s) => (MessageType::SubtextInfo, serde_json::to_value(s)?),
            OverlayEvent::SlidesInfo(s) => (MessageType::SlidesInfo, serde_json::to_value(s)?),
        };
        Ok(Self { r#type, data })
    }
}
