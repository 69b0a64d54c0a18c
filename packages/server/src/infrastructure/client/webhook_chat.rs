//! Webhook で受信し、Twitch Helix で削除するチャットプロバイダ
//!
//! 受信イベントはチャット接続を持つブリッジから `POST /api/chat/events` に届き、
//! 登録済みのリスナーへ配られる。

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::domain::{ChatError, ChatProvider, InboundChatEvent};

pub const HELIX_MODERATION_CHAT_URL: &str = "https://api.twitch.tv/helix/moderation/chat";

/// Helix モデレーション API の認証情報
#[derive(Debug, Clone)]
pub struct HelixCredentials {
    pub client_id: String,
    pub access_token: String,
}

pub struct WebhookChatProvider {
    events: broadcast::Sender<InboundChatEvent>,
    http: reqwest::Client,
    helix: Option<HelixCredentials>,
    endpoint: String,
}

impl WebhookChatProvider {
    pub fn new(http: reqwest::Client, helix: Option<HelixCredentials>, capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        Self {
            events,
            http,
            helix,
            endpoint: HELIX_MODERATION_CHAT_URL.to_string(),
        }
    }

    /// 受信イベントをリスナーへ渡す。リスナーがいなければ `false`
    pub fn ingest(&self, event: InboundChatEvent) -> bool {
        // 受信者がいないと send() は Err を返す
        self.events.send(event).is_ok()
    }
}

#[async_trait]
impl ChatProvider for WebhookChatProvider {
    fn subscribe_events(&self) -> broadcast::Receiver<InboundChatEvent> {
        self.events.subscribe()
    }

    async fn delete_message(
        &self,
        broadcaster_id: &str,
        moderator_id: &str,
        message_id: &str,
    ) -> Result<(), ChatError> {
        let helix = self.helix.as_ref().ok_or(ChatError::DeleteUnavailable)?;

        let response = self
            .http
            .delete(&self.endpoint)
            .query(&[
                ("broadcaster_id", broadcaster_id),
                ("moderator_id", moderator_id),
                ("message_id", message_id),
            ])
            .header("Client-Id", &helix.client_id)
            .bearer_auth(&helix.access_token)
            .send()
            .await
            .map_err(|e| ChatError::DeleteFailed(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ChatError::DeleteFailed(format!(
                "status {}",
                response.status().as_u16()
            )))
        }
    }
}
