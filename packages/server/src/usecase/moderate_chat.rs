//! UseCase: チャットのモデレーション
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ModerateChatUseCase::execute() メソッド
//! - ブロック判定、削除の呼び出し、履歴への追加と配信
//!
//! ### なぜこのテストが必要か
//! - 難読化されたブロック対象語が表示に流れてはいけない
//! - 削除の失敗や設定の欠落でメッセージが表示されてはいけない
//!
//! ### どのような状況を想定しているか
//! - 正常系：許可されたメッセージの配信、ブロックと削除
//! - 異常系：削除の失敗
//! - エッジケース：broadcaster/moderator id 未設定、履歴の容量超過

use std::sync::Arc;

use tokio::{
    sync::{Mutex, broadcast::error::RecvError},
    task::JoinHandle,
};

use butai_shared::time::Clock;

use crate::domain::{
    Blocklist, ChatHistory, ChatMessage, ChatProvider, InboundChatEvent, OverlayEvent,
    OverlayPublisher, Verdict,
};

use super::poller::{ShutdownSignal, wait_for_shutdown};

/// 削除 API を呼び出す際の ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeratorIdentity {
    pub broadcaster_id: String,
    pub moderator_id: String,
}

/// 受信メッセージ 1 件の処理結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationOutcome {
    Accepted,
    Blocked,
}

/// チャットモデレーションのユースケース
///
/// `chat` チャンネルの唯一の書き手。
pub struct ModerateChatUseCase {
    blocklist: Blocklist,
    history: Mutex<ChatHistory>,
    provider: Arc<dyn ChatProvider>,
    publisher: Arc<dyn OverlayPublisher>,
    identity: Option<ModeratorIdentity>,
    clock: Arc<dyn Clock>,
}

impl ModerateChatUseCase {
    pub fn new(
        blocklist: Blocklist,
        history_capacity: usize,
        provider: Arc<dyn ChatProvider>,
        publisher: Arc<dyn OverlayPublisher>,
        identity: Option<ModeratorIdentity>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        if identity.is_none() && !blocklist.is_empty() {
            tracing::warn!(
                "Broadcaster/moderator id not configured: blocked messages will be hidden but not deleted"
            );
        }
        Self {
            blocklist,
            history: Mutex::new(ChatHistory::new(history_capacity)),
            provider,
            publisher,
            identity,
            clock,
        }
    }

    /// 履歴（空でもよい）を publish し、新しい購読者がチャットのスナップショットを受け取れるようにする
    pub async fn publish_history(&self) {
        let history = self.history.lock().await;
        self.publisher
            .publish(OverlayEvent::ChatHistory(history.snapshot()))
            .await;
    }

    /// 受理済みメッセージ（古い順）
    pub async fn history(&self) -> Vec<ChatMessage> {
        self.history.lock().await.snapshot()
    }

    /// 受信メッセージ 1 件を判定
    pub async fn execute(&self, event: InboundChatEvent) -> ModerationOutcome {
        match self.blocklist.evaluate(&event.text) {
            Verdict::Block => {
                tracing::info!("Blocked message '{}' from '{}'", event.id, event.user);
                self.delete_in_background(event.id);
                ModerationOutcome::Blocked
            }
            Verdict::Allow => {
                let message = ChatMessage::from_event(event, self.clock.now_millis());
                // 履歴と配信の順序を揃えるため、配信が終わるまでロックを保持する
                let mut history = self.history.lock().await;
                history.push(message.clone());
                self.publisher
                    .publish_delta(
                        OverlayEvent::ChatHistory(history.snapshot()),
                        OverlayEvent::ChatMessage(message),
                    )
                    .await;
                ModerationOutcome::Accepted
            }
        }
    }

    fn delete_in_background(&self, message_id: String) {
        let Some(identity) = self.identity.clone() else {
            tracing::warn!(
                "Not deleting message '{}': broadcaster/moderator id missing",
                message_id
            );
            return;
        };

        let provider = self.provider.clone();
        tokio::spawn(async move {
            match provider
                .delete_message(&identity.broadcaster_id, &identity.moderator_id, &message_id)
                .await
            {
                Ok(()) => tracing::info!("Deleted message '{}'", message_id),
                Err(e) => tracing::warn!("Failed to delete message '{}': {}", message_id, e),
            }
        });
    }

    /// 受信イベントを購読し、別タスクでシャットダウンかプロバイダの終了まで処理する
    ///
    /// 購読はこの関数が戻る前に済むため、呼び出し直後に届いたイベントも取りこぼさない。
    pub fn spawn_listener(self: Arc<Self>, mut shutdown: ShutdownSignal) -> JoinHandle<()> {
        let mut events = self.provider.subscribe_events();
        tracing::info!("Chat moderation listener started ({} rules)", self.blocklist.len());

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = wait_for_shutdown(&mut shutdown) => break,
                    received = events.recv() => match received {
                        Ok(event) => {
                            self.execute(event).await;
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!("Chat listener lagged, {} events skipped", skipped);
                        }
                        Err(RecvError::Closed) => {
                            tracing::warn!("Chat provider closed its event stream");
                            break;
                        }
                    },
                }
            }

            tracing::info!("Chat moderation listener stopped");
        })
    }
}
