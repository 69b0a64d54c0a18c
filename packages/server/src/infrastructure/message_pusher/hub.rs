//! Broadcast Hub 実装
//!
//! ## 責務
//!
//! - 購読者ごとの送信キュー（[`mailbox`](super::mailbox)）を管理
//! - 購読開始時に、購読チャンネルの現在のスナップショットを送信（キャッチアップ）
//! - publish 時にスナップショットを保存し、該当チャンネルの購読者全員に送信
//!
//! ## 設計ノート
//!
//! 送信は待たない。キューが一杯の購読者には、そのチャンネルの古いイベントを
//! 最新のスナップショットで置き換えて届ける（遅い購読者も最新値に追いつく）。
//! 受信側が閉じている購読者は登録から外す。publisher 側は待たされない。
//!
//! キャッチアップと publish は購読者マップのロックで直列化される。
//! そのため、スナップショットの読み取りと登録の間に publish された更新を取りこぼさない。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{Channel, ChannelSet, OverlayEvent, OverlayPublisher, SnapshotStore};

use super::mailbox::{MailboxSender, PushOutcome, SubscriberReceiver, mailbox};

/// 接続中の購読者の識別子
pub type SubscriberId = Uuid;

/// 登録済みの購読者（ID と送信キューの受信側）
#[derive(Debug)]
pub struct Subscription {
    pub id: SubscriberId,
    pub receiver: SubscriberReceiver,
}

struct SubscriberEntry {
    channels: ChannelSet,
    sender: MailboxSender,
}

/// チャンネル単位の Broadcast Hub
///
/// ## フィールド
///
/// - `store`: チャンネルごとの最新スナップショット
/// - `subscribers`: 接続中の購読者と送信キュー
/// - `buffer`: 購読者ごとのキューの長さ
///
/// ## 使用例
///
/// ```ignore
/// let hub = BroadcastHub::new(Arc::new(InMemorySnapshotStore::new()), 64);
/// let mut subscription = hub.subscribe(ChannelSet::all()).await;
///
/// hub.publish(OverlayEvent::SubtextInfo(subtext)).await;
/// let event = subscription.receiver.recv().await;
/// ```
pub struct BroadcastHub {
    store: Arc<dyn SnapshotStore>,
    subscribers: Mutex<HashMap<SubscriberId, SubscriberEntry>>,
    buffer: usize,
}

impl BroadcastHub {
    /// 新しい BroadcastHub を作成
    ///
    /// `buffer` はチャンネル数より小さくできない（キャッチアップが必ず収まるようにするため）。
    pub fn new(store: Arc<dyn SnapshotStore>, buffer: usize) -> Self {
        Self {
            store,
            subscribers: Mutex::new(HashMap::new()),
            buffer: buffer.max(Channel::ALL.len()),
        }
    }

    /// スナップショットの書き込み先
    pub fn store(&self) -> Arc<dyn SnapshotStore> {
        self.store.clone()
    }

    /// 購読を開始し、購読チャンネルの現在のスナップショットをキューに積む
    pub async fn subscribe(&self, channels: ChannelSet) -> Subscription {
        let (sender, receiver) = mailbox(self.buffer);
        let id = Uuid::new_v4();

        let mut subscribers = self.subscribers.lock().await;
        let mut replayed = 0;
        for channel in channels.iter() {
            if let Some(snapshot) = self.store.get(channel).await {
                if sender.push(&snapshot, &snapshot) == PushOutcome::Queued {
                    replayed += 1;
                }
            }
        }
        subscribers.insert(id, SubscriberEntry { channels, sender });

        tracing::debug!(
            "Subscriber '{}' registered ({} snapshots replayed, {} subscribers)",
            id,
            replayed,
            subscribers.len()
        );

        Subscription { id, receiver }
    }

    /// 購読を終了
    pub async fn unsubscribe(&self, id: &SubscriberId) {
        let mut subscribers = self.subscribers.lock().await;
        if subscribers.remove(id).is_some() {
            tracing::debug!("Subscriber '{}' unregistered", id);
        }
    }

    /// 接続中の購読者数
    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.lock().await.len()
    }

    async fn fan_out(&self, snapshot: Arc<OverlayEvent>, delta: Arc<OverlayEvent>) {
        let channel = snapshot.channel();
        let mut subscribers = self.subscribers.lock().await;
        self.store.set(channel, snapshot.clone()).await;

        let mut closed = Vec::new();
        for (id, entry) in subscribers.iter() {
            if !entry.channels.contains(channel) {
                continue;
            }
            match entry.sender.push(&snapshot, &delta) {
                PushOutcome::Queued => {}
                PushOutcome::Coalesced => {
                    tracing::warn!(
                        "Subscriber '{}' is not keeping up, coalesced '{}' updates",
                        id,
                        channel
                    );
                }
                PushOutcome::Closed => closed.push(*id),
            }
        }

        for id in closed {
            subscribers.remove(&id);
            tracing::debug!("Subscriber '{}' went away, removed", id);
        }
    }
}

#[async_trait]
impl OverlayPublisher for BroadcastHub {
    async fn publish(&self, event: OverlayEvent) {
        let event = Arc::new(event);
        self.fan_out(event.clone(), event).await;
    }

    async fn publish_delta(&self, snapshot: OverlayEvent, delta: OverlayEvent) {
        debug_assert_eq!(snapshot.channel(), delta.channel());
        self.fan_out(Arc::new(snapshot), Arc::new(delta)).await;
    }
}
