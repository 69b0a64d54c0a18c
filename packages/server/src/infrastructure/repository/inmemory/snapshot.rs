//! InMemory Snapshot Store 実装
//!
//! ドメイン層が定義する SnapshotStore trait の具体的な実装。
//! HashMap をインメモリストアとして使用します。再起動をまたいだ永続化はしません。
//!
//! 値は `Arc` ごと置き換えるため、ロック区間はポインタのコピーだけで済み、
//! 読み手が書きかけの値を観測することはありません。

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{Channel, OverlayEvent, SnapshotStore};

/// インメモリ Snapshot Store 実装
#[derive(Default)]
pub struct InMemorySnapshotStore {
    /// チャンネルごとの最新スナップショット
    snapshots: RwLock<HashMap<Channel, Arc<OverlayEvent>>>,
}

impl InMemorySnapshotStore {
    /// 新しい空の InMemorySnapshotStore を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn get(&self, channel: Channel) -> Option<Arc<OverlayEvent>> {
        let snapshots = self.snapshots.read().await;
        snapshots.get(&channel).cloned()
    }

    async fn set(&self, channel: Channel, snapshot: Arc<OverlayEvent>) {
        let mut snapshots = self.snapshots.write().await;
        snapshots.insert(channel, snapshot);
    }

    async fn all(&self) -> BTreeMap<Channel, Arc<OverlayEvent>> {
        let snapshots = self.snapshots.read().await;
        snapshots
            .iter()
            .map(|(channel, snapshot)| (*channel, snapshot.clone()))
            .collect()
    }
}
