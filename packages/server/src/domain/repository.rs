//! Repository trait 定義
//!
//! 各チャンネルの最新スナップショットを保持するストアのインターフェース。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;

use super::{channel::Channel, event::OverlayEvent};

/// Snapshot Store trait
///
/// チャンネルごとに最新の値を 1 つだけ保持する。
/// 書き込みは値の丸ごとの置き換えで、読み手は古い値か新しい値のどちらかを必ず観測する。
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// チャンネルの現在のスナップショットを取得
    async fn get(&self, channel: Channel) -> Option<Arc<OverlayEvent>>;

    /// チャンネルのスナップショットを置き換える
    async fn set(&self, channel: Channel, snapshot: Arc<OverlayEvent>);

    /// スナップショットを持つ全チャンネルの値を取得
    async fn all(&self) -> BTreeMap<Channel, Arc<OverlayEvent>>;
}
