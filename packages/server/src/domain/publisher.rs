//! Publisher trait 定義
//!
//! ポーラーとモデレーションが購読者へ値を届けるためのインターフェース。
//! 実装（Broadcast Hub）は Infrastructure 層にあります。

use async_trait::async_trait;

use super::event::OverlayEvent;

/// Overlay Publisher trait
///
/// 配信は呼び出し元をブロックしない。遅い購読者には古い値を畳み込んだうえで最新値が届き、
/// 切断済みの購読者は無視される。
#[async_trait]
pub trait OverlayPublisher: Send + Sync {
    /// スナップショットを保存し、そのチャンネルの購読者全員に送信
    async fn publish(&self, event: OverlayEvent);

    /// `snapshot` をチャンネルの最新値として保存し、購読者には `delta` だけを送信
    ///
    /// 例: チャットでは履歴全体を保存し、新着メッセージだけを配信する。
    async fn publish_delta(&self, snapshot: OverlayEvent, delta: OverlayEvent);
}
