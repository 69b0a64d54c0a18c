//! 外部サービスのインターフェース定義
//!
//! 具体的なクライアントは `infrastructure::client` にあります。
//! UseCase 層はこれらの trait だけに依存し、テストではモックに差し替えます。

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::{
    chat::InboundChatEvent,
    error::{ChatError, LyricsError, SourceError},
    playback::PlaybackRaw,
};

/// 再生中メディアの取得元
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaybackSource: Send + Sync {
    /// 現在の再生状態を取得。再生中の曲がなければ `item: None` の `Ok` を返す
    async fn fetch_current_playback(&self) -> Result<PlaybackRaw, SourceError>;
}

/// 歌詞検索の結果 1 件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LyricsCandidate {
    pub synced_lyrics: Option<String>,
}

/// 歌詞データベースの検索
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LyricsSearch: Send + Sync {
    async fn search_lyrics(
        &self,
        track: &str,
        artist: &str,
    ) -> Result<Vec<LyricsCandidate>, LyricsError>;
}

/// プロキシ経由のページ取得
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatsPageFetcher: Send + Sync {
    /// 上流のステータスコードと本文を返す
    async fn fetch_stats_page(&self, url: &str) -> Result<(u16, String), SourceError>;
}

/// チャットプロバイダ（受信イベントの購読とメッセージ削除）
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// 受信イベントを購読
    fn subscribe_events(&self) -> broadcast::Receiver<InboundChatEvent>;

    async fn delete_message(
        &self,
        broadcaster_id: &str,
        moderator_id: &str,
        message_id: &str,
    ) -> Result<(), ChatError>;
}
