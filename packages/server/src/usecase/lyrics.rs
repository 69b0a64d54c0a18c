//! 再生中の曲の歌詞解決

use std::sync::Arc;

use crate::domain::LyricsSearch;

/// 同期歌詞を検索する。検索の失敗は「歌詞なし」と同じ扱い
pub struct LyricsResolver {
    search: Arc<dyn LyricsSearch>,
    enabled: bool,
}

impl LyricsResolver {
    pub fn new(search: Arc<dyn LyricsSearch>, enabled: bool) -> Self {
        Self { search, enabled }
    }

    /// 設定で歌詞が無効なら `false`
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// 最初の検索結果の同期歌詞（あれば）
    pub async fn resolve(&self, artist: &str, title: &str) -> Option<String> {
        match self.search.search_lyrics(title, artist).await {
            Ok(candidates) => candidates
                .into_iter()
                .next()
                .and_then(|candidate| candidate.synced_lyrics)
                .filter(|lyrics| !lyrics.is_empty()),
            Err(e) => {
                tracing::debug!("No lyrics for '{}' by '{}': {}", title, artist, e);
                None
            }
        }
    }
}
