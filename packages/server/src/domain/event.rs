//! 各チャンネルで配信するペイロード

use serde::{Deserialize, Serialize};

use super::{channel::Channel, chat::ChatMessage, playback::PlaybackSnapshot, stats::StatsSnapshot};

/// 再生中の曲の歌詞（空文字列は「歌詞なし」）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LyricsPayload {
    pub lyrics: String,
}

impl LyricsPayload {
    pub fn new(lyrics: impl Into<String>) -> Self {
        Self {
            lyrics: lyrics.into(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.lyrics.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtextPayload {
    pub subtext: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlidesPayload {
    pub slides: Vec<String>,
}

/// 表示クライアントへ配信するイベント
///
/// 各バリアントはちょうど 1 つのチャンネルに属する。
/// `ChatMessage` だけは `ChatHistory` スナップショットに対する差分で、それ以外はそれ自体がスナップショット。
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayEvent {
    PlaybackInfo(PlaybackSnapshot),
    PlaybackLyrics(LyricsPayload),
    StatsInfo(StatsSnapshot),
    ChatHistory(Vec<ChatMessage>),
    ChatMessage(ChatMessage),
    SubtextInfo(SubtextPayload),
    SlidesInfo(SlidesPayload),
}

impl OverlayEvent {
    pub fn channel(&self) -> Channel {
        match self {
            OverlayEvent::PlaybackInfo(_) => Channel::Playback,
            OverlayEvent::PlaybackLyrics(_) => Channel::Lyrics,
            OverlayEvent::StatsInfo(_) => Channel::Stats,
            OverlayEvent::ChatHistory(_) | OverlayEvent::ChatMessage(_) => Channel::Chat,
            OverlayEvent::SubtextInfo(_) => Channel::Subtext,
            OverlayEvent::SlidesInfo(_) => Channel::Slides,
        }
    }
}
