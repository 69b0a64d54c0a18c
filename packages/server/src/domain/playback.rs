//! 再生状態の定義と、取得値からスナップショットへの変換

use serde::{Deserialize, Serialize};

use butai_shared::time::millis_to_secs;

/// メディアソースから取得した 1 回分の値（ベンダー固有の形式は除去済み）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackRaw {
    pub is_playing: bool,
    pub progress_ms: i64,
    /// 上流での取得時刻（Unix ミリ秒）
    pub timestamp_ms: i64,
    /// 何も再生していなければ `None`
    pub item: Option<TrackItem>,
}

impl PlaybackRaw {
    /// 再生中の曲がない取得値
    pub fn idle() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackItem {
    pub title: String,
    pub artists: Vec<String>,
    pub album_title: String,
    pub album_art_urls: Vec<String>,
    pub duration_ms: i64,
}

impl TrackItem {
    /// 表示用に連結したアーティスト名
    pub fn artist_name(&self) -> String {
        self.artists
            .iter()
            .map(String::as_str)
            .filter(|name| !name.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// `playback` チャンネルで配信する再生状態
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub artist_name: String,
    pub title: String,
    pub album_title: String,
    pub art_url: String,
    pub is_playing: bool,
    /// 常に `[0, 1]` の範囲
    pub progress: f64,
    #[serde(rename = "duration")]
    pub duration_seconds: f64,
    /// Unix 秒
    pub start_time: f64,
}

impl PlaybackSnapshot {
    /// 何も再生していないときの空のスナップショット
    pub fn idle() -> Self {
        Self::default()
    }

    /// 取得値から全フィールドを組み立てる
    pub fn from_track(raw: &PlaybackRaw, item: &TrackItem) -> Self {
        Self {
            artist_name: item.artist_name(),
            title: item.title.clone(),
            album_title: item.album_title.clone(),
            art_url: item.album_art_urls.first().cloned().unwrap_or_default(),
            is_playing: raw.is_playing,
            progress: compute_progress(raw.progress_ms, item.duration_ms),
            duration_seconds: millis_to_secs(item.duration_ms.max(0)),
            start_time: millis_to_secs(raw.timestamp_ms),
        }
    }

    /// tick ごとに変わるフィールドだけを更新（曲のメタデータはそのまま）
    pub fn apply_tick(&mut self, raw: &PlaybackRaw, item: &TrackItem) {
        self.progress = compute_progress(raw.progress_ms, item.duration_ms);
        self.is_playing = raw.is_playing;
        self.start_time = millis_to_secs(raw.timestamp_ms);
    }
}

/// 再生位置の割合を `[0, 1]` に収めて返す
///
/// 長さが 0 以下なら 0。
pub fn compute_progress(progress_ms: i64, duration_ms: i64) -> f64 {
    if duration_ms <= 0 {
        return 0.0;
    }
    (progress_ms as f64 / duration_ms as f64).clamp(0.0, 1.0)
}
