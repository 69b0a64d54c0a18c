//! UseCase: 再生状態のポーリング
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - PlaybackPoller::poll_once() メソッド
//! - タイトル変更時の再構築と歌詞の再取得、tick ごとの進捗更新、停止時のリセット
//!
//! ### なぜこのテストが必要か
//! - 歌詞の取得はタイトルが変わったときに 1 回だけ行う必要がある
//! - 進捗はタイトルが変わらなくても毎サイクル配信される必要がある
//!
//! ### どのような状況を想定しているか
//! - 正常系：再生中のトラックの継続、曲の切り替え
//! - 異常系：取得失敗（エラー境界は run_poller 側）
//! - エッジケース：再生中のアイテムなし、歌詞の無効化、アーティスト名が空

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;

use crate::domain::{
    LyricsPayload, OverlayEvent, OverlayPublisher, PlaybackRaw, PlaybackSnapshot, PlaybackSource,
    SourceError, TrackItem,
};

use super::{lyrics::LyricsResolver, poller::SourcePoller};

/// 再生状態のポーリング間隔
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackIntervals {
    /// 再生中（進捗を更新し続ける）
    pub active: Duration,
    /// 何も再生していないとき
    pub idle: Duration,
    /// 取得に失敗した後
    pub error_backoff: Duration,
}

impl Default for PlaybackIntervals {
    fn default() -> Self {
        Self {
            active: Duration::from_secs(2),
            idle: Duration::from_secs(15),
            error_backoff: Duration::from_secs(5),
        }
    }
}

/// 再生状態のポーラー
///
/// `playback` と `lyrics` チャンネルの唯一の書き手。
pub struct PlaybackPoller {
    source: Arc<dyn PlaybackSource>,
    lyrics: Arc<LyricsResolver>,
    publisher: Arc<dyn OverlayPublisher>,
    intervals: PlaybackIntervals,
    last_title: String,
    current: PlaybackSnapshot,
    lyrics_shown: bool,
}

impl PlaybackPoller {
    pub fn new(
        source: Arc<dyn PlaybackSource>,
        lyrics: Arc<LyricsResolver>,
        publisher: Arc<dyn OverlayPublisher>,
        intervals: PlaybackIntervals,
    ) -> Self {
        Self {
            source,
            lyrics,
            publisher,
            intervals,
            last_title: String::new(),
            current: PlaybackSnapshot::idle(),
            lyrics_shown: false,
        }
    }

    /// 最後に publish したスナップショット
    pub fn current(&self) -> &PlaybackSnapshot {
        &self.current
    }

    async fn on_track(&mut self, raw: &PlaybackRaw, item: &TrackItem) {
        if item.title != self.last_title {
            self.last_title = item.title.clone();
            self.current = PlaybackSnapshot::from_track(raw, item);
            tracing::info!(
                "Track: {} by {}, Duration: {}s, Progress: {}ms ({:.1}%)",
                self.current.title,
                self.current.artist_name,
                self.current.duration_seconds,
                raw.progress_ms,
                self.current.progress * 100.0
            );
            self.refresh_lyrics().await;
        } else {
            self.current.apply_tick(raw, item);
        }

        // 変化の有無にかかわらず毎サイクル配信する（冪等な上書き）
        self.publisher
            .publish(OverlayEvent::PlaybackInfo(self.current.clone()))
            .await;
    }

    async fn refresh_lyrics(&mut self) {
        let artist = self.current.artist_name.clone();
        let title = self.current.title.clone();

        if self.lyrics.is_enabled() && !artist.is_empty() && !title.is_empty() {
            let lyrics = self.lyrics.resolve(&artist, &title).await.unwrap_or_default();
            self.lyrics_shown = !lyrics.is_empty();
            self.publisher
                .publish(OverlayEvent::PlaybackLyrics(LyricsPayload::new(lyrics)))
                .await;
        } else if self.lyrics_shown {
            self.clear_lyrics().await;
        }
    }

    async fn clear_lyrics(&mut self) {
        self.lyrics_shown = false;
        self.publisher
            .publish(OverlayEvent::PlaybackLyrics(LyricsPayload::empty()))
            .await;
    }

    async fn on_idle(&mut self) {
        if !self.last_title.is_empty() {
            tracing::info!("Nothing playing");
        }
        self.last_title.clear();
        self.current = PlaybackSnapshot::idle();
        self.publisher
            .publish(OverlayEvent::PlaybackInfo(self.current.clone()))
            .await;
        if self.lyrics_shown {
            self.clear_lyrics().await;
        }
    }
}

#[async_trait]
impl SourcePoller for PlaybackPoller {
    fn name(&self) -> &'static str {
        "playback"
    }

    fn error_backoff(&self) -> Duration {
        self.intervals.error_backoff
    }

    async fn poll_once(&mut self) -> Result<Duration, SourceError> {
        let raw = self.source.fetch_current_playback().await?;

        match &raw.item {
            Some(item) => {
                self.on_track(&raw, item).await;
                Ok(self.intervals.active)
            }
            None => {
                self.on_idle().await;
                Ok(self.intervals.idle)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            Channel, LyricsCandidate,
            collaborator::{MockLyricsSearch, MockPlaybackSource},
        },
        usecase::test_support::RecordingPublisher,
    };
    use std::{collections::VecDeque, sync::Mutex};

    fn track(title: &str, artist: &str) -> TrackItem {
        TrackItem {
            title: title.to_string(),
            artists: if artist.is_empty() {
                vec![]
            } else {
                vec![artist.to_string()]
            },
            album_title: "Album".to_string(),
            album_art_urls: vec!["https://img".to_string()],
            duration_ms: 100_000,
        }
    }

    fn playing(item: TrackItem, progress_ms: i64) -> PlaybackRaw {
        PlaybackRaw {
            is_playing: true,
            progress_ms,
            timestamp_ms: 1_000_000,
            item: Some(item),
        }
    }

    fn source_with(readings: Vec<Result<PlaybackRaw, SourceError>>) -> MockPlaybackSource {
        let readings = Mutex::new(VecDeque::from(readings));
        let mut source = MockPlaybackSource::new();
        source.expect_fetch_current_playback().returning(move || {
            readings
                .lock()
                .unwrap()
                .pop_front()
                .expect("no more readings")
        });
        source
    }

    fn lyrics_search(expected_calls: usize, lyrics: Option<&'static str>) -> MockLyricsSearch {
        let mut search = MockLyricsSearch::new();
        search
            .expect_search_lyrics()
            .times(expected_calls)
            .returning(move |_: &str, _: &str| {
                Ok(vec![LyricsCandidate {
                    synced_lyrics: lyrics.map(str::to_string),
                }])
            });
        search
    }

    fn create_poller(
        source: MockPlaybackSource,
        search: MockLyricsSearch,
        lyrics_enabled: bool,
    ) -> (PlaybackPoller, Arc<RecordingPublisher>) {
        let publisher = Arc::new(RecordingPublisher::default());
        let poller = PlaybackPoller::new(
            Arc::new(source),
            Arc::new(LyricsResolver::new(Arc::new(search), lyrics_enabled)),
            publisher.clone(),
            PlaybackIntervals::default(),
        );
        (poller, publisher)
    }

    fn lyrics_of(event: &OverlayEvent) -> &str {
        match event {
            OverlayEvent::PlaybackLyrics(payload) => &payload.lyrics,
            other => panic!("expected lyrics, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_title_change_resolves_lyrics_once() {
        // テスト項目: タイトル変更で歌詞の取得と配信がちょうど 1 回行われる（進捗も同時に変化）
        // given (前提条件):
        let source = source_with(vec![
            Ok(playing(track("SongA", "Artist"), 10_000)),
            Ok(playing(track("SongB", "Artist"), 20_000)),
        ]);
        let (mut poller, publisher) =
            create_poller(source, lyrics_search(2, Some("[00:01.00] la")), true);
        poller.poll_once().await.unwrap();
        publisher.clear();

        // when (操作):
        let delay = poller.poll_once().await.unwrap();

        // then (期待する結果):
        assert_eq!(delay, Duration::from_secs(2));
        let lyrics = publisher.sent_on(Channel::Lyrics);
        assert_eq!(lyrics.len(), 1);
        assert_eq!(lyrics_of(&lyrics[0]), "[00:01.00] la");
        assert_eq!(publisher.sent_on(Channel::Playback).len(), 1);
        assert_eq!(poller.current().title, "SongB");
        assert_eq!(poller.current().progress, 0.2);
    }

    #[tokio::test]
    async fn test_title_change_without_match_publishes_empty_lyrics() {
        // テスト項目: 歌詞が見つからない場合も空文字の歌詞が 1 回配信される
        // given (前提条件):
        let source = source_with(vec![Ok(playing(track("SongA", "Artist"), 0))]);
        let (mut poller, publisher) = create_poller(source, lyrics_search(1, None), true);

        // when (操作):
        poller.poll_once().await.unwrap();

        // then (期待する結果):
        let lyrics = publisher.sent_on(Channel::Lyrics);
        assert_eq!(lyrics.len(), 1);
        assert_eq!(lyrics_of(&lyrics[0]), "");
    }

    #[tokio::test]
    async fn test_same_title_publishes_progress_every_cycle() {
        // テスト項目: タイトルが変わらなくても毎サイクル進捗が配信され、歌詞は再取得されない
        // given (前提条件):
        let source = source_with(vec![
            Ok(playing(track("SongA", "Artist"), 10_000)),
            Ok(playing(track("SongA", "Artist"), 12_000)),
            Ok(playing(track("SongA", "Artist"), 12_000)),
        ]);
        let (mut poller, publisher) = create_poller(source, lyrics_search(1, Some("la")), true);

        // when (操作):
        for _ in 0..3 {
            poller.poll_once().await.unwrap();
        }

        // then (期待する結果):
        let playback = publisher.sent_on(Channel::Playback);
        assert_eq!(playback.len(), 3);
        assert_eq!(publisher.sent_on(Channel::Lyrics).len(), 1);
        match &playback[2] {
            OverlayEvent::PlaybackInfo(snapshot) => {
                assert_eq!(snapshot.title, "SongA");
                assert_eq!(snapshot.progress, 0.12);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_pause_updates_is_playing() {
        // テスト項目: 一時停止すると is_playing だけが更新される
        // given (前提条件):
        let mut paused = playing(track("SongA", "Artist"), 10_000);
        paused.is_playing = false;
        let source = source_with(vec![Ok(playing(track("SongA", "Artist"), 10_000)), Ok(paused)]);
        let (mut poller, _publisher) = create_poller(source, lyrics_search(1, None), true);
        poller.poll_once().await.unwrap();

        // when (操作):
        poller.poll_once().await.unwrap();

        // then (期待する結果):
        assert!(!poller.current().is_playing);
        assert_eq!(poller.current().title, "SongA");
    }

    #[tokio::test]
    async fn test_idle_resets_snapshot_and_backs_off() {
        // テスト項目: 再生中のアイテムがない場合、空の停止状態に戻り、歌詞がクリアされ、長い間隔になる
        // given (前提条件):
        let source = source_with(vec![
            Ok(playing(track("SongA", "Artist"), 10_000)),
            Ok(PlaybackRaw::idle()),
        ]);
        let (mut poller, publisher) = create_poller(source, lyrics_search(1, Some("la")), true);
        poller.poll_once().await.unwrap();
        publisher.clear();

        // when (操作):
        let delay = poller.poll_once().await.unwrap();

        // then (期待する結果):
        assert_eq!(delay, Duration::from_secs(15));
        assert_eq!(*poller.current(), PlaybackSnapshot::idle());
        assert_eq!(
            publisher.sent(),
            vec![
                OverlayEvent::PlaybackInfo(PlaybackSnapshot::idle()),
                OverlayEvent::PlaybackLyrics(LyricsPayload::empty()),
            ]
        );
    }

    #[tokio::test]
    async fn test_same_track_after_idle_resolves_again() {
        // テスト項目: 停止後に同じ曲が再開した場合もタイトル変更として扱われる
        // given (前提条件):
        let source = source_with(vec![
            Ok(playing(track("SongA", "Artist"), 10_000)),
            Ok(PlaybackRaw::idle()),
            Ok(playing(track("SongA", "Artist"), 0)),
        ]);
        let (mut poller, _publisher) = create_poller(source, lyrics_search(2, Some("la")), true);

        // when (操作):
        for _ in 0..3 {
            poller.poll_once().await.unwrap();
        }

        // then (期待する結果): lyrics_search の times(2) で検証
        assert_eq!(poller.current().title, "SongA");
    }

    #[tokio::test]
    async fn test_lyrics_disabled_skips_lookup() {
        // テスト項目: 歌詞が無効化されている場合は検索も配信もしない
        // given (前提条件):
        let source = source_with(vec![Ok(playing(track("SongA", "Artist"), 0))]);
        let (mut poller, publisher) = create_poller(source, lyrics_search(0, None), false);

        // when (操作):
        poller.poll_once().await.unwrap();

        // then (期待する結果):
        assert!(publisher.sent_on(Channel::Lyrics).is_empty());
        assert_eq!(publisher.sent_on(Channel::Playback).len(), 1);
    }

    #[tokio::test]
    async fn test_empty_artist_clears_previous_lyrics() {
        // テスト項目: アーティスト名が空の曲に変わった場合、検索せず前の曲の歌詞をクリアする
        // given (前提条件):
        let source = source_with(vec![
            Ok(playing(track("SongA", "Artist"), 0)),
            Ok(playing(track("Untitled", ""), 0)),
        ]);
        let (mut poller, publisher) = create_poller(source, lyrics_search(1, Some("la")), true);
        poller.poll_once().await.unwrap();
        publisher.clear();

        // when (操作):
        poller.poll_once().await.unwrap();

        // then (期待する結果):
        let lyrics = publisher.sent_on(Channel::Lyrics);
        assert_eq!(lyrics.len(), 1);
        assert_eq!(lyrics_of(&lyrics[0]), "");
    }

    #[tokio::test]
    async fn test_fetch_error_is_returned_without_publish() {
        // テスト項目: 取得に失敗した場合はエラーを返し、何も配信しない
        // given (前提条件):
        let source = source_with(vec![Err(SourceError::Transport("timeout".to_string()))]);
        let (mut poller, publisher) = create_poller(source, lyrics_search(0, None), true);

        // when (操作):
        let result = poller.poll_once().await;

        // then (期待する結果):
        assert!(matches!(result, Err(SourceError::Transport(_))));
        assert!(publisher.sent().is_empty());
        assert_eq!(poller.error_backoff(), Duration::from_secs(5));
    }
}
