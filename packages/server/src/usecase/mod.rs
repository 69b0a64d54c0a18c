//! UseCase 層
//!
//! バックグラウンドの書き込み役ごとに、担当するチャンネルが決まっています。
//!
//! - 再生ポーラー: `playback`, `lyrics`
//! - 統計ポーラー: `stats`
//! - チャットのモデレーション: `chat`
//! - 静的コンテンツ: `subtext`, `slides`

mod lyrics;
mod moderate_chat;
mod playback_poller;
mod poller;
mod static_content;
mod stats_poller;

#[cfg(test)]
mod test_support;

pub use lyrics::LyricsResolver;
pub use moderate_chat::{ModerateChatUseCase, ModerationOutcome, ModeratorIdentity};
pub use playback_poller::{PlaybackIntervals, PlaybackPoller};
pub use poller::{
    ShutdownSignal, SourcePoller, run_poller, sleep_or_shutdown, spawn_supervised,
    wait_for_shutdown,
};
pub use static_content::{PublishStaticContentUseCase, StaticContent};
pub use stats_poller::{StatsPoller, StatsSourceSettings};
