//! UseCase: プロフィール統計のポーリング
//!
//! 取得元はボット対策のため unblocking proxy 経由でしか読めず、レート制限も厳しい。
//! 成功したら長い間隔（既定 15 分）を空け、失敗したら短いバックオフ（既定 10 秒）で再試行する。

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;

use crate::domain::{
    EmbeddedJsonDelimiters, OverlayEvent, OverlayPublisher, SourceError, StatsPageFetcher,
    StatsSnapshot,
};

use super::poller::SourcePoller;

const HTTP_OK: u16 = 200;

/// 統計ページの取得先と取得間隔
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsSourceSettings {
    pub profile_url: String,
    pub delimiters: EmbeddedJsonDelimiters,
    pub refresh_interval: Duration,
    pub error_backoff: Duration,
}

impl StatsSourceSettings {
    pub fn new(profile_url: String) -> Self {
        Self {
            profile_url,
            delimiters: EmbeddedJsonDelimiters::default(),
            refresh_interval: Duration::from_secs(15 * 60),
            error_backoff: Duration::from_secs(10),
        }
    }
}

/// 統計のポーラー。`stats` チャンネルの唯一の書き手。
pub struct StatsPoller {
    fetcher: Arc<dyn StatsPageFetcher>,
    publisher: Arc<dyn OverlayPublisher>,
    settings: StatsSourceSettings,
}

impl StatsPoller {
    pub fn new(
        fetcher: Arc<dyn StatsPageFetcher>,
        publisher: Arc<dyn OverlayPublisher>,
        settings: StatsSourceSettings,
    ) -> Self {
        Self {
            fetcher,
            publisher,
            settings,
        }
    }
}

#[async_trait]
impl SourcePoller for StatsPoller {
    fn name(&self) -> &'static str {
        "stats"
    }

    fn error_backoff(&self) -> Duration {
        self.settings.error_backoff
    }

    async fn poll_once(&mut self) -> Result<Duration, SourceError> {
        let (status, body) = self
            .fetcher
            .fetch_stats_page(&self.settings.profile_url)
            .await?;
        if status != HTTP_OK {
            return Err(SourceError::Status(status));
        }

        let snapshot = StatsSnapshot::from_page(&body, &self.settings.delimiters)?;
        tracing::info!(
            "Stats updated: {} hero segments, {} role segments",
            snapshot.hero_stats.len(),
            snapshot.role_stats.len()
        );
        self.publisher
            .publish(OverlayEvent::StatsInfo(snapshot))
            .await;

        Ok(self.settings.refresh_interval)
    }
}
