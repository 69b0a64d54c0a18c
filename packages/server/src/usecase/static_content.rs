//! UseCase: 静的コンテンツ（subtext / slides）の配信
//!
//! 起動時に 1 回だけ snapshot として保存・配信する。以後の接続には catch-up で届く。

use std::sync::Arc;

use crate::domain::{OverlayEvent, OverlayPublisher, SlidesPayload, SubtextPayload};

/// 運営者が設定する表示テキスト
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticContent {
    pub subtext: String,
    pub slides: Vec<String>,
}

/// 静的コンテンツ配信のユースケース
pub struct PublishStaticContentUseCase {
    publisher: Arc<dyn OverlayPublisher>,
}

impl PublishStaticContentUseCase {
    pub fn new(publisher: Arc<dyn OverlayPublisher>) -> Self {
        Self { publisher }
    }

    pub async fn execute(&self, content: StaticContent) {
        tracing::debug!("Publishing static content ({} slides)", content.slides.len());
        self.publisher
            .publish(OverlayEvent::SubtextInfo(SubtextPayload {
                subtext: content.subtext,
            }))
            .await;
        self.publisher
            .publish(OverlayEvent::SlidesInfo(SlidesPayload {
                slides: content.slides,
            }))
            .await;
    }
}
