//! UseCase のテストで共有するテストダブル

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{Channel, OverlayEvent, OverlayPublisher};

/// 送信を依頼された内容をすべて記録する Publisher
#[derive(Default)]
pub struct RecordingPublisher {
    sent: Mutex<Vec<OverlayEvent>>,
    snapshots: Mutex<Vec<OverlayEvent>>,
}

impl RecordingPublisher {
    /// 購読者へ配信されたイベント（publish 順）
    pub fn sent(&self) -> Vec<OverlayEvent> {
        self.sent.lock().unwrap().clone()
    }

    /// 指定チャンネルに配信されたイベント
    pub fn sent_on(&self, channel: Channel) -> Vec<OverlayEvent> {
        self.sent()
            .into_iter()
            .filter(|event| event.channel() == channel)
            .collect()
    }

    /// 保存されたスナップショット（publish 順）
    pub fn snapshots(&self) -> Vec<OverlayEvent> {
        self.snapshots.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
        self.snapshots.lock().unwrap().clear();
    }
}

#[async_trait]
impl OverlayPublisher for RecordingPublisher {
    async fn publish(&self, event: OverlayEvent) {
        self.snapshots.lock().unwrap().push(event.clone());
        self.sent.lock().unwrap().push(event);
    }

    async fn publish_delta(&self, snapshot: OverlayEvent, delta: OverlayEvent) {
        self.snapshots.lock().unwrap().push(snapshot);
        self.sent.lock().unwrap().push(delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChatMessage, SubtextPayload};

    fn chat(message: &str) -> ChatMessage {
        ChatMessage {
            user: "alice".to_string(),
            channel: "stream".to_string(),
            message: message.to_string(),
            received_at: 0,
        }
    }

    #[tokio::test]
    async fn test_recording_publisher_separates_snapshot_and_delta() {
        // テスト項目: publish_delta は保存値と配信値を分けて記録し、publish は両方に記録する
        // given (前提条件):
        let publisher = RecordingPublisher::default();
        let subtext = OverlayEvent::SubtextInfo(SubtextPayload {
            subtext: "hello".to_string(),
        });

        // when (操作):
        publisher.publish(subtext.clone()).await;
        publisher
            .publish_delta(
                OverlayEvent::ChatHistory(vec![chat("hi")]),
                OverlayEvent::ChatMessage(chat("hi")),
            )
            .await;

        // then (期待する結果):
        assert_eq!(
            publisher.snapshots(),
            vec![subtext.clone(), OverlayEvent::ChatHistory(vec![chat("hi")])]
        );
        assert_eq!(
            publisher.sent_on(Channel::Chat),
            vec![OverlayEvent::ChatMessage(chat("hi"))]
        );
        assert_eq!(publisher.sent_on(Channel::Subtext), vec![subtext]);
    }
}
