//! 購読者ごとの送信キュー
//!
//! ## 設計ノート
//!
//! 有界キューだが、一杯になっても新しいイベントは捨てない。
//! 一杯のときは同じチャンネルのキュー済みイベントを取り除き、そのチャンネルの
//! 最新スナップショットを 1 つだけ積む。読み手は遅れても各チャンネルの最新値に
//! 必ず追いつく。キューの長さは `capacity + チャンネル数` を超えない。

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tokio::sync::Notify;

use crate::domain::OverlayEvent;

/// 購読者へ 1 件渡した結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Queued,
    /// キューが一杯だったため、同じチャンネルの古いイベントを最新値で置き換えた
    Coalesced,
    /// 受信側が破棄済み
    Closed,
}

/// [`SubscriberReceiver::try_recv`] のエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TryRecvError {
    #[error("queue is empty")]
    Empty,
    #[error("subscription ended")]
    Disconnected,
}

struct MailboxState {
    queue: VecDeque<Arc<OverlayEvent>>,
    capacity: usize,
    sender_closed: bool,
    receiver_closed: bool,
}

struct Mailbox {
    state: Mutex<MailboxState>,
    notify: Notify,
}

impl Mailbox {
    // キューの操作は await を挟まないため std の Mutex で足りる
    fn lock(&self) -> MutexGuard<'_, MailboxState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// 送信側と受信側の組を作成
pub(super) fn mailbox(capacity: usize) -> (MailboxSender, SubscriberReceiver) {
    let mailbox = Arc::new(Mailbox {
        state: Mutex::new(MailboxState {
            queue: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            sender_closed: false,
            receiver_closed: false,
        }),
        notify: Notify::new(),
    });
    (
        MailboxSender {
            mailbox: mailbox.clone(),
        },
        SubscriberReceiver { mailbox },
    )
}

/// 送信キューの Hub 側
pub(super) struct MailboxSender {
    mailbox: Arc<Mailbox>,
}

impl MailboxSender {
    /// `delta` を積む
    ///
    /// キューが一杯のときは同じチャンネルのキュー済みイベントを取り除き、代わりに `snapshot` を積む。
    pub(super) fn push(
        &self,
        snapshot: &Arc<OverlayEvent>,
        delta: &Arc<OverlayEvent>,
    ) -> PushOutcome {
        let outcome = {
            let mut state = self.mailbox.lock();
            if state.receiver_closed {
                return PushOutcome::Closed;
            }

            if state.queue.len() < state.capacity {
                state.queue.push_back(delta.clone());
                PushOutcome::Queued
            } else {
                let channel = delta.channel();
                let before = state.queue.len();
                state.queue.retain(|queued| queued.channel() != channel);
                if state.queue.len() == before {
                    // 取りこぼしはまだないので差分のままでよい
                    state.queue.push_back(delta.clone());
                } else {
                    state.queue.push_back(snapshot.clone());
                }
                PushOutcome::Coalesced
            }
        };

        self.mailbox.notify.notify_one();
        outcome
    }
}

impl Drop for MailboxSender {
    fn drop(&mut self) {
        self.mailbox.lock().sender_closed = true;
        self.mailbox.notify.notify_one();
    }
}

/// 送信キューの購読者側
pub struct SubscriberReceiver {
    mailbox: Arc<Mailbox>,
}

impl SubscriberReceiver {
    /// 次のイベントを待つ
    ///
    /// Hub が購読を破棄し、積まれた分をすべて読み終えると `None`。
    pub async fn recv(&mut self) -> Option<Arc<OverlayEvent>> {
        loop {
            // notify_one は待ち手がいなければ permit を残すので取りこぼさない
            let notified = self.mailbox.notify.notified();
            match self.pop() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Disconnected) => return None,
                Err(TryRecvError::Empty) => notified.await,
            }
        }
    }

    pub fn try_recv(&mut self) -> Result<Arc<OverlayEvent>, TryRecvError> {
        self.pop()
    }

    fn pop(&self) -> Result<Arc<OverlayEvent>, TryRecvError> {
        let mut state = self.mailbox.lock();
        match state.queue.pop_front() {
            Some(event) => Ok(event),
            None if state.sender_closed => Err(TryRecvError::Disconnected),
            None => Err(TryRecvError::Empty),
        }
    }

    /// 未読のイベント数
    pub fn len(&self) -> usize {
        self.mailbox.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for SubscriberReceiver {
    fn drop(&mut self) {
        self.mailbox.lock().receiver_closed = true;
    }
}

impl std::fmt::Debug for SubscriberReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberReceiver")
            .field("queued", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChatMessage, LyricsPayload, PlaybackSnapshot};
    use std::time::Duration;

    fn lyrics(text: &str) -> Arc<OverlayEvent> {
        Arc::new(OverlayEvent::PlaybackLyrics(LyricsPayload::new(text)))
    }

    fn playback(title: &str) -> Arc<OverlayEvent> {
        Arc::new(OverlayEvent::PlaybackInfo(PlaybackSnapshot {
            title: title.to_string(),
            ..PlaybackSnapshot::idle()
        }))
    }

    fn chat(message: &str) -> ChatMessage {
        ChatMessage {
            user: "alice".to_string(),
            channel: "stream".to_string(),
            message: message.to_string(),
            received_at: 0,
        }
    }

    fn drain(receiver: &mut SubscriberReceiver) -> Vec<Arc<OverlayEvent>> {
        let mut events = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_push_within_capacity_keeps_order() {
        // テスト項目: 容量内では積んだ順に取り出せる
        // given (前提条件):
        let (sender, mut receiver) = mailbox(4);

        // when (操作):
        for title in ["A", "B", "C"] {
            let event = playback(title);
            assert_eq!(sender.push(&event, &event), PushOutcome::Queued);
        }

        // then (期待する結果):
        assert_eq!(drain(&mut receiver), vec![playback("A"), playback("B"), playback("C")]);
    }

    #[test]
    fn test_overflow_replaces_stale_events_of_channel() {
        // テスト項目: 一杯のとき、同じチャンネルの古いイベントは最新値に置き換わる
        // given (前提条件):
        let (sender, mut receiver) = mailbox(3);
        let old = lyrics("old");
        sender.push(&old, &old);
        sender.push(&playback("A"), &playback("A"));
        sender.push(&playback("B"), &playback("B"));

        // when (操作):
        let new = lyrics("new");
        let outcome = sender.push(&new, &new);

        // then (期待する結果):
        assert_eq!(outcome, PushOutcome::Coalesced);
        assert_eq!(drain(&mut receiver), vec![playback("A"), playback("B"), lyrics("new")]);
    }

    #[test]
    fn test_overflow_sends_snapshot_when_deltas_were_dropped() {
        // テスト項目: 差分を取り除いた場合は、差分ではなくスナップショットが積まれる
        // given (前提条件):
        let (sender, mut receiver) = mailbox(2);
        let first = Arc::new(OverlayEvent::ChatMessage(chat("first")));
        let first_history = Arc::new(OverlayEvent::ChatHistory(vec![chat("first")]));
        sender.push(&first_history, &first);
        sender.push(&playback("A"), &playback("A"));

        // when (操作):
        let second = Arc::new(OverlayEvent::ChatMessage(chat("second")));
        let history = Arc::new(OverlayEvent::ChatHistory(vec![chat("first"), chat("second")]));
        sender.push(&history, &second);

        // then (期待する結果):
        assert_eq!(drain(&mut receiver), vec![playback("A"), history]);
    }

    #[test]
    fn test_overflow_without_queued_events_of_channel_keeps_delta() {
        // テスト項目: 一杯でも同じチャンネルのイベントがなければ差分がそのまま積まれる
        // given (前提条件):
        let (sender, mut receiver) = mailbox(2);
        sender.push(&playback("A"), &playback("A"));
        sender.push(&playback("B"), &playback("B"));

        // when (操作):
        let delta = Arc::new(OverlayEvent::ChatMessage(chat("hi")));
        let snapshot = Arc::new(OverlayEvent::ChatHistory(vec![chat("hi")]));
        sender.push(&snapshot, &delta);

        // then (期待する結果):
        assert_eq!(drain(&mut receiver).last(), Some(&delta));
    }

    #[test]
    fn test_queue_stays_bounded_under_flood() {
        // テスト項目: 読まれないまま大量に積まれても、長さは容量 + チャンネル数を超えない
        // given (前提条件):
        let (sender, receiver) = mailbox(6);

        // when (操作):
        for n in 0..1000 {
            let event = playback(&format!("Song{}", n));
            sender.push(&event, &event);
            let words = lyrics(&format!("words {}", n));
            sender.push(&words, &words);
        }

        // then (期待する結果):
        assert!(receiver.len() <= 6 + crate::domain::Channel::ALL.len());
    }

    #[test]
    fn test_push_after_receiver_dropped_is_closed() {
        // テスト項目: 受信側が破棄されると Closed が返る
        // given (前提条件):
        let (sender, receiver) = mailbox(2);
        drop(receiver);

        // when (操作):
        let event = playback("A");
        let outcome = sender.push(&event, &event);

        // then (期待する結果):
        assert_eq!(outcome, PushOutcome::Closed);
    }

    #[tokio::test]
    async fn test_recv_drains_then_ends_after_sender_dropped() {
        // テスト項目: 送信側が破棄されても、積まれた分を読み切ってから None になる
        // given (前提条件):
        let (sender, mut receiver) = mailbox(2);
        let event = playback("A");
        sender.push(&event, &event);

        // when (操作):
        drop(sender);

        // then (期待する結果):
        assert_eq!(receiver.recv().await, Some(playback("A")));
        assert_eq!(receiver.recv().await, None);
    }

    #[tokio::test]
    async fn test_recv_wakes_on_push() {
        // テスト項目: 待機中の recv は push で起こされる
        // given (前提条件):
        let (sender, mut receiver) = mailbox(2);
        let waiter = tokio::spawn(async move { receiver.recv().await });

        // when (操作):
        tokio::task::yield_now().await;
        let event = playback("A");
        sender.push(&event, &event);

        // then (期待する結果):
        let received = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(received, Some(playback("A")));
    }
}
