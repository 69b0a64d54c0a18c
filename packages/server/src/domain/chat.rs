//! チャットメッセージと、受理済みメッセージの履歴

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// チャットプロバイダから届く受信イベント
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundChatEvent {
    /// プロバイダ側のメッセージ ID（削除に使う）
    pub id: String,
    pub user: String,
    pub channel: String,
    pub text: String,
}

/// 受理されたチャットメッセージ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub user: String,
    pub channel: String,
    pub message: String,
    /// 受理時刻（Unix ミリ秒）
    pub received_at: i64,
}

impl ChatMessage {
    pub fn from_event(event: InboundChatEvent, received_at: i64) -> Self {
        Self {
            user: event.user,
            channel: event.channel,
            message: event.text,
            received_at,
        }
    }
}

/// 直近の受理済みメッセージを保持する FIFO
#[derive(Debug, Clone)]
pub struct ChatHistory {
    capacity: usize,
    messages: VecDeque<ChatMessage>,
}

impl ChatHistory {
    /// 空の履歴を作成（容量 0 は 1 として扱う）
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            messages: VecDeque::with_capacity(capacity),
        }
    }

    /// 追加。一杯なら最も古いものを捨てる
    pub fn push(&mut self, message: ChatMessage) {
        if self.messages.len() == self.capacity {
            self.messages.pop_front();
        }
        self.messages.push_back(message);
    }

    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.messages.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
