//! メッセージ送信（通知）の実装
//!
//! ## 概要
//!
//! このモジュールは `OverlayPublisher` trait の具体的な実装を提供します。
//!
//! ## 実装
//!
//! - `hub`: チャンネル単位のファンアウトと、接続時のスナップショット再送
//! - `mailbox`: 遅い購読者のキューをチャンネルごとに最新値へ畳み込む送信キュー

pub mod hub;
mod mailbox;

pub use hub::{BroadcastHub, SubscriberId, Subscription};
pub use mailbox::{SubscriberReceiver, TryRecvError};
