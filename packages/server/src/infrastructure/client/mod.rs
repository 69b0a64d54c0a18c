//! 外部サービスの HTTP クライアント
//!
//! ## 概要
//!
//! 各クライアントはベンダー API をドメイン層の trait に合わせる薄いアダプタです。
//! アクセストークンは設定から渡され、取得や更新はここでは扱いません。

pub mod flaresolverr;
pub mod lrclib;
pub mod spotify;
pub mod webhook_chat;

pub use flaresolverr::FlareSolverrFetcher;
pub use lrclib::LrclibClient;
pub use spotify::SpotifyPlaybackSource;
pub use webhook_chat::{HelixCredentials, WebhookChatProvider};

use crate::domain::SourceError;

fn transport_error(e: reqwest::Error) -> SourceError {
    SourceError::Transport(e.to_string())
}
