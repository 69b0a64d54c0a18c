//! ドメイン層のエラー型

use thiserror::Error;

/// 外部ソースへの 1 回のポーリングの失敗
///
/// ポーラーにとってはどれも一時的なエラーで、ログに出したうえで待ってから再試行する。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// 通信エラー（タイムアウト、プロキシの失敗を含む）
    #[error("Transport error: {0}")]
    Transport(String),

    /// 上流が成功以外のステータスを返した
    #[error("Unexpected status code {0}")]
    Status(u16),

    /// ページに埋め込み JSON が見つからない
    #[error("Embedded payload delimiters not found")]
    MissingDelimiters,

    /// 想定外の形のペイロード
    #[error("Failed to parse payload: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for SourceError {
    fn from(e: serde_json::Error) -> Self {
        SourceError::Parse(e.to_string())
    }
}

/// チャットプロバイダのエラー
#[derive(Debug, Error)]
pub enum ChatError {
    /// 削除の呼び出しが拒否された、または失敗した
    #[error("Failed to delete message: {0}")]
    DeleteFailed(String),

    /// 削除に必要な認証情報がない
    #[error("Message deletion is not available")]
    DeleteUnavailable,
}

/// 歌詞検索のエラー
#[derive(Debug, Error)]
#[error("Lyrics lookup failed: {0}")]
pub struct LyricsError(pub String);

/// チャンネル名のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChannelParseError {
    #[error("Unknown channel '{0}'")]
    Unknown(String),
}
