//! プロフィール統計
//!
//! プロキシが返す HTML から埋め込み JSON を取り出し、セグメントを種類ごとに振り分ける。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::SourceError;

const HERO_SEGMENT: &str = "hero";
const ROLE_SEGMENT: &str = "hero-role";

/// 埋め込み JSON を囲む開始・終了タグ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedJsonDelimiters {
    pub open: String,
    pub close: String,
}

impl Default for EmbeddedJsonDelimiters {
    fn default() -> Self {
        Self {
            open: "<pre>".to_string(),
            close: "</pre>".to_string(),
        }
    }
}

impl EmbeddedJsonDelimiters {
    /// 最初の開始タグと、その後の最初の終了タグの間を返す
    pub fn extract<'a>(&self, body: &'a str) -> Result<&'a str, SourceError> {
        let start = body
            .find(&self.open)
            .map(|idx| idx + self.open.len())
            .ok_or(SourceError::MissingDelimiters)?;
        let len = body[start..]
            .find(&self.close)
            .ok_or(SourceError::MissingDelimiters)?;
        Ok(&body[start..start + len])
    }
}

/// セグメント 1 件
///
/// `type` 以外のフィールドはそのまま素通しする。`type` がなければ空文字列。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// 上流ドキュメントの形（`{"data": {...}}`）
#[derive(Debug, Deserialize)]
struct StatsDocument {
    data: StatsData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsData {
    #[serde(default)]
    platform_info: Value,
    #[serde(default)]
    user_info: Value,
    #[serde(default)]
    metadata: Value,
    #[serde(default)]
    segments: Vec<Segment>,
}

/// `stats` チャンネルで配信する統計スナップショット
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub metadata: Value,
    pub platform_info: Value,
    pub user_info: Value,
    pub hero_stats: Vec<Segment>,
    pub role_stats: Vec<Segment>,
}

impl StatsSnapshot {
    /// プロキシのレスポンス本文からスナップショットを作る
    pub fn from_page(body: &str, delimiters: &EmbeddedJsonDelimiters) -> Result<Self, SourceError> {
        let json = delimiters.extract(body)?;
        let document: StatsDocument = serde_json::from_str(json.trim())?;
        Ok(Self::from_data(document.data))
    }

    fn from_data(data: StatsData) -> Self {
        let (hero_stats, role_stats) = partition_segments(data.segments);
        Self {
            metadata: data.metadata,
            platform_info: data.platform_info,
            user_info: data.user_info,
            hero_stats,
            role_stats,
        }
    }
}

/// hero と hero-role に振り分ける。その他の種類はどちらにも入れない
pub fn partition_segments(segments: Vec<Segment>) -> (Vec<Segment>, Vec<Segment>) {
    let mut heroes = Vec::new();
    let mut roles = Vec::new();
    for segment in segments {
        match segment.kind.as_str() {
            HERO_SEGMENT => heroes.push(segment),
            ROLE_SEGMENT => roles.push(segment),
            _ => {}
        }
    }
    (heroes, roles)
}
