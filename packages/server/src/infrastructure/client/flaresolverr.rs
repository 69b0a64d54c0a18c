//! FlareSolverr 互換プロキシ経由の統計ページ取得
//!
//! プロキシはヘッドレスブラウザで対象サイトのボット対策を通過し、
//! レンダリング済みのページを返す。JSON API のレスポンスは HTML に包まれた形で届く。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{SourceError, StatsPageFetcher};

use super::transport_error;

const DEFAULT_MAX_TIMEOUT_MS: u64 = 60_000;

pub struct FlareSolverrFetcher {
    http: reqwest::Client,
    endpoint: String,
    max_timeout_ms: u64,
}

impl FlareSolverrFetcher {
    /// `endpoint` はプロキシのコマンド URL（例: `http://localhost:8191/v1`）
    pub fn new(http: reqwest::Client, endpoint: String) -> Self {
        Self {
            http,
            endpoint,
            max_timeout_ms: DEFAULT_MAX_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestGetDto<'a> {
    cmd: &'static str,
    url: &'a str,
    max_timeout: u64,
}

#[derive(Debug, Deserialize)]
struct ProxyResponseDto {
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    solution: Option<SolutionDto>,
}

#[derive(Debug, Deserialize)]
struct SolutionDto {
    status: u16,
    #[serde(default)]
    response: String,
}

impl ProxyResponseDto {
    fn into_page(self) -> Result<(u16, String), SourceError> {
        if self.status != "ok" {
            return Err(SourceError::Transport(format!(
                "proxy reported '{}': {}",
                self.status, self.message
            )));
        }
        let solution = self
            .solution
            .ok_or_else(|| SourceError::Parse("proxy response without solution".to_string()))?;
        Ok((solution.status, solution.response))
    }
}

#[async_trait]
impl StatsPageFetcher for FlareSolverrFetcher {
    async fn fetch_stats_page(&self, url: &str) -> Result<(u16, String), SourceError> {
        let request = RequestGetDto {
            cmd: "request.get",
            url,
            max_timeout: self.max_timeout_ms,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?
            .json::<ProxyResponseDto>()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        response.into_page()
    }
}
