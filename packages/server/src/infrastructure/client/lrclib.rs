//! LRCLIB 歌詞検索クライアント

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{LyricsCandidate, LyricsError, LyricsSearch};

pub const LRCLIB_SEARCH_URL: &str = "https://lrclib.net/api/search";

pub struct LrclibClient {
    http: reqwest::Client,
    endpoint: String,
}

impl LrclibClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_endpoint(http, LRCLIB_SEARCH_URL.to_string())
    }

    pub fn with_endpoint(http: reqwest::Client, endpoint: String) -> Self {
        Self { http, endpoint }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResultDto {
    #[serde(default)]
    synced_lyrics: Option<String>,
}

impl From<SearchResultDto> for LyricsCandidate {
    fn from(dto: SearchResultDto) -> Self {
        Self {
            synced_lyrics: dto.synced_lyrics,
        }
    }
}

#[async_trait]
impl LyricsSearch for LrclibClient {
    async fn search_lyrics(
        &self,
        track: &str,
        artist: &str,
    ) -> Result<Vec<LyricsCandidate>, LyricsError> {
        let results = self
            .http
            .get(&self.endpoint)
            .query(&[("track_name", track), ("artist_name", artist)])
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| LyricsError(e.to_string()))?
            .json::<Vec<SearchResultDto>>()
            .await
            .map_err(|e| LyricsError(e.to_string()))?;

        Ok(results.into_iter().map(LyricsCandidate::from).collect())
    }
}
