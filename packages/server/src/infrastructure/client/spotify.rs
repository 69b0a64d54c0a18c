//! Spotify の再生中トラック取得クライアント

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::domain::{PlaybackRaw, PlaybackSource, SourceError, TrackItem};

use super::transport_error;

pub const CURRENTLY_PLAYING_URL: &str = "https://api.spotify.com/v1/me/player/currently-playing";

pub struct SpotifyPlaybackSource {
    http: reqwest::Client,
    endpoint: String,
    access_token: String,
}

impl SpotifyPlaybackSource {
    pub fn new(http: reqwest::Client, access_token: String) -> Self {
        Self::with_endpoint(http, CURRENTLY_PLAYING_URL.to_string(), access_token)
    }

    pub fn with_endpoint(http: reqwest::Client, endpoint: String, access_token: String) -> Self {
        Self {
            http,
            endpoint,
            access_token,
        }
    }
}

#[async_trait]
impl PlaybackSource for SpotifyPlaybackSource {
    async fn fetch_current_playback(&self) -> Result<PlaybackRaw, SourceError> {
        let response = self
            .http
            .get(&self.endpoint)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(transport_error)?;

        // 204: nothing is playing
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(PlaybackRaw::idle());
        }
        if !response.status().is_success() {
            return Err(SourceError::Status(response.status().as_u16()));
        }

        let body = response
            .json::<CurrentlyPlayingDto>()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;
        Ok(body.into())
    }
}

#[derive(Debug, Deserialize)]
struct CurrentlyPlayingDto {
    #[serde(default)]
    is_playing: bool,
    #[serde(default)]
    progress_ms: Option<i64>,
    #[serde(default)]
    timestamp: i64,
    #[serde(default)]
    item: Option<ItemDto>,
}

#[derive(Debug, Deserialize)]
struct ItemDto {
    #[serde(default)]
    name: String,
    #[serde(default)]
    duration_ms: i64,
    #[serde(default)]
    artists: Vec<NamedDto>,
    #[serde(default)]
    album: Option<AlbumDto>,
}

#[derive(Debug, Deserialize)]
struct NamedDto {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct AlbumDto {
    #[serde(default)]
    name: String,
    #[serde(default)]
    images: Vec<ImageDto>,
}

#[derive(Debug, Deserialize)]
struct ImageDto {
    url: String,
}

impl From<CurrentlyPlayingDto> for PlaybackRaw {
    fn from(dto: CurrentlyPlayingDto) -> Self {
        Self {
            is_playing: dto.is_playing,
            progress_ms: dto.progress_ms.unwrap_or(0),
            timestamp_ms: dto.timestamp,
            item: dto.item.map(|item| {
                let (album_title, album_art_urls) = match item.album {
                    Some(album) => (
                        album.name,
                        album.images.into_iter().map(|image| image.url).collect(),
                    ),
                    None => (String::new(), Vec::new()),
                };
                TrackItem {
                    title: item.name,
                    artists: item.artists.into_iter().map(|a| a.name).collect(),
                    album_title,
                    album_art_urls,
                    duration_ms: item.duration_ms,
                }
            }),
        }
    }
}
