//! Runtime configuration.
//!
//! Every option is a CLI flag and can also be set through an environment
//! variable (a `.env` file is loaded by the binary before parsing).
//! [`OverlayConfig`] is the validated form handed to constructors.

use std::time::Duration;

use clap::Parser;

use crate::{
    domain::EmbeddedJsonDelimiters,
    infrastructure::client::HelixCredentials,
    usecase::{ModeratorIdentity, PlaybackIntervals, StaticContent, StatsSourceSettings},
};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("history capacity must be at least 1")]
    ZeroHistoryCapacity,
    #[error("subscriber buffer must be at least 1")]
    ZeroSubscriberBuffer,
    #[error("stats profile URL is set but no unblocking proxy endpoint is configured")]
    MissingStatsProxy,
    #[error("stats delimiters must not be empty")]
    EmptyStatsDelimiter,
    #[error("{0} interval must be greater than zero")]
    ZeroInterval(&'static str),
}

#[derive(Parser, Debug, Clone)]
#[command(name = "butai-server")]
#[command(about = "Live stream overlay backend", long_about = None)]
pub struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "BUTAI_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "BUTAI_PORT", default_value = "8080")]
    pub port: u16,

    /// Access token for the currently-playing endpoint. Playback is disabled without it.
    #[arg(long, env = "SPOTIFY_ACCESS_TOKEN")]
    pub spotify_access_token: Option<String>,

    /// Poll interval while something is playing (seconds)
    #[arg(long, env = "PLAYBACK_ACTIVE_INTERVAL", default_value = "2")]
    pub playback_active_interval: u64,

    /// Poll interval while nothing is playing (seconds)
    #[arg(long, env = "PLAYBACK_IDLE_INTERVAL", default_value = "15")]
    pub playback_idle_interval: u64,

    /// Backoff after a failed playback fetch (seconds)
    #[arg(long, env = "PLAYBACK_ERROR_BACKOFF", default_value = "5")]
    pub playback_error_backoff: u64,

    /// Skip lyrics lookups
    #[arg(long, env = "LYRICS_DISABLED")]
    pub lyrics_disabled: bool,

    /// Profile page the stats are scraped from. Stats are disabled without it.
    #[arg(long, env = "STATS_PROFILE_URL")]
    pub stats_profile_url: Option<String>,

    /// Command endpoint of the unblocking proxy, e.g. http://localhost:8191/v1
    #[arg(long, env = "STATS_PROXY_URL")]
    pub stats_proxy_url: Option<String>,

    /// Refresh interval after a successful stats fetch (seconds)
    #[arg(long, env = "STATS_REFRESH_INTERVAL", default_value = "900")]
    pub stats_refresh_interval: u64,

    /// Backoff after a failed stats fetch (seconds)
    #[arg(long, env = "STATS_ERROR_BACKOFF", default_value = "10")]
    pub stats_error_backoff: u64,

    /// Marker preceding the embedded JSON document
    #[arg(long, env = "STATS_OPEN_DELIMITER", default_value = "<pre>")]
    pub stats_open_delimiter: String,

    /// Marker following the embedded JSON document
    #[arg(long, env = "STATS_CLOSE_DELIMITER", default_value = "</pre>")]
    pub stats_close_delimiter: String,

    /// Blocked terms, comma separated
    #[arg(long, env = "CHAT_BLOCKLIST", value_delimiter = ',')]
    pub blocklist: Vec<String>,

    /// Number of accepted chat messages kept for late joiners
    #[arg(long, env = "CHAT_HISTORY_CAPACITY", default_value = "100")]
    pub history_capacity: usize,

    /// Reject POST /api/chat/events with 503
    #[arg(long, env = "CHAT_INGEST_DISABLED")]
    pub chat_ingest_disabled: bool,

    #[arg(long, env = "BROADCASTER_ID")]
    pub broadcaster_id: Option<String>,

    #[arg(long, env = "MODERATOR_ID")]
    pub moderator_id: Option<String>,

    #[arg(long, env = "HELIX_CLIENT_ID")]
    pub helix_client_id: Option<String>,

    #[arg(long, env = "HELIX_ACCESS_TOKEN")]
    pub helix_access_token: Option<String>,

    /// Text shown under the main overlay
    #[arg(long, env = "OVERLAY_SUBTEXT", default_value = "")]
    pub subtext: String,

    /// Rotating slide texts, comma separated
    #[arg(long, env = "OVERLAY_SLIDES", value_delimiter = ',')]
    pub slides: Vec<String>,

    /// Queue length per WebSocket subscriber
    #[arg(long, env = "SUBSCRIBER_BUFFER", default_value = "64")]
    pub subscriber_buffer: usize,

    /// How long background tasks get to stop on shutdown (seconds)
    #[arg(long, env = "SHUTDOWN_GRACE", default_value = "5")]
    pub shutdown_grace: u64,
}

/// Stats source plus the proxy that fetches it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsConfig {
    pub settings: StatsSourceSettings,
    pub proxy_endpoint: String,
}

#[derive(Debug, Clone)]
pub struct OverlayConfig {
    pub host: String,
    pub port: u16,
    pub spotify_access_token: Option<String>,
    pub playback: PlaybackIntervals,
    pub lyrics_enabled: bool,
    pub stats: Option<StatsConfig>,
    pub blocklist: Vec<String>,
    pub history_capacity: usize,
    pub chat_ingest_enabled: bool,
    pub moderator: Option<ModeratorIdentity>,
    pub helix: Option<HelixCredentials>,
    pub static_content: StaticContent,
    pub subscriber_buffer: usize,
    pub shutdown_grace: Duration,
}

impl TryFrom<Args> for OverlayConfig {
    type Error = ConfigError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        if args.history_capacity == 0 {
            return Err(ConfigError::ZeroHistoryCapacity);
        }
        if args.subscriber_buffer == 0 {
            return Err(ConfigError::ZeroSubscriberBuffer);
        }

        let playback = PlaybackIntervals {
            active: seconds("playback active", args.playback_active_interval)?,
            idle: seconds("playback idle", args.playback_idle_interval)?,
            error_backoff: seconds("playback error", args.playback_error_backoff)?,
        };

        let stats = match non_blank(args.stats_profile_url) {
            Some(profile_url) => {
                let proxy_endpoint =
                    non_blank(args.stats_proxy_url).ok_or(ConfigError::MissingStatsProxy)?;
                if args.stats_open_delimiter.is_empty() || args.stats_close_delimiter.is_empty() {
                    return Err(ConfigError::EmptyStatsDelimiter);
                }
                let settings = StatsSourceSettings {
                    delimiters: EmbeddedJsonDelimiters {
                        open: args.stats_open_delimiter,
                        close: args.stats_close_delimiter,
                    },
                    refresh_interval: seconds("stats refresh", args.stats_refresh_interval)?,
                    error_backoff: seconds("stats error", args.stats_error_backoff)?,
                    ..StatsSourceSettings::new(profile_url)
                };
                Some(StatsConfig {
                    settings,
                    proxy_endpoint,
                })
            }
            None => None,
        };

        let moderator = match (non_blank(args.broadcaster_id), non_blank(args.moderator_id)) {
            (Some(broadcaster_id), Some(moderator_id)) => Some(ModeratorIdentity {
                broadcaster_id,
                moderator_id,
            }),
            (None, None) => None,
            _ => {
                tracing::warn!("Only one of broadcaster id / moderator id is set, ignoring both");
                None
            }
        };

        let helix = match (non_blank(args.helix_client_id), non_blank(args.helix_access_token)) {
            (Some(client_id), Some(access_token)) => Some(HelixCredentials {
                client_id,
                access_token,
            }),
            (None, None) => None,
            _ => {
                tracing::warn!("Incomplete Helix credentials, message deletion disabled");
                None
            }
        };

        Ok(Self {
            host: args.host,
            port: args.port,
            spotify_access_token: non_blank(args.spotify_access_token),
            playback,
            lyrics_enabled: !args.lyrics_disabled,
            stats,
            blocklist: trimmed_list(args.blocklist),
            history_capacity: args.history_capacity,
            chat_ingest_enabled: !args.chat_ingest_disabled,
            moderator,
            helix,
            static_content: StaticContent {
                subtext: args.subtext,
                slides: trimmed_list(args.slides),
            },
            subscriber_buffer: args.subscriber_buffer,
            shutdown_grace: Duration::from_secs(args.shutdown_grace),
        })
    }
}

fn seconds(name: &'static str, value: u64) -> Result<Duration, ConfigError> {
    if value == 0 {
        return Err(ConfigError::ZeroInterval(name));
    }
    Ok(Duration::from_secs(value))
}

// An empty environment variable means "not set".
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn trimmed_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}
