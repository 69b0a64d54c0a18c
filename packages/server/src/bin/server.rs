//! Overlay backend server.
//!
//! Polls the configured sources and pushes snapshots to overlay clients.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin butai-server
//! cargo run --bin butai-server -- --host 0.0.0.0 --port 3000 --blocklist foo,bar
//! ```

use std::{sync::Arc, time::Duration};

use butai_server::{
    config::{Args, OverlayConfig},
    domain::{Blocklist, SnapshotStore},
    infrastructure::{
        client::{FlareSolverrFetcher, LrclibClient, SpotifyPlaybackSource, WebhookChatProvider},
        message_pusher::BroadcastHub,
        repository::InMemorySnapshotStore,
    },
    ui::{Server, shutdown_signal},
    usecase::{
        LyricsResolver, ModerateChatUseCase, PlaybackPoller, PublishStaticContentUseCase,
        StatsPoller, spawn_supervised,
    },
};
use butai_shared::{logger::setup_logger, time::SystemClock};
use clap::Parser;
use tokio::sync::watch;

/// Timeout for direct API calls
const API_TIMEOUT: Duration = Duration::from_secs(10);
/// The unblocking proxy may take up to a minute to render a page
const PROXY_TIMEOUT: Duration = Duration::from_secs(90);
/// Capacity of the inbound chat event channel
const CHAT_EVENT_CAPACITY: usize = 256;

#[tokio::main]
async fn main() {
    // .env を読み込んでから RUST_LOG と CLI 引数を解釈する
    let dotenv = dotenvy::dotenv();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");
    if let Ok(path) = dotenv {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    let config = match OverlayConfig::try_from(Args::parse()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: OverlayConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Initialize dependencies in order:
    // 1. Shutdown flag
    // 2. SnapshotStore and BroadcastHub
    // 3. External clients
    // 4. UseCases and background tasks
    // 5. Server

    // 1. Shutdown flag, flipped by Ctrl+C / SIGTERM
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let shutdown_tx = Arc::new(shutdown_tx);
    let signal_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_tx.send_replace(true);
    });

    // 2. Create SnapshotStore and BroadcastHub
    let store: Arc<dyn SnapshotStore> = Arc::new(InMemorySnapshotStore::new());
    let hub = Arc::new(BroadcastHub::new(store, config.subscriber_buffer));

    // 3. Create external clients
    let http = reqwest::Client::builder().timeout(API_TIMEOUT).build()?;
    let chat_provider = Arc::new(WebhookChatProvider::new(
        http.clone(),
        config.helix.clone(),
        CHAT_EVENT_CAPACITY,
    ));

    // 4. Create UseCases and start background tasks
    PublishStaticContentUseCase::new(hub.clone())
        .execute(config.static_content.clone())
        .await;

    let moderation = Arc::new(ModerateChatUseCase::new(
        Blocklist::new(&config.blocklist),
        config.history_capacity,
        chat_provider.clone(),
        hub.clone(),
        config.moderator.clone(),
        Arc::new(SystemClock),
    ));
    moderation.publish_history().await;

    let mut tasks = vec![moderation.clone().spawn_listener(shutdown_rx.clone())];

    match config.spotify_access_token.clone() {
        Some(token) => {
            let source = Arc::new(SpotifyPlaybackSource::new(http.clone(), token));
            let lyrics = Arc::new(LyricsResolver::new(
                Arc::new(LrclibClient::new(http.clone())),
                config.lyrics_enabled,
            ));
            let publisher = hub.clone();
            let intervals = config.playback;
            tasks.push(spawn_supervised(
                move || {
                    PlaybackPoller::new(
                        source.clone(),
                        lyrics.clone(),
                        publisher.clone(),
                        intervals,
                    )
                },
                shutdown_rx.clone(),
            ));
        }
        None => tracing::warn!("No playback access token configured, playback disabled"),
    }

    match config.stats.clone() {
        Some(stats) => {
            let proxy_http = reqwest::Client::builder().timeout(PROXY_TIMEOUT).build()?;
            let fetcher = Arc::new(FlareSolverrFetcher::new(proxy_http, stats.proxy_endpoint));
            let publisher = hub.clone();
            let settings = stats.settings;
            tasks.push(spawn_supervised(
                move || StatsPoller::new(fetcher.clone(), publisher.clone(), settings.clone()),
                shutdown_rx.clone(),
            ));
        }
        None => tracing::info!("No stats profile configured, stats disabled"),
    }

    // 5. Create and run the server
    let chat_ingest = config.chat_ingest_enabled.then(|| chat_provider.clone());
    let server = Server::new(hub, chat_ingest, shutdown_rx);
    let result = server.run(config.host, config.port).await;
    // Also stops the background tasks when the server failed to start
    shutdown_tx.send_replace(true);

    // Background tasks get the grace period to finish, then the process exits regardless
    let wait_for_tasks = futures_util::future::join_all(tasks);
    if tokio::time::timeout(config.shutdown_grace, wait_for_tasks)
        .await
        .is_err()
    {
        tracing::warn!(
            "Background tasks did not stop within {:?}",
            config.shutdown_grace
        );
    }

    result
}
