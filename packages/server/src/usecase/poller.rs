//! ポーリング → 差分判定 → publish の共通ループ
//!
//! ## 設計ノート
//!
//! 各ソースは [`SourcePoller::poll_once`] を実装する（取得し、前回 publish した値と比べ、
//! 必要なら publish して、次の周期までの待ち時間を返す）。
//! タイマーとエラー境界は [`run_poller`] が持つ。
//! シャットダウンは待機中にだけ確認し、実行中の取得は完了（またはタイムアウト）まで走らせる。

use std::time::Duration;

use async_trait::async_trait;
use tokio::{sync::watch, task::JoinHandle};

use crate::domain::SourceError;

/// バックグラウンドタスク共通のシャットダウンフラグ（`true` で停止）
pub type ShutdownSignal = watch::Receiver<bool>;

/// panic したポーラーを再起動するまでの待ち時間
const RESTART_DELAY: Duration = Duration::from_secs(1);

#[async_trait]
pub trait SourcePoller: Send + 'static {
    /// ログに出す短い名前
    fn name(&self) -> &'static str;

    /// 失敗した周期の後の待ち時間
    fn error_backoff(&self) -> Duration;

    /// 1 周期を実行し、次の周期までの待ち時間を返す
    async fn poll_once(&mut self) -> Result<Duration, SourceError>;
}

/// シャットダウンまで `poller` を回す。周期の失敗でループは終わらない
pub async fn run_poller<P: SourcePoller>(mut poller: P, mut shutdown: ShutdownSignal) {
    let name = poller.name();
    tracing::info!("Starting {} poller", name);

    while !*shutdown.borrow() {
        let delay = match poller.poll_once().await {
            Ok(delay) => delay,
            Err(e) => {
                let backoff = poller.error_backoff();
                tracing::warn!("{} poll failed: {} (retrying in {:?})", name, e, backoff);
                backoff
            }
        };

        if !sleep_or_shutdown(delay, &mut shutdown).await {
            break;
        }
    }

    tracing::info!("{} poller stopped", name);
}

/// ポーラーを専用タスクで動かし、panic したら `factory` で作り直して再起動する
///
/// シャットダウンでポーラーが止まると終了する。
pub fn spawn_supervised<P, F>(factory: F, shutdown: ShutdownSignal) -> JoinHandle<()>
where
    P: SourcePoller,
    F: Fn() -> P + Send + Sync + 'static,
{
    tokio::spawn(async move {
        loop {
            let poller = factory();
            let name = poller.name();

            match tokio::spawn(run_poller(poller, shutdown.clone())).await {
                Ok(()) => break,
                Err(e) if e.is_panic() => {
                    tracing::error!("{} poller panicked, restarting in {:?}", name, RESTART_DELAY);
                    let mut shutdown = shutdown.clone();
                    if !sleep_or_shutdown(RESTART_DELAY, &mut shutdown).await {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!("{} poller task cancelled: {}", name, e);
                    break;
                }
            }
        }
    })
}

/// `delay` だけ待つ。先にシャットダウンされたら `false`
pub async fn sleep_or_shutdown(delay: Duration, shutdown: &mut ShutdownSignal) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(delay) => true,
        _ = wait_for_shutdown(shutdown) => false,
    }
}

/// シャットダウンフラグが立つまで待つ（送信側の破棄もシャットダウン扱い）
pub async fn wait_for_shutdown(shutdown: &mut ShutdownSignal) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}
