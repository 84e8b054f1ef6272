use std::future::Future;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::interval;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::WatchConfig;
use crate::db::Database;
use crate::error::LookoutResult;
use crate::metrics::LatestValues;
use crate::models::{Metric, Service};
use crate::repo::{MetricRepository, Repository, ServiceRepository};

/// Size of the notification buffer. A notification that arrives while the
/// buffer is full is dropped; the next poll supersedes it anyway.
const CHANNEL_CAPACITY: usize = 16;

/// A live subscription: a background task polls on a fixed interval and
/// delivers each successful result here. `close()` (or drop) tears the
/// task down.
pub struct WatchHandle<T> {
    rx: mpsc::Receiver<T>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl<T> WatchHandle<T> {
    /// The next notification, or `None` once the subscription is closed.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Stop the background task. Idempotent.
    pub fn close(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.rx.close();
    }
}

impl<T> Drop for WatchHandle<T> {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Open a subscription over an arbitrary fetch function.
///
/// The fetch runs once immediately, then on every interval tick. Fetch
/// errors are logged and the loop continues; they are not surfaced to the
/// receiver.
pub fn open<T, F, Fut>(poll_interval: Duration, fetch: F) -> WatchHandle<T>
where
    T: Send + 'static,
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = LookoutResult<T>> + Send,
{
    let (_wakeup_tx, wakeup_rx) = mpsc::channel(1);
    open_with_wakeup(poll_interval, wakeup_rx, fetch)
}

/// Like [`open`], but with a wakeup channel: a message on `wakeup` runs
/// the fetch immediately instead of waiting out the current interval.
/// Change notifications feed this channel so a fresh insert shows up
/// before the next scheduled poll.
pub fn open_with_wakeup<T, F, Fut>(
    poll_interval: Duration,
    wakeup: mpsc::Receiver<()>,
    mut fetch: F,
) -> WatchHandle<T>
where
    T: Send + 'static,
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = LookoutResult<T>> + Send,
{
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
    let mut wakeup = Some(wakeup);

    tokio::spawn(async move {
        let mut ticker = interval(poll_interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match fetch().await {
                        Ok(value) => {
                            if tx.try_send(value).is_err() {
                                debug!("Watch notification dropped: receiver busy or gone");
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "Watch fetch failed; will poll again");
                        }
                    }
                }
                woken = next_wakeup(&mut wakeup) => {
                    match woken {
                        Some(()) => {
                            debug!("Change notification received; fetching early");
                            match fetch().await {
                                Ok(value) => {
                                    if tx.try_send(value).is_err() {
                                        debug!("Watch notification dropped: receiver busy or gone");
                                    }
                                }
                                Err(e) => {
                                    warn!(error = %e, "Watch fetch failed; will poll again");
                                }
                            }
                            // The early fetch stands in for the pending tick.
                            ticker.reset();
                        }
                        None => {
                            // Wakeup source gone; fall back to pure polling.
                            wakeup = None;
                        }
                    }
                }
                _ = &mut shutdown_rx => {
                    info!("Watch subscription closed");
                    break;
                }
            }
        }
    });

    WatchHandle {
        rx,
        shutdown: Some(shutdown_tx),
    }
}

async fn next_wakeup(rx: &mut Option<mpsc::Receiver<()>>) -> Option<()> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Forward `metrics_changed` notifications for one service into a wakeup
/// channel. The listener task stops when its consumer goes away or the
/// connection drops; polling continues either way.
async fn spawn_change_forwarder(
    db: &Database,
    service_id: Uuid,
    wakeup_tx: mpsc::Sender<()>,
) -> LookoutResult<()> {
    let mut listener = sqlx::postgres::PgListener::connect_with(db.pool()).await?;
    listener.listen("metrics_changed").await?;

    tokio::spawn(async move {
        loop {
            match listener.recv().await {
                Ok(notification) => {
                    match notification.payload().parse::<Uuid>() {
                        Ok(changed) if changed == service_id => {
                            if wakeup_tx.send(()).await.is_err() {
                                debug!("Wakeup consumer gone; stopping change listener");
                                break;
                            }
                        }
                        Ok(_) => {} // another service's metrics
                        Err(_) => {
                            warn!(
                                payload = notification.payload(),
                                "Unparseable change payload"
                            );
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Listener connection lost; polling continues");
                    break;
                }
            }
        }
    });

    Ok(())
}

/// Subscribe to the recent metric rows of one service. Polls on the
/// configured metrics interval and re-fetches early on a change
/// notification for that service.
pub async fn watch_service_metrics(
    db: &Database,
    service_id: Uuid,
    watch: &WatchConfig,
    limit: i64,
) -> LookoutResult<WatchHandle<Vec<Metric>>> {
    let (wakeup_tx, wakeup_rx) = mpsc::channel(1);
    spawn_change_forwarder(db, service_id, wakeup_tx).await?;

    let pool = db.pool().clone();
    Ok(open_with_wakeup(watch.metrics_poll(), wakeup_rx, move || {
        let repo = MetricRepository::new(pool.clone());
        async move { repo.recent_for_service(service_id, limit).await }
    }))
}

/// Subscribe to the reduced current values of one service, with the same
/// poll-plus-early-wakeup behavior as [`watch_service_metrics`].
pub async fn watch_latest_values(
    db: &Database,
    service_id: Uuid,
    watch: &WatchConfig,
) -> LookoutResult<WatchHandle<LatestValues>> {
    let (wakeup_tx, wakeup_rx) = mpsc::channel(1);
    spawn_change_forwarder(db, service_id, wakeup_tx).await?;

    let pool = db.pool().clone();
    Ok(open_with_wakeup(watch.metrics_poll(), wakeup_rx, move || {
        let repo = MetricRepository::new(pool.clone());
        async move {
            let rows = repo.latest_for_service(service_id).await?;
            Ok(LatestValues::from_metrics(&rows))
        }
    }))
}

/// Subscribe to the service list. Pure polling; there is no change
/// trigger on the services table.
pub fn watch_services(db: &Database, watch: &WatchConfig) -> WatchHandle<Vec<Service>> {
    let pool = db.pool().clone();
    open(watch.services_poll(), move || {
        let repo = ServiceRepository::new(pool.clone());
        async move { repo.get_all().await }
    })
}
