use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use crate::config::PersistenceConfig;
use crate::errors::PersistError;
use crate::score::TrustSnapshot;

use super::sink::{ActivityLogEntry, PersistenceSink};

enum WriterCmd<T> {
    Write(T),
    Flush(oneshot::Sender<()>),
}

/// Handle to the background snapshot and activity writers.
///
/// `submit_*` never waits: a full queue drops the item and bumps
/// [`dropped_count`](Self::dropped_count). Snapshot and activity writes run on
/// separate tasks so a slow snapshot write never holds up the log.
#[derive(Clone)]
pub struct PersistenceTx {
    snapshots: mpsc::Sender<WriterCmd<TrustSnapshot>>,
    activity: mpsc::Sender<WriterCmd<ActivityLogEntry>>,
    dropped: Arc<AtomicU64>,
    failed: Arc<AtomicU64>,
}

impl PersistenceTx {
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn failed_count(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn submit_snapshot(&self, snapshot: TrustSnapshot) {
        self.try_enqueue(&self.snapshots, WriterCmd::Write(snapshot), "snapshot");
    }

    pub fn submit_activity(&self, entry: ActivityLogEntry) {
        self.try_enqueue(&self.activity, WriterCmd::Write(entry), "activity");
    }

    /// Queues the snapshot even if the queue is full, then waits until both
    /// writers have drained everything submitted before it.
    pub async fn persist_now(&self, snapshot: TrustSnapshot) -> Result<(), PersistError> {
        self.snapshots
            .send(WriterCmd::Write(snapshot))
            .await
            .map_err(|_| PersistError::ChannelClosed)?;
        self.flush().await
    }

    pub async fn flush(&self) -> Result<(), PersistError> {
        let (snap_ack, snap_done) = oneshot::channel();
        let (log_ack, log_done) = oneshot::channel();
        self.snapshots
            .send(WriterCmd::Flush(snap_ack))
            .await
            .map_err(|_| PersistError::ChannelClosed)?;
        self.activity
            .send(WriterCmd::Flush(log_ack))
            .await
            .map_err(|_| PersistError::ChannelClosed)?;
        snap_done.await.map_err(|_| PersistError::ChannelClosed)?;
        log_done.await.map_err(|_| PersistError::ChannelClosed)
    }

    fn try_enqueue<T>(&self, tx: &mpsc::Sender<WriterCmd<T>>, cmd: WriterCmd<T>, kind: &str) {
        match tx.try_send(cmd) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                let count = self.dropped.fetch_add(1, Ordering::Relaxed);
                // Log every 100 dropped items to avoid log spam
                if count % 100 == 0 {
                    tracing::warn!(
                        target: "proctor.persist",
                        kind,
                        dropped_total = count + 1,
                        "persistence queue full, dropping"
                    );
                }
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(
                    target: "proctor.persist",
                    kind,
                    "persistence writer closed, send failed"
                );
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct RetryPolicy {
    attempts: u32,
    backoff: Duration,
}

/// Spawns both writer tasks. Must be called inside a tokio runtime.
pub fn start_persistence(sink: Arc<dyn PersistenceSink>, cfg: &PersistenceConfig) -> PersistenceTx {
    let capacity = cfg.channel_capacity.max(1);
    let (snap_tx, snap_rx) = mpsc::channel(capacity);
    let (log_tx, log_rx) = mpsc::channel(capacity);
    let failed = Arc::new(AtomicU64::new(0));
    let retry = RetryPolicy {
        attempts: cfg.retry_attempts,
        backoff: Duration::from_millis(cfg.retry_backoff_ms),
    };

    tracing::info!(
        target: "proctor.persist",
        sink = sink.name(),
        channel_capacity = capacity,
        retry_attempts = retry.attempts,
        "persistence writers started"
    );

    tokio::spawn(run_snapshot_writer(
        sink.clone(),
        snap_rx,
        failed.clone(),
        retry,
    ));
    tokio::spawn(run_activity_writer(sink, log_rx, failed.clone()));

    PersistenceTx {
        snapshots: snap_tx,
        activity: log_tx,
        dropped: Arc::new(AtomicU64::new(0)),
        failed,
    }
}

async fn run_snapshot_writer(
    sink: Arc<dyn PersistenceSink>,
    mut rx: mpsc::Receiver<WriterCmd<TrustSnapshot>>,
    failed: Arc<AtomicU64>,
    retry: RetryPolicy,
) {
    while let Some(cmd) = rx.recv().await {
        let mut latest = match cmd {
            WriterCmd::Write(snapshot) => snapshot,
            WriterCmd::Flush(ack) => {
                let _ = ack.send(());
                continue;
            }
        };

        // Queued snapshots are superseded by newer ones; only the newest
        // before the next flush marker needs to reach disk.
        let mut flush_ack = None;
        while let Ok(next) = rx.try_recv() {
            match next {
                WriterCmd::Write(newer) => latest = newer,
                WriterCmd::Flush(ack) => {
                    flush_ack = Some(ack);
                    break;
                }
            }
        }

        if let Err(e) = persist_with_retry(sink.as_ref(), &latest, retry).await {
            failed.fetch_add(1, Ordering::Relaxed);
            tracing::error!(
                target: "proctor.persist",
                error = %e,
                score = latest.score,
                "giving up on trust snapshot write"
            );
        }

        if let Some(ack) = flush_ack {
            let _ = ack.send(());
        }
    }
    tracing::debug!(target: "proctor.persist", "snapshot writer stopped");
}

async fn persist_with_retry(
    sink: &dyn PersistenceSink,
    snapshot: &TrustSnapshot,
    retry: RetryPolicy,
) -> Result<(), PersistError> {
    let mut attempt = 0;
    loop {
        match sink.persist(snapshot).await {
            Ok(()) => return Ok(()),
            Err(e) if e.is_retryable() && attempt < retry.attempts => {
                attempt += 1;
                tracing::warn!(
                    target: "proctor.persist",
                    error = %e,
                    attempt,
                    "trust snapshot write failed, retrying"
                );
                tokio::time::sleep(retry.backoff * attempt).await;
            }
            Err(e) => return Err(e),
        }
    }
}

async fn run_activity_writer(
    sink: Arc<dyn PersistenceSink>,
    mut rx: mpsc::Receiver<WriterCmd<ActivityLogEntry>>,
    failed: Arc<AtomicU64>,
) {
    while let Some(cmd) = rx.recv().await {
        match cmd {
            WriterCmd::Write(entry) => {
                if let Err(e) = sink.append_activity(&entry).await {
                    failed.fetch_add(1, Ordering::Relaxed);
                    tracing::error!(
                        target: "proctor.persist",
                        error = %e,
                        message = %entry.message,
                        "failed to append activity log entry"
                    );
                }
            }
            WriterCmd::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
    tracing::debug!(target: "proctor.persist", "activity writer stopped");
}
