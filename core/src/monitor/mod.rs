//! Single update loop around an [`Engine`].
//!
//! Producers (camera tick, audio tick, browser events arriving over HTTP) only
//! hold a cloneable [`MonitorHandle`]; every mutation goes through one queue
//! into one task, so violations are counted in the order they were queued.
//! The latest snapshot is published on a `watch` channel and never blocks the
//! loop.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::classifier::Sample;
use crate::engine::{Engine, SampleOutcome};
use crate::errors::EngineError;
use crate::score::TrustSnapshot;
use crate::violation::ViolationCategory;

enum MonitorCmd {
    Sample(Sample),
    Violation(ViolationCategory),
    LogEvent(String),
    Reset(oneshot::Sender<Result<TrustSnapshot, EngineError>>),
    Stop(oneshot::Sender<Result<TrustSnapshot, EngineError>>),
}

#[derive(Clone)]
pub struct MonitorHandle {
    tx: mpsc::Sender<MonitorCmd>,
    snapshot_rx: watch::Receiver<TrustSnapshot>,
    session_id: Arc<str>,
}

impl MonitorHandle {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub async fn submit(&self, sample: Sample) -> Result<(), EngineError> {
        self.send(MonitorCmd::Sample(sample)).await
    }

    pub async fn submit_violation(&self, category: ViolationCategory) -> Result<(), EngineError> {
        self.send(MonitorCmd::Violation(category)).await
    }

    /// Queues a client-reported activity line. It goes through the same log
    /// throttle as violation lines, so it may be dropped.
    pub async fn log_event(&self, message: impl Into<String>) -> Result<(), EngineError> {
        self.send(MonitorCmd::LogEvent(message.into())).await
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> TrustSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TrustSnapshot> {
        self.snapshot_rx.clone()
    }

    pub async fn reset(&self) -> Result<TrustSnapshot, EngineError> {
        let (ack, done) = oneshot::channel();
        self.send(MonitorCmd::Reset(ack)).await?;
        done.await.map_err(|_| EngineError::SessionClosed)?
    }

    /// Stops the loop once everything queued before this call is processed,
    /// and returns the final snapshot after it has been flushed to the sink.
    pub async fn stop(&self) -> Result<TrustSnapshot, EngineError> {
        let (ack, done) = oneshot::channel();
        self.send(MonitorCmd::Stop(ack)).await?;
        done.await.map_err(|_| EngineError::SessionClosed)?
    }

    async fn send(&self, cmd: MonitorCmd) -> Result<(), EngineError> {
        self.tx
            .send(cmd)
            .await
            .map_err(|_| EngineError::SessionClosed)
    }
}

/// Moves `engine` into its own task. Must be called inside a tokio runtime.
pub fn spawn_monitor(engine: Engine, queue_capacity: usize) -> (MonitorHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(queue_capacity.max(1));
    let (snapshot_tx, snapshot_rx) = watch::channel(engine.snapshot().clone());
    let session_id: Arc<str> = Arc::from(engine.session_id());

    let join = tokio::spawn(run_loop(engine, rx, snapshot_tx));

    (
        MonitorHandle {
            tx,
            snapshot_rx,
            session_id,
        },
        join,
    )
}

async fn run_loop(
    mut engine: Engine,
    mut rx: mpsc::Receiver<MonitorCmd>,
    snapshot_tx: watch::Sender<TrustSnapshot>,
) {
    tracing::debug!(
        target: "proctor.monitor",
        session_id = %engine.session_id(),
        "monitor loop started"
    );

    while let Some(cmd) = rx.recv().await {
        match cmd {
            MonitorCmd::Sample(sample) => {
                let outcome = engine.process(&sample);
                publish(&snapshot_tx, outcome);
            }
            MonitorCmd::Violation(category) => {
                let outcome = engine.submit(category);
                publish(&snapshot_tx, outcome);
            }
            MonitorCmd::LogEvent(message) => {
                if let Err(e) = engine.log_event(message) {
                    tracing::warn!(target: "proctor.monitor", error = %e, "log event not applied");
                }
            }
            MonitorCmd::Reset(ack) => {
                let result = engine.reset();
                if let Ok(snapshot) = &result {
                    snapshot_tx.send_replace(snapshot.clone());
                }
                let _ = ack.send(result);
            }
            MonitorCmd::Stop(ack) => {
                rx.close();
                let result = engine.close().await;
                let _ = ack.send(result);
                break;
            }
        }
    }

    // Every handle dropped without an explicit stop.
    if !engine.is_closed() {
        if let Err(e) = engine.close().await {
            tracing::error!(
                target: "proctor.monitor",
                error = %e,
                "failed to flush final trust snapshot"
            );
        }
    }
    tracing::debug!(target: "proctor.monitor", "monitor loop stopped");
}

fn publish(snapshot_tx: &watch::Sender<TrustSnapshot>, outcome: Result<SampleOutcome, EngineError>) {
    match outcome {
        Ok(SampleOutcome::Accepted { snapshot, .. }) => {
            snapshot_tx.send_replace(snapshot);
        }
        Ok(_) => {}
        Err(e) => {
            tracing::warn!(target: "proctor.monitor", error = %e, "sample not applied");
        }
    }
}
