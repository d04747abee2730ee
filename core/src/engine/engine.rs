use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::classifier::{Sample, SignalClassifier};
use crate::clock::Clock;
use crate::config::AppConfig;
use crate::debounce::{DebounceGate, LogThrottle};
use crate::errors::EngineError;
use crate::ledger::ViolationLedger;
use crate::persist::{ActivityLogEntry, PersistenceTx};
use crate::score::TrustSnapshot;
use crate::violation::{ViolationCategory, WeightTable};

use super::types::SampleOutcome;

/// One monitored session.
///
/// Owns every piece of mutable proctoring state; `process`, `submit` and
/// `reset` are the only paths that change it. None of them wait on I/O:
/// durable writes are handed to the [`PersistenceTx`] queues.
pub struct Engine {
    session_id: String,
    clock: Arc<dyn Clock>,
    classifier: SignalClassifier,
    gate: DebounceGate,
    throttle: LogThrottle,
    ledger: ViolationLedger,
    current: TrustSnapshot,
    persistence: Option<PersistenceTx>,
    closed: bool,
}

impl Engine {
    pub fn new(cfg: &AppConfig, clock: Arc<dyn Clock>, persistence: Option<PersistenceTx>) -> Self {
        Self::restore(cfg, clock, persistence, None)
    }

    /// Starts a session on top of a previously persisted snapshot. Counts come
    /// from `previous`, weights from `cfg`, and the score is recomputed.
    pub fn restore(
        cfg: &AppConfig,
        clock: Arc<dyn Clock>,
        persistence: Option<PersistenceTx>,
        previous: Option<&TrustSnapshot>,
    ) -> Self {
        let started_at = clock.now();
        let weights = WeightTable::from(&cfg.weights);
        let mut ledger = ViolationLedger::new(&weights);
        if let Some(previous) = previous {
            ledger.restore(&previous.violations);
        }
        let current = TrustSnapshot::from_counters(ledger.snapshot());

        let session_id = uuid::Uuid::new_v4().to_string();
        tracing::info!(
            target: "proctor.engine",
            session_id = %session_id,
            restored = previous.is_some(),
            score = current.score,
            label = %current.label,
            "proctoring session started"
        );

        Self {
            session_id,
            classifier: SignalClassifier::new(&cfg.classifier, started_at),
            gate: DebounceGate::new(&cfg.debounce),
            throttle: LogThrottle::new(cfg.debounce.log_window_ms),
            ledger,
            current,
            persistence,
            clock,
            closed: false,
        }
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn snapshot(&self) -> &TrustSnapshot {
        &self.current
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Classify one raw sample and, if it is an accepted violation, count it.
    pub fn process(&mut self, sample: &Sample) -> Result<SampleOutcome, EngineError> {
        self.ensure_open()?;
        let now = self.clock.now();

        match self.classifier.try_classify(sample, now) {
            Err(reason) => {
                tracing::debug!(
                    target: "proctor.engine",
                    ?sample,
                    ?reason,
                    "sample skipped"
                );
                Ok(SampleOutcome::Skipped(reason))
            }
            Ok(None) => Ok(SampleOutcome::NoViolation),
            Ok(Some(category)) => self.accept_candidate(category, now),
        }
    }

    /// Feed an already classified candidate (still subject to debouncing).
    pub fn submit(&mut self, category: ViolationCategory) -> Result<SampleOutcome, EngineError> {
        self.ensure_open()?;
        let now = self.clock.now();
        self.accept_candidate(category, now)
    }

    /// Queue a free-form activity line (session start, question flagged...).
    /// Not subject to the violation log throttle.
    pub fn log_activity(&self, message: impl Into<String>) {
        if let Some(tx) = &self.persistence {
            tx.submit_activity(ActivityLogEntry::new(self.clock.now(), message));
        }
    }

    /// Client-reported activity line. Shares the log throttle with violation
    /// lines; returns whether the line was admitted.
    pub fn log_event(&mut self, message: impl Into<String>) -> Result<bool, EngineError> {
        self.ensure_open()?;
        let now = self.clock.now();
        if !self.throttle.admit(now) {
            tracing::trace!(target: "proctor.engine", "log event throttled");
            return Ok(false);
        }
        if let Some(tx) = &self.persistence {
            tx.submit_activity(ActivityLogEntry::new(now, message));
        }
        Ok(true)
    }

    /// Explicit session reset: the only operation that lowers counts.
    pub fn reset(&mut self) -> Result<TrustSnapshot, EngineError> {
        self.ensure_open()?;
        let now = self.clock.now();
        self.ledger.reset();
        self.gate.reset();
        self.throttle.reset();
        self.classifier.reset(now);
        self.current = TrustSnapshot::from_counters(self.ledger.snapshot());

        if let Some(tx) = &self.persistence {
            tx.submit_snapshot(self.current.clone());
            tx.submit_activity(ActivityLogEntry::new(now, "Session reset"));
        }
        tracing::info!(
            target: "proctor.engine",
            session_id = %self.session_id,
            "session reset"
        );
        Ok(self.current.clone())
    }

    /// Stops accepting samples and waits until the final snapshot is on disk.
    /// Calling it again is a no-op that returns the same snapshot.
    pub async fn close(&mut self) -> Result<TrustSnapshot, EngineError> {
        if self.closed {
            return Ok(self.current.clone());
        }
        self.closed = true;

        if let Some(tx) = &self.persistence {
            tx.submit_activity(ActivityLogEntry::new(self.clock.now(), "Session closed"));
            tx.persist_now(self.current.clone()).await?;
            if tx.dropped_count() > 0 || tx.failed_count() > 0 {
                tracing::warn!(
                    target: "proctor.engine",
                    dropped = tx.dropped_count(),
                    failed = tx.failed_count(),
                    "some persistence writes were lost during the session"
                );
            }
        }

        tracing::info!(
            target: "proctor.engine",
            session_id = %self.session_id,
            score = self.current.score,
            label = %self.current.label,
            "proctoring session closed"
        );
        Ok(self.current.clone())
    }

    fn ensure_open(&self) -> Result<(), EngineError> {
        if self.closed {
            Err(EngineError::SessionClosed)
        } else {
            Ok(())
        }
    }

    fn accept_candidate(
        &mut self,
        category: ViolationCategory,
        now: DateTime<Utc>,
    ) -> Result<SampleOutcome, EngineError> {
        if !self.gate.accept(category, now) {
            tracing::trace!(
                target: "proctor.engine",
                category = %category,
                "candidate suppressed by debounce window"
            );
            return Ok(SampleOutcome::Suppressed(category));
        }

        self.classifier.confirm(category);
        let count = self.ledger.increment(category).inspect_err(|e| {
            tracing::error!(target: "proctor.engine", error = %e, "ledger rejected category");
        })?;
        let snapshot = TrustSnapshot::from_counters(self.ledger.snapshot());
        self.current = snapshot.clone();

        let log_line = self.throttle.admit(now);
        if let Some(tx) = &self.persistence {
            tx.submit_snapshot(snapshot.clone());
            if log_line {
                tx.submit_activity(ActivityLogEntry::new(now, category.log_message()));
            }
        }

        tracing::info!(
            target: "proctor.engine",
            category = %category,
            count,
            score = snapshot.score,
            label = %snapshot.label,
            "violation recorded"
        );

        Ok(SampleOutcome::Accepted {
            category,
            count,
            snapshot,
        })
    }
}
