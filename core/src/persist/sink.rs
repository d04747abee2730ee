use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::PersistError;
use crate::score::TrustSnapshot;

/// One line of the append-only activity log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl ActivityLogEntry {
    pub fn new(timestamp: DateTime<Utc>, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            message: message.into(),
        }
    }

    /// `[<ISO-8601>] <message>\n`; embedded line breaks are flattened so one
    /// entry is always one line.
    pub fn to_line(&self) -> String {
        let message = self.message.replace(['\r', '\n'], " ");
        format!(
            "[{}] {}\n",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            message
        )
    }
}

/// Durable home of the trust snapshot and the activity log.
#[async_trait]
pub trait PersistenceSink: Send + Sync {
    fn name(&self) -> &str;

    /// Overwrites the stored snapshot (last writer wins).
    async fn persist(&self, snapshot: &TrustSnapshot) -> Result<(), PersistError>;

    async fn append_activity(&self, entry: &ActivityLogEntry) -> Result<(), PersistError>;

    /// `Ok(None)` when nothing was ever stored; `CorruptState` when something
    /// was stored but cannot be read back.
    async fn load(&self) -> Result<Option<TrustSnapshot>, PersistError>;

    /// Whole activity log as text; empty when nothing was logged yet.
    async fn read_activity(&self) -> Result<String, PersistError>;
}

/// Startup load that never fails the session: unreadable or corrupt state is
/// logged and treated as a fresh zero-violation table.
pub async fn load_or_default(sink: &dyn PersistenceSink) -> Option<TrustSnapshot> {
    match sink.load().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::warn!(
                target: "proctor.persist",
                sink = sink.name(),
                error = %e,
                "stored trust snapshot is unusable, starting from a clean violation table"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn activity_line_format() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let entry = ActivityLogEntry::new(ts, "Copy action detected");
        assert_eq!(
            entry.to_line(),
            "[2024-05-01T09:00:00.000Z] Copy action detected\n"
        );
    }

    #[test]
    fn multi_line_messages_stay_on_one_line() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let entry = ActivityLogEntry::new(ts, "first\nsecond");
        assert_eq!(entry.to_line().matches('\n').count(), 1);
        assert!(entry.to_line().ends_with("first second\n"));
    }
}
