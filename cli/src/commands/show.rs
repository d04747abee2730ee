use proctor_core::api::{
    load_or_default, AppConfig, JsonFileSink, TrustSnapshot, ViolationLedger, WeightTable,
};

use crate::commands::cli::ShowArgs;
use crate::commands::render_snapshot;

pub async fn handle_show(args: ShowArgs, cfg: &AppConfig) -> anyhow::Result<()> {
    let snapshot = stored_snapshot(cfg).await;
    print!("{}", render_snapshot(&snapshot, args.format)?);
    Ok(())
}

/// Persisted snapshot, or the zero-violation table when nothing usable is stored.
pub async fn stored_snapshot(cfg: &AppConfig) -> TrustSnapshot {
    let sink = JsonFileSink::from_config(&cfg.persistence);
    match load_or_default(&sink).await {
        Some(snapshot) => snapshot,
        None => {
            let ledger = ViolationLedger::new(&WeightTable::from(&cfg.weights));
            TrustSnapshot::from_counters(ledger.snapshot())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proctor_core::api::{PersistenceSink, TrustLabel, ViolationCategory};

    fn config_in(dir: &tempfile::TempDir) -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.persistence.data_dir = dir.path().display().to_string();
        cfg
    }

    #[tokio::test]
    async fn missing_store_shows_clean_table() {
        let dir = tempfile::tempdir().unwrap();
        let snap = stored_snapshot(&config_in(&dir)).await;
        assert_eq!(snap.score, 10.0);
        assert_eq!(snap.label, TrustLabel::HighTrust);
    }

    #[tokio::test]
    async fn stored_snapshot_is_shown_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(&dir);
        let mut ledger = ViolationLedger::new(&WeightTable::default());
        ledger.increment(ViolationCategory::MultipleFaces).unwrap();
        let stored = TrustSnapshot::from_counters(ledger.snapshot());
        JsonFileSink::from_config(&cfg.persistence)
            .persist(&stored)
            .await
            .unwrap();

        assert_eq!(stored_snapshot(&cfg).await, stored);
    }
}
