//! `proctor replay`: re-run a recorded sample stream offline.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use proctor_core::api::{AppConfig, Engine, ManualClock, Sample, SampleOutcome, TrustSnapshot};
use serde::{Deserialize, Serialize};

use crate::commands::cli::{OutputFormat, ReplayArgs};
use crate::commands::render_snapshot;

#[derive(Debug, Deserialize)]
struct ReplayRecord {
    at: DateTime<Utc>,
    #[serde(flatten)]
    sample: Sample,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayStats {
    pub records: u64,
    pub accepted: u64,
    pub suppressed: u64,
    pub skipped: u64,
    pub malformed: u64,
}

#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub stats: ReplayStats,
    pub snapshot: TrustSnapshot,
}

pub fn handle_replay(args: ReplayArgs, cfg: &AppConfig) -> anyhow::Result<()> {
    let file = File::open(&args.samples)
        .with_context(|| format!("cannot open sample file {}", args.samples.display()))?;
    let report = replay_reader(BufReader::new(file), cfg)?;

    tracing::info!(
        target: "proctor.engine",
        records = report.stats.records,
        accepted = report.stats.accepted,
        suppressed = report.stats.suppressed,
        malformed = report.stats.malformed,
        "replay finished"
    );

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            let s = &report.stats;
            println!(
                "{} records: {} accepted, {} suppressed, {} skipped, {} malformed",
                s.records, s.accepted, s.suppressed, s.skipped, s.malformed
            );
            print!("{}", render_snapshot(&report.snapshot, OutputFormat::Text)?);
        }
    }
    Ok(())
}

/// Drives a fresh engine with a clock that follows the recorded timestamps.
/// Lines that do not parse are counted and skipped.
pub fn replay_reader(reader: impl BufRead, cfg: &AppConfig) -> anyhow::Result<ReplayReport> {
    let mut records = Vec::new();
    let mut stats = ReplayStats::default();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.context("failed to read sample file")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<ReplayRecord>(line) {
            Ok(record) => records.push(record),
            Err(e) => {
                stats.malformed += 1;
                tracing::warn!(line = idx + 1, error = %e, "skipping malformed replay record");
            }
        }
    }

    let start = records.first().map_or_else(Utc::now, |r| r.at);
    let clock = Arc::new(ManualClock::new(start));
    let mut engine = Engine::new(cfg, clock.clone(), None);

    for record in &records {
        stats.records += 1;
        clock.set(record.at);
        match engine.process(&record.sample)? {
            SampleOutcome::Accepted { .. } => stats.accepted += 1,
            SampleOutcome::Suppressed(_) => stats.suppressed += 1,
            SampleOutcome::Skipped(_) => stats.skipped += 1,
            SampleOutcome::NoViolation => {}
        }
    }

    Ok(ReplayReport {
        stats,
        snapshot: engine.snapshot().clone(),
    })
}
