//! End-to-end scenarios for the trust-score engine, driven by a manual clock.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use proctor_core::api::{
    AppConfig, Engine, ManualClock, Sample, SampleOutcome, TrustLabel, ViolationCategory,
};

fn session() -> (Engine, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
    ));
    let engine = Engine::new(&AppConfig::default(), clock.clone(), None);
    (engine, clock)
}

#[test]
fn continuous_absence_counts_once_per_window() {
    let (mut engine, clock) = session();

    // Camera ticks every 2s with nobody in frame for 20s.
    let mut accepted = 0;
    for _ in 0..10 {
        clock.advance_ms(2_000);
        if engine.process(&Sample::FaceCount { count: 0 }).unwrap().is_accepted() {
            accepted += 1;
        }
    }

    // Fires at 4s (grace passed), then at 10s and 16s (5s windows).
    assert_eq!(accepted, 3);
    assert_eq!(engine.snapshot().count_of(ViolationCategory::FaceMissing), 3);
    assert_eq!(engine.snapshot().score, 4.0);
    assert_eq!(engine.snapshot().label, TrustLabel::LowTrust);
}

#[test]
fn returning_face_restarts_the_grace_period() {
    let (mut engine, clock) = session();
    clock.advance_ms(2_000);
    engine.process(&Sample::FaceCount { count: 0 }).unwrap();
    clock.advance_ms(2_000);
    engine.process(&Sample::FaceCount { count: 1 }).unwrap();
    clock.advance_ms(2_000);
    let outcome = engine.process(&Sample::FaceCount { count: 0 }).unwrap();
    assert_eq!(outcome, SampleOutcome::NoViolation);
    assert_eq!(engine.snapshot().score, 10.0);
}

#[test]
fn five_rapid_multiple_face_detections() {
    let (mut engine, clock) = session();
    let mut outcomes = Vec::new();
    for _ in 0..5 {
        outcomes.push(engine.process(&Sample::FaceCount { count: 2 }).unwrap());
        clock.advance_ms(1_000);
    }
    assert!(outcomes[0].is_accepted());
    assert!(outcomes[1..]
        .iter()
        .all(|o| *o == SampleOutcome::Suppressed(ViolationCategory::MultipleFaces)));
    assert_eq!(engine.snapshot().score, 7.0);
}

#[test]
fn same_category_outside_window_counts_twice() {
    let (mut engine, clock) = session();
    assert!(engine.submit(ViolationCategory::MultipleFaces).unwrap().is_accepted());
    clock.advance_ms(5_001);
    assert!(engine.submit(ViolationCategory::MultipleFaces).unwrap().is_accepted());
    assert_eq!(engine.snapshot().count_of(ViolationCategory::MultipleFaces), 2);
    assert_eq!(engine.snapshot().score, 4.0);
}

#[test]
fn mixed_browser_events() {
    let (mut engine, clock) = session();
    let events = [
        Sample::FocusLost,
        Sample::Fullscreen { active: true },
        Sample::Fullscreen { active: false },
        Sample::ContextMenu,
        Sample::AudioLevel { level: 3.0 },
        Sample::AudioLevel { level: 42.0 },
    ];
    for event in &events {
        engine.process(event).unwrap();
        clock.advance_ms(100);
    }

    let snap = engine.snapshot();
    assert_eq!(snap.count_of(ViolationCategory::MouseOffScreen), 1);
    assert_eq!(snap.count_of(ViolationCategory::FullscreenExit), 1);
    assert_eq!(snap.count_of(ViolationCategory::CopyAction), 1);
    assert_eq!(snap.count_of(ViolationCategory::Speech), 1);
    assert_eq!(snap.score, 5.0);
    assert_eq!(snap.label, TrustLabel::ModerateTrust);
}
