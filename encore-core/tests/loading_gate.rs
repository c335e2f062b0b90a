use std::time::Duration;

use encore_core::adapters::{LoadingGate, LoadingProgress, LoadingStage};
use encore_core::testing::{FakeMediaFactory, Script};
use encore_core::{LoadingGateConfig, PreloaderConfig, VideoPreloader};
use encore_model::VideoKey;
use tokio::time::Instant;

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// Run the gate while recording every progress value it publishes.
async fn run_recorded(
    gate: LoadingGate,
) -> (LoadingProgress, Vec<LoadingProgress>) {
    let mut updates = gate.subscribe();
    let recorder = tokio::spawn(async move {
        let mut seen = Vec::new();
        while updates.changed().await.is_ok() {
            seen.push(updates.borrow_and_update().clone());
        }
        seen
    });

    let last = gate.run().await;
    drop(gate);
    (last, recorder.await.unwrap())
}

fn assert_monotonic(seen: &[LoadingProgress]) {
    for pair in seen.windows(2) {
        assert!(
            pair[1].percent >= pair[0].percent,
            "progress went backwards: {pair:?}"
        );
    }
}

#[tokio::test(start_paused = true)]
async fn fast_loads_still_respect_the_minimum_display_time() {
    let factory = FakeMediaFactory::new(Script::playable_after(ms(10)));
    let preloader =
        VideoPreloader::new(factory.clone(), PreloaderConfig::default());
    let gate =
        LoadingGate::new(preloader.clone(), LoadingGateConfig::default());
    let started = Instant::now();

    let (last, seen) = run_recorded(gate).await;

    let elapsed = started.elapsed();
    assert!(elapsed >= ms(3_000) && elapsed < ms(3_100), "{elapsed:?}");
    assert_eq!(last.stage, LoadingStage::Complete);
    assert_eq!(last.percent, 100.0);
    assert_eq!(last.preloaded, 5);
    assert_eq!(last.expected, 5);
    assert_monotonic(&seen);
    assert!(seen.iter().any(|p| p.stage == LoadingStage::Preloading));
    assert!(seen.iter().any(|p| p.stage == LoadingStage::Optimizing));
    assert_eq!(preloader.stats().preloaded, 5);
    assert_eq!(factory.created_count(), 5);
}

#[tokio::test(start_paused = true)]
async fn failing_loads_still_complete_the_gate() {
    let factory = FakeMediaFactory::new(Script::Silent);
    let preloader = VideoPreloader::new(factory, PreloaderConfig::default());
    let gate =
        LoadingGate::new(preloader.clone(), LoadingGateConfig::default());
    let started = Instant::now();

    let (last, seen) = run_recorded(gate).await;

    // 500 ms init, 5 s critical watchdog, 300 ms optimization pause.
    let elapsed = started.elapsed();
    assert!(elapsed >= ms(5_800) && elapsed < ms(5_900), "{elapsed:?}");
    assert!(last.is_complete());
    assert_eq!(last.percent, 100.0);
    assert_eq!(last.preloaded, 5);
    assert_monotonic(&seen);
    assert!(
        seen.iter()
            .filter(|p| p.stage == LoadingStage::Preloading)
            .all(|p| p.percent <= 80.0)
    );
    assert_eq!(preloader.stats().total, 0);
}

#[tokio::test(start_paused = true)]
async fn gate_stops_waiting_at_the_cap() {
    let factory = FakeMediaFactory::new(Script::Silent);
    let preloader = VideoPreloader::new(factory, PreloaderConfig::default());
    let config = LoadingGateConfig {
        min_display_ms: 1_000,
        max_wait_ms: 2_000,
        ..LoadingGateConfig::default()
    };
    let gate = LoadingGate::new(preloader.clone(), config);
    let started = Instant::now();

    let (last, seen) = run_recorded(gate).await;

    let elapsed = started.elapsed();
    assert!(elapsed >= ms(2_300) && elapsed < ms(2_400), "{elapsed:?}");
    assert!(last.is_complete());
    assert_eq!(last.preloaded, 0);
    assert_monotonic(&seen);
    // Loads outlive the gate and settle on their own watchdogs.
    assert_eq!(preloader.stats().loading, 5);
}

#[tokio::test(start_paused = true)]
async fn progress_text_counts_settled_videos() {
    let factory = FakeMediaFactory::new(Script::playable_after(ms(10)));
    factory.script(VideoKey::Guitar.url(), Script::playable_after(ms(400)));
    let preloader = VideoPreloader::new(factory, PreloaderConfig::default());
    let config = LoadingGateConfig {
        videos: vec![VideoKey::Hero, VideoKey::Guitar],
        ..LoadingGateConfig::default()
    };
    let gate = LoadingGate::new(preloader, config);

    let (last, seen) = run_recorded(gate).await;

    let halfway = seen
        .iter()
        .find(|p| p.stage == LoadingStage::Preloading && p.preloaded == 1)
        .unwrap();
    assert_eq!(halfway.stage_text(), "Preloading videos... (1/2)");
    assert_eq!(halfway.percent, 47.5);
    assert_eq!(last.preloaded, 2);
    assert_eq!(last.stage_text(), "Ready to rock!");
}
