//! Non-visual half of the loading screen: stages, percentages and timing.

use encore_model::total_size_label;
use futures::future::join_all;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::watch;
use tokio::time::{Instant, sleep, sleep_until, timeout_at};
use tracing::{debug, info, warn};

use crate::config::LoadingGateConfig;
use crate::constants::gate;
use crate::preloader::VideoPreloader;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadingStage {
    Initializing,
    Preloading,
    Optimizing,
    Complete,
}

/// Snapshot published to loading screen subscribers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadingProgress {
    pub stage: LoadingStage,
    /// 0 to 100, never decreasing within one run.
    pub percent: f32,
    /// Videos whose preload has settled, successfully or not.
    pub preloaded: usize,
    pub expected: usize,
}

impl LoadingProgress {
    fn initial(expected: usize) -> Self {
        Self {
            stage: LoadingStage::Initializing,
            percent: 0.0,
            preloaded: 0,
            expected,
        }
    }

    pub fn stage_text(&self) -> String {
        match self.stage {
            LoadingStage::Initializing => "Initializing...".to_string(),
            LoadingStage::Preloading => format!(
                "Preloading videos... ({}/{})",
                self.preloaded, self.expected
            ),
            LoadingStage::Optimizing => "Optimizing performance...".to_string(),
            LoadingStage::Complete => "Ready to rock!".to_string(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.stage == LoadingStage::Complete
    }
}

/// Footer shown under the progress bar.
pub fn footer_text() -> String {
    format!("Total video size: {}", total_size_label())
}

/// Drives the loading screen's progress model against a preloader.
#[derive(Debug)]
pub struct LoadingGate {
    preloader: VideoPreloader,
    config: LoadingGateConfig,
    progress: watch::Sender<LoadingProgress>,
}

impl LoadingGate {
    pub fn new(preloader: VideoPreloader, config: LoadingGateConfig) -> Self {
        let (progress, _) =
            watch::channel(LoadingProgress::initial(config.videos.len()));
        Self {
            preloader,
            config,
            progress,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadingProgress> {
        self.progress.subscribe()
    }

    pub fn progress(&self) -> LoadingProgress {
        self.progress.borrow().clone()
    }

    /// Run the gate to completion and return the final snapshot.
    ///
    /// Completes no earlier than `min_display` and, preloads aside, no later
    /// than `max_wait` plus the optimization pause. Preloads still running at
    /// the cap keep running in the preloader.
    pub async fn run(&self) -> LoadingProgress {
        let started = Instant::now();
        let expected = self.config.videos.len();

        self.advance(LoadingStage::Initializing, gate::PERCENT_INITIALIZING);
        sleep(self.config.init_pause()).await;

        self.advance(LoadingStage::Preloading, gate::PERCENT_PRELOAD_START);
        let settled = AtomicUsize::new(0);
        let loads = self.config.videos.iter().map(|&key| {
            let settled = &settled;
            async move {
                // One set per video so each is buffered as a critical load.
                let report = self.preloader.preload_critical_set(&[key]).await;
                let done = settled.fetch_add(1, Ordering::Relaxed) + 1;
                let percent = (gate::PERCENT_PRELOAD_START
                    + (done as f32 / expected as f32)
                        * gate::PERCENT_PRELOAD_SPAN)
                    .min(gate::PERCENT_PRELOAD_CAP);
                self.update(|progress| {
                    progress.preloaded = progress.preloaded.max(done);
                    progress.percent = progress.percent.max(percent);
                });
                debug!(
                    key = %key,
                    done,
                    expected,
                    "loading gate video settled"
                );
                report.all_ready()
            }
        });

        let deadline = started + self.config.max_wait();
        match timeout_at(deadline, join_all(loads)).await {
            Ok(results) => {
                let ready = results.iter().filter(|ready| **ready).count();
                info!(ready, expected, "loading gate preloads settled");
            }
            Err(_) => {
                warn!(
                    settled = settled.load(Ordering::Relaxed),
                    expected,
                    max_wait_ms = self.config.max_wait_ms,
                    "loading gate stopped waiting for preloads"
                );
            }
        }

        self.advance(LoadingStage::Optimizing, gate::PERCENT_OPTIMIZING);
        sleep(self.config.optimize_pause()).await;
        self.update(|progress| {
            progress.percent = progress.percent.max(gate::PERCENT_OPTIMIZED);
        });

        sleep_until(started + self.config.min_display()).await;
        self.advance(LoadingStage::Complete, gate::PERCENT_COMPLETE);
        info!(elapsed = ?started.elapsed(), "loading gate complete");
        self.progress()
    }

    fn advance(&self, stage: LoadingStage, percent: f32) {
        self.update(|progress| {
            progress.stage = stage;
            progress.percent = progress.percent.max(percent);
        });
    }

    fn update(&self, apply: impl FnOnce(&mut LoadingProgress)) {
        self.progress.send_if_modified(|progress| {
            let before = progress.clone();
            apply(progress);
            *progress != before
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_text_matches_screen_copy() {
        let mut progress = LoadingProgress::initial(5);
        assert_eq!(progress.stage_text(), "Initializing...");

        progress.stage = LoadingStage::Preloading;
        progress.preloaded = 2;
        assert_eq!(progress.stage_text(), "Preloading videos... (2/5)");

        progress.stage = LoadingStage::Optimizing;
        assert_eq!(progress.stage_text(), "Optimizing performance...");

        progress.stage = LoadingStage::Complete;
        assert_eq!(progress.stage_text(), "Ready to rock!");
        assert!(progress.is_complete());
    }

    #[test]
    fn footer_reports_total_size() {
        assert_eq!(footer_text(), "Total video size: 59.18 MB");
    }
}
