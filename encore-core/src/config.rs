use std::time::Duration;

use encore_contracts::viewport::ObserverOptions;
use encore_model::{Buffering, LoadPriority, VideoKey, default_critical_set};
use serde::{Deserialize, Serialize};

use crate::constants::{self, gate, lazy};

/// Knobs for [`crate::VideoPreloader`].
///
/// Every field has a default so partial config files only need to name what
/// they change.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PreloaderConfig {
    /// Watchdog (ms) for critical loads.
    pub critical_timeout_ms: u64,
    /// Watchdog (ms) for background loads.
    pub background_timeout_ms: u64,
    /// How many entries after the focused one `prefetch_upcoming` warms.
    pub prefetch_count: usize,
    pub lazy_root_margin_px: u32,
    /// Visible ratio an observed element must exceed to trigger its load.
    pub lazy_trigger_ratio: f32,
    pub lazy_thresholds: Vec<f32>,
    /// Request metadata-only buffering even for critical loads. Use on
    /// metered or small-screen clients.
    pub save_data: bool,
    /// Keys warmed when `preload_critical_set` is called without any.
    pub critical_set: Vec<VideoKey>,
}

impl Default for PreloaderConfig {
    fn default() -> Self {
        Self {
            critical_timeout_ms: constants::CRITICAL_TIMEOUT_MS,
            background_timeout_ms: constants::BACKGROUND_TIMEOUT_MS,
            prefetch_count: constants::PREFETCH_COUNT,
            lazy_root_margin_px: lazy::ROOT_MARGIN_PX,
            lazy_trigger_ratio: lazy::TRIGGER_RATIO,
            lazy_thresholds: lazy::THRESHOLDS.to_vec(),
            save_data: false,
            critical_set: default_critical_set().to_vec(),
        }
    }
}

impl PreloaderConfig {
    pub fn watchdog(&self, priority: LoadPriority) -> Duration {
        match priority {
            LoadPriority::Critical => {
                Duration::from_millis(self.critical_timeout_ms)
            }
            LoadPriority::Background => {
                Duration::from_millis(self.background_timeout_ms)
            }
        }
    }

    pub fn buffering(&self, priority: LoadPriority) -> Buffering {
        if self.save_data {
            Buffering::Metadata
        } else {
            priority.buffering()
        }
    }

    pub fn observer_options(&self) -> ObserverOptions {
        ObserverOptions {
            root_margin_px: self.lazy_root_margin_px,
            thresholds: self.lazy_thresholds.clone(),
        }
    }
}

/// Timing of the loading screen gate.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoadingGateConfig {
    pub init_pause_ms: u64,
    pub optimize_pause_ms: u64,
    /// The gate never opens before this much time (ms) has passed.
    pub min_display_ms: u64,
    /// Preloads still outstanding after this (ms) are left running and the
    /// gate moves on.
    pub max_wait_ms: u64,
    /// Videos the loading screen waits for, in request order.
    pub videos: Vec<VideoKey>,
}

impl Default for LoadingGateConfig {
    fn default() -> Self {
        Self {
            init_pause_ms: gate::INIT_PAUSE_MS,
            optimize_pause_ms: gate::OPTIMIZE_PAUSE_MS,
            min_display_ms: gate::MIN_DISPLAY_MS,
            max_wait_ms: gate::MAX_WAIT_MS,
            videos: vec![
                VideoKey::Hero,
                VideoKey::Drumcym,
                VideoKey::Guitar,
                VideoKey::Vinyl1,
                VideoKey::Vinyl2,
            ],
        }
    }
}

impl LoadingGateConfig {
    pub fn init_pause(&self) -> Duration {
        Duration::from_millis(self.init_pause_ms)
    }

    pub fn optimize_pause(&self) -> Duration {
        Duration::from_millis(self.optimize_pause_ms)
    }

    pub fn min_display(&self) -> Duration {
        Duration::from_millis(self.min_display_ms)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_watchdog_tiers() {
        let config = PreloaderConfig::default();
        assert_eq!(
            config.watchdog(LoadPriority::Critical),
            Duration::from_secs(5)
        );
        assert_eq!(
            config.watchdog(LoadPriority::Background),
            Duration::from_secs(3)
        );
        assert_eq!(
            config.critical_set,
            vec![VideoKey::Hero, VideoKey::Drumcym]
        );
    }

    #[test]
    fn save_data_downgrades_critical_buffering() {
        let mut config = PreloaderConfig::default();
        assert_eq!(config.buffering(LoadPriority::Critical), Buffering::Full);

        config.save_data = true;
        assert_eq!(
            config.buffering(LoadPriority::Critical),
            Buffering::Metadata
        );
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config: PreloaderConfig =
            serde_json::from_str(r#"{"prefetch_count": 2}"#).unwrap();
        assert_eq!(config.prefetch_count, 2);
        assert_eq!(config.background_timeout_ms, 3_000);
        assert_eq!(config.observer_options(), ObserverOptions::default());
    }

    #[test]
    fn gate_defaults_cover_every_video_hero_first() {
        let config = LoadingGateConfig::default();
        assert_eq!(config.videos.len(), VideoKey::ALL.len());
        assert_eq!(config.videos[0], VideoKey::Hero);
        assert!(config.max_wait() > config.min_display());
    }
}
