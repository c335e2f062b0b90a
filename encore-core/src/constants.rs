//! Default tuning values. [`crate::config`] overrides fall back to these.

/// Watchdog for critical (fully buffered) preloads.
pub const CRITICAL_TIMEOUT_MS: u64 = 5_000;

/// Watchdog for background (metadata-only) preloads.
pub const BACKGROUND_TIMEOUT_MS: u64 = 3_000;

/// Entries warmed ahead of the story panel in focus.
pub const PREFETCH_COUNT: usize = 1;

pub mod lazy {
    /// Margin that grows the viewport for lazy-load observation.
    pub const ROOT_MARGIN_PX: u32 = 50;

    /// Minimum visible ratio (exclusive) that triggers a lazy load.
    pub const TRIGGER_RATIO: f32 = 0.1;

    pub const THRESHOLDS: [f32; 3] = [0.1, 0.25, 0.5];
}

pub mod gate {
    pub const INIT_PAUSE_MS: u64 = 500;
    pub const OPTIMIZE_PAUSE_MS: u64 = 300;
    pub const MIN_DISPLAY_MS: u64 = 3_000;
    /// Hard cap on waiting for preloads before the gate opens anyway.
    pub const MAX_WAIT_MS: u64 = 12_000;

    pub const PERCENT_INITIALIZING: f32 = 5.0;
    pub const PERCENT_PRELOAD_START: f32 = 15.0;
    /// Share of the bar covered by the preload phase.
    pub const PERCENT_PRELOAD_SPAN: f32 = 65.0;
    pub const PERCENT_PRELOAD_CAP: f32 = 80.0;
    pub const PERCENT_OPTIMIZING: f32 = 85.0;
    pub const PERCENT_OPTIMIZED: f32 = 95.0;
    pub const PERCENT_COMPLETE: f32 = 100.0;
}

pub mod http {
    /// Bytes requested to reach "metadata available".
    pub const METADATA_PROBE_BYTES: u64 = 64 * 1024;

    /// Bytes buffered before reporting "can play".
    pub const CAN_PLAY_BYTES: u64 = 2 * 1024 * 1024;

    /// Capacity of each element's event channel.
    pub const EVENT_CHANNEL_CAPACITY: usize = 16;
}
