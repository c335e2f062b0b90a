//! Consumer-focused snapshot of the model surface.
//! Prefer importing from this module in adapters and binaries.

pub use super::error::ModelError;
pub use super::load::{Buffering, LoadPriority, LoadState};
pub use super::registry::{
    ResolvedEntry, ResourceEntry, ResourceRegistry, default_critical_set,
    story_order,
};
pub use super::stats::PreloadStats;
pub use super::video_key::VideoKey;
