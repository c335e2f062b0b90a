//! Core data model definitions shared across Encore crates.
//!
//! The leaf of the workspace: the closed set of site videos, the static
//! registry that maps them to object-storage URLs, and the small value types
//! (priorities, load states, statistics) that travel between the preloader
//! and its consumers.
#![allow(missing_docs)]

pub mod error;
pub mod load;
pub mod prelude;
pub mod registry;
pub mod stats;
pub mod video_key;

// Intentionally curated re-exports for downstream consumers.
pub use error::ModelError;
pub use load::{Buffering, LoadPriority, LoadState};
pub use registry::{
    ResolvedEntry, ResourceEntry, ResourceRegistry, default_critical_set,
    story_order, total_size_bytes, total_size_label,
};
pub use stats::PreloadStats;
pub use video_key::VideoKey;
