//! Consumers built only on the preloader's public surface.

pub mod loading_gate;
pub mod video_slot;

pub use loading_gate::{LoadingGate, LoadingProgress, LoadingStage};
pub use video_slot::{RenderState, VideoSlot};
