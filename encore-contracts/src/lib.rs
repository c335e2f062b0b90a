//! Trait surfaces for the platform services the preloader drives.
//!
//! A browser provides these as `HTMLVideoElement` and `IntersectionObserver`;
//! native builds plug in the HTTP backend from `encore-core`, and tests plug
//! in scripted fakes.

pub mod media_element;
pub mod viewport;

/// Frequently used contracts for preloader and adapter code.
pub mod prelude {
    pub use super::media_element::{
        CrossOrigin, ElementSettings, MediaElement, MediaErrorCode,
        MediaEvent, MediaFactory, MediaFault, MediaHandle,
    };
    pub use super::viewport::{
        IntersectionEntry, ObserverOptions, ViewportTarget,
    };
    pub use encore_model::Buffering;
}
