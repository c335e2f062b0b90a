//! Render state of one on-page video.

use encore_contracts::media_element::MediaHandle;
use encore_model::{LoadPriority, ResourceRegistry, VideoKey};
use tracing::warn;

use crate::preloader::VideoPreloader;

/// Text shown in place of a video that could not be loaded.
pub const UNAVAILABLE_PLACEHOLDER: &str = "Video unavailable";

#[derive(Debug, Clone)]
pub enum RenderState {
    /// Still loading; the element is kept fully transparent.
    Pending,
    Playable(MediaHandle),
    /// Load failed; carries the failure message for diagnostics.
    Unavailable(String),
}

/// One video on the page, from first render to playable or placeholder.
#[derive(Debug, Clone)]
pub struct VideoSlot {
    url: String,
    priority: LoadPriority,
    state: RenderState,
}

impl VideoSlot {
    pub fn new(url: impl Into<String>, priority: LoadPriority) -> Self {
        Self {
            url: url.into(),
            priority,
            state: RenderState::Pending,
        }
    }

    /// Slot for a registry video; registry priority videos load as critical.
    pub fn for_key(registry: &ResourceRegistry, key: VideoKey) -> Self {
        let entry = registry.get(key);
        Self::new(entry.url.clone(), LoadPriority::from_flag(entry.priority))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    /// Whether the element should be shown (opaque) rather than hidden.
    pub fn is_visible(&self) -> bool {
        matches!(self.state, RenderState::Playable(_))
    }

    pub fn placeholder(&self) -> Option<&'static str> {
        matches!(self.state, RenderState::Unavailable(_))
            .then_some(UNAVAILABLE_PLACEHOLDER)
    }

    /// Settle the slot: reuse a cached handle, otherwise wait for a preload.
    ///
    /// Already settled slots are returned unchanged.
    pub async fn resolve(
        &mut self,
        preloader: &VideoPreloader,
    ) -> &RenderState {
        if !matches!(self.state, RenderState::Pending) {
            return &self.state;
        }

        self.state = match preloader.get_video(&self.url) {
            Some(handle) => RenderState::Playable(handle),
            None => match preloader
                .preload_single(&self.url, self.priority)
                .await
            {
                Ok(handle) => RenderState::Playable(handle),
                Err(err) => {
                    warn!(
                        url = %self.url,
                        error = %err,
                        "video failed to load"
                    );
                    RenderState::Unavailable(err.to_string())
                }
            },
        };
        &self.state
    }
}
