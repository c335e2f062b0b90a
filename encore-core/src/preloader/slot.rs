use encore_contracts::media_element::MediaHandle;
use encore_model::LoadState;
use futures::future::{BoxFuture, Shared};
use std::fmt;
use tokio::sync::oneshot;

use crate::error::PreloadError;

/// Pending (or already resolved) preload shared by every caller that asked
/// for the same URL during one loading episode.
pub type PreloadFuture =
    Shared<BoxFuture<'static, Result<MediaHandle, PreloadError>>>;

/// Store value for a requested URL. Absence from the store is `Unrequested`.
pub(crate) enum Slot {
    Loading {
        /// Distinguishes this load from earlier or later ones for the same URL.
        episode: u64,
        load: PreloadFuture,
        element: MediaHandle,
        /// Dropping this resolves the load as abandoned.
        _abandon: oneshot::Sender<()>,
    },
    Ready {
        handle: MediaHandle,
    },
}

impl Slot {
    pub(crate) fn state(&self) -> LoadState {
        match self {
            Slot::Loading { .. } => LoadState::Loading,
            Slot::Ready { .. } => LoadState::Ready,
        }
    }

    pub(crate) fn is_episode(&self, wanted: u64) -> bool {
        matches!(self, Slot::Loading { episode, .. } if *episode == wanted)
    }

    pub(crate) fn ready_handle(&self) -> Option<&MediaHandle> {
        match self {
            Slot::Ready { handle } => Some(handle),
            Slot::Loading { .. } => None,
        }
    }

    /// Release whatever element this slot tracks.
    pub(crate) fn release(&self) {
        match self {
            Slot::Loading { element, .. } => element.release(),
            Slot::Ready { handle } => handle.release(),
        }
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Loading {
                episode, element, ..
            } => f
                .debug_struct("Loading")
                .field("episode", episode)
                .field("element", element)
                .finish(),
            Slot::Ready { handle } => {
                f.debug_struct("Ready").field("handle", handle).finish()
            }
        }
    }
}
