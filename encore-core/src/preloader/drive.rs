//! The body of one loading episode: wait for readiness, race the watchdog,
//! then write the outcome back to the store.

use encore_contracts::media_element::{
    MediaErrorCode, MediaEvent, MediaFault, MediaHandle,
};
use encore_model::LoadPriority;
use futures::StreamExt;
use futures::stream::BoxStream;
use std::sync::Weak;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::PreloaderInner;
use super::slot::Slot;
use crate::error::PreloadError;

pub(super) struct Episode {
    pub(super) url: String,
    pub(super) id: u64,
    pub(super) priority: LoadPriority,
    /// Armed when the episode starts, not when the load is first polled.
    pub(super) deadline: Instant,
    pub(super) watchdog: Duration,
    pub(super) element: MediaHandle,
    pub(super) events: BoxStream<'static, MediaEvent>,
    pub(super) abandon: oneshot::Receiver<()>,
}

pub(super) async fn drive(
    inner: Weak<PreloaderInner>,
    episode: Episode,
) -> Result<MediaHandle, PreloadError> {
    let Episode {
        url,
        id,
        priority,
        deadline,
        watchdog,
        element,
        events,
        abandon,
    } = episode;

    let readiness =
        tokio::time::timeout_at(deadline, await_ready(events, priority));

    let outcome = tokio::select! {
        biased;
        _ = abandon => Err(PreloadError::Abandoned { url: url.clone() }),
        result = readiness => match result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(fault)) => Err(PreloadError::LoadFailure {
                url: url.clone(),
                fault,
            }),
            Err(_) => Err(PreloadError::LoadTimeout {
                url: url.clone(),
                after: watchdog,
            }),
        },
    };

    settle(inner, &url, id, element, outcome)
}

/// Resolve on the first event that satisfies `priority`.
///
/// Critical loads accept can-play or loaded-metadata, whichever comes first.
/// Background loads only accept loaded-metadata.
pub(super) async fn await_ready(
    mut events: BoxStream<'static, MediaEvent>,
    priority: LoadPriority,
) -> Result<(), MediaFault> {
    while let Some(event) = events.next().await {
        match event {
            MediaEvent::LoadedMetadata => return Ok(()),
            MediaEvent::CanPlay if priority.is_critical() => return Ok(()),
            MediaEvent::Error(fault) => return Err(fault),
            MediaEvent::LoadStart | MediaEvent::CanPlay => {}
        }
    }
    Err(MediaFault::new(
        MediaErrorCode::Aborted,
        "element stopped reporting events",
    ))
}

fn settle(
    inner: Weak<PreloaderInner>,
    url: &str,
    episode: u64,
    element: MediaHandle,
    outcome: Result<(), PreloadError>,
) -> Result<MediaHandle, PreloadError> {
    let Some(inner) = inner.upgrade() else {
        element.release();
        return Err(PreloadError::Abandoned {
            url: url.to_string(),
        });
    };

    match outcome {
        Ok(()) => {
            let promoted = inner.slots.get_mut(url).is_some_and(|mut slot| {
                if slot.is_episode(episode) {
                    *slot = Slot::Ready {
                        handle: element.clone(),
                    };
                    true
                } else {
                    false
                }
            });

            if promoted {
                info!(url = %url, episode, "video preloaded");
                Ok(element)
            } else {
                // Store was cleaned up (or the slot replaced) mid-load.
                element.release();
                debug!(url = %url, episode, "dropping stale preload result");
                Err(PreloadError::Abandoned {
                    url: url.to_string(),
                })
            }
        }
        Err(err) => {
            inner
                .slots
                .remove_if(url, |_, slot| slot.is_episode(episode));
            element.release();
            match &err {
                PreloadError::Abandoned { .. } => {
                    debug!(url = %url, episode, "preload abandoned")
                }
                _ => warn!(
                    url = %url,
                    episode,
                    error = %err,
                    "video preload failed"
                ),
            }
            Err(err)
        }
    }
}
