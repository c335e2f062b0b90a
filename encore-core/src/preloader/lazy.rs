//! Fire-once viewport observers that start background loads.

use encore_contracts::viewport::IntersectionEntry;
use encore_model::LoadPriority;
use futures::StreamExt;
use futures::stream::BoxStream;
use std::sync::Weak;
use tokio::task::JoinHandle;
use tracing::debug;

use super::{PreloaderInner, VideoPreloader};

/// Active observer for one URL.
#[derive(Debug)]
pub(crate) struct ObserverRegistration {
    pub(crate) id: u64,
    task: JoinHandle<()>,
}

impl ObserverRegistration {
    pub(crate) fn new(id: u64, task: JoinHandle<()>) -> Self {
        Self { id, task }
    }

    /// Stop observing. Aborting the task drops the intersection stream.
    pub(crate) fn disconnect(self) {
        self.task.abort();
    }
}

pub(super) async fn watch(
    inner: Weak<PreloaderInner>,
    url: String,
    id: u64,
    mut intersections: BoxStream<'static, IntersectionEntry>,
    trigger_ratio: f32,
) {
    let triggered = loop {
        match intersections.next().await {
            Some(entry) if entry.exceeds(trigger_ratio) => break true,
            Some(_) => continue,
            None => break false,
        }
    };
    drop(intersections);

    let Some(inner) = inner.upgrade() else {
        return;
    };
    inner
        .observers
        .remove_if(&url, |_, registration| registration.id == id);

    if !triggered {
        debug!(url = %url, "viewport target went away before becoming visible");
        return;
    }

    let preloader = VideoPreloader { inner };
    match preloader
        .preload_single(&url, LoadPriority::Background)
        .await
    {
        Ok(_) => debug!(url = %url, "lazy loaded"),
        Err(err) => {
            debug!(url = %url, error = %err, "lazy load did not complete")
        }
    }
}
