//! Deduplicating video preloader.
//!
//! All state lives in one keyed store: a URL maps to `Loading` (a shared
//! pending load plus the element it drives) or `Ready` (a loaded element).
//! A URL that is absent is unrequested. Checking the store and inserting a
//! new `Loading` slot happen under one map entry guard, so concurrent callers
//! for the same URL always end up awaiting the same load.

mod drive;
mod lazy;
mod report;
mod slot;

pub use report::{CriticalOutcome, CriticalSetReport};
pub use slot::PreloadFuture;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use encore_contracts::media_element::{
    ElementSettings, MediaFactory, MediaHandle,
};
use encore_contracts::viewport::ViewportTarget;
use encore_model::{
    LoadPriority, LoadState, PreloadStats, ResourceRegistry, VideoKey,
};
use futures::FutureExt;
use futures::future::{self, join_all};
use std::any::type_name_of_val;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::PreloaderConfig;
use crate::error::{PreloadError, Result};
use drive::Episode;
use lazy::ObserverRegistration;
use slot::Slot;

/// Owner of every video-loading resource in the process.
///
/// Cheap to clone; clones share one store. Construct one per page (or per
/// test) and hand clones to whichever consumer needs it.
///
/// Loads are driven by tasks on the current tokio runtime, so the methods
/// that can start a load must be called from within one.
#[derive(Clone)]
pub struct VideoPreloader {
    pub(crate) inner: Arc<PreloaderInner>,
}

pub(crate) struct PreloaderInner {
    factory: Arc<dyn MediaFactory>,
    registry: ResourceRegistry,
    config: PreloaderConfig,
    slots: DashMap<String, Slot>,
    observers: DashMap<String, ObserverRegistration>,
    next_episode: AtomicU64,
    next_observer: AtomicU64,
    // Diagnostics: loads actually started vs. callers that joined one
    loads_started: AtomicU64,
    loads_joined: AtomicU64,
}

impl fmt::Debug for VideoPreloader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.stats();
        f.debug_struct("VideoPreloader")
            .field("factory", &type_name_of_val(self.inner.factory.as_ref()))
            .field("preloaded", &stats.preloaded)
            .field("loading", &stats.loading)
            .field("observers", &self.inner.observers.len())
            .field(
                "loads_started",
                &self.inner.loads_started.load(Ordering::Relaxed),
            )
            .field(
                "loads_joined",
                &self.inner.loads_joined.load(Ordering::Relaxed),
            )
            .finish()
    }
}

impl VideoPreloader {
    /// Preloader over the default (cloud) registry.
    pub fn new(
        factory: Arc<dyn MediaFactory>,
        config: PreloaderConfig,
    ) -> Self {
        Self::with_registry(factory, config, ResourceRegistry::default())
    }

    pub fn with_registry(
        factory: Arc<dyn MediaFactory>,
        config: PreloaderConfig,
        registry: ResourceRegistry,
    ) -> Self {
        Self {
            inner: Arc::new(PreloaderInner {
                factory,
                registry,
                config,
                slots: DashMap::new(),
                observers: DashMap::new(),
                next_episode: AtomicU64::new(1),
                next_observer: AtomicU64::new(1),
                loads_started: AtomicU64::new(0),
                loads_joined: AtomicU64::new(0),
            }),
        }
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.inner.registry
    }

    pub fn config(&self) -> &PreloaderConfig {
        &self.inner.config
    }

    /// Warm the critical set concurrently and wait for every entry to settle.
    ///
    /// An empty `keys` slice means the configured default set. The first key
    /// is loaded as [`LoadPriority::Critical`], the rest as background
    /// (metadata-only). Never fails: individual outcomes are in the report.
    pub async fn preload_critical_set(
        &self,
        keys: &[VideoKey],
    ) -> CriticalSetReport {
        let keys: Vec<VideoKey> = if keys.is_empty() {
            self.inner.config.critical_set.clone()
        } else {
            keys.to_vec()
        };

        let pending: Vec<_> = keys
            .into_iter()
            .enumerate()
            .map(|(idx, key)| {
                let priority = if idx == 0 {
                    LoadPriority::Critical
                } else {
                    LoadPriority::Background
                };
                let url = self.inner.registry.url(key).to_string();
                let load = self.preload_single(&url, priority);
                async move {
                    let result = load.await.map(|_| ());
                    match &result {
                        Ok(()) => debug!(
                            key = %key,
                            ?priority,
                            "critical video ready"
                        ),
                        Err(err) => warn!(
                            key = %key,
                            error = %err,
                            "critical video not ready"
                        ),
                    }
                    CriticalOutcome {
                        key,
                        url,
                        priority,
                        result,
                    }
                }
            })
            .collect();

        let report = CriticalSetReport {
            outcomes: join_all(pending).await,
        };
        info!(
            ready = report.succeeded().count(),
            failed = report.failed().count(),
            "critical video set settled"
        );
        report
    }

    /// Start (or join) the load of `url` and return its shared future.
    ///
    /// - Ready: resolves immediately with the cached handle.
    /// - Loading: returns the in-flight load; no second fetch is started.
    /// - Otherwise: creates and configures an element, subscribes to its
    ///   events, points it at `url` and starts loading. The load settles on
    ///   readiness, on an element error, or when the watchdog for `priority`
    ///   expires.
    ///
    /// The load and its watchdog begin when this is called, not when the
    /// future is first polled. The load keeps running if the future is
    /// dropped.
    pub fn preload_single(
        &self,
        url: &str,
        priority: LoadPriority,
    ) -> PreloadFuture {
        let (load, started) = match self.inner.slots.entry(url.to_string()) {
            Entry::Occupied(occupied) => match occupied.get() {
                Slot::Ready { handle } => {
                    debug!(url = %url, "preload served from cache");
                    let handle = handle.clone();
                    (
                        future::ready(Ok::<_, PreloadError>(handle))
                            .boxed()
                            .shared(),
                        None,
                    )
                }
                Slot::Loading { load, episode, .. } => {
                    let joined =
                        self.inner.loads_joined.fetch_add(1, Ordering::Relaxed)
                            + 1;
                    debug!(
                        url = %url,
                        episode,
                        joined,
                        "joining in-flight preload"
                    );
                    (load.clone(), None)
                }
            },
            Entry::Vacant(vacant) => {
                let id =
                    self.inner.next_episode.fetch_add(1, Ordering::Relaxed);
                let element = self.inner.factory.create();
                element.configure(&ElementSettings::offscreen(
                    self.inner.config.buffering(priority),
                ));
                let events = element.events();
                let (abandon_tx, abandon_rx) = oneshot::channel();
                let watchdog = self.inner.config.watchdog(priority);

                let load = drive::drive(
                    Arc::downgrade(&self.inner),
                    Episode {
                        url: url.to_string(),
                        id,
                        priority,
                        deadline: Instant::now() + watchdog,
                        watchdog,
                        element: element.clone(),
                        events,
                        abandon: abandon_rx,
                    },
                )
                .boxed()
                .shared();

                vacant.insert(Slot::Loading {
                    episode: id,
                    load: load.clone(),
                    element: element.clone(),
                    _abandon: abandon_tx,
                });
                (load, Some((id, element)))
            }
        };

        if let Some((episode, element)) = started {
            element.set_source(url);
            element.load();
            tokio::spawn(load.clone());
            let started =
                self.inner.loads_started.fetch_add(1, Ordering::Relaxed) + 1;
            debug!(
                url = %url,
                ?priority,
                episode,
                started,
                "video preload started"
            );
        }

        load
    }

    /// [`VideoPreloader::preload_single`] for a registry key.
    pub fn preload_key(
        &self,
        key: VideoKey,
        priority: LoadPriority,
    ) -> PreloadFuture {
        self.preload_single(self.inner.registry.url(key), priority)
    }

    /// [`VideoPreloader::preload_key`] for a key given by name, e.g. from a
    /// data attribute or the command line.
    pub fn preload_named(
        &self,
        name: &str,
        priority: LoadPriority,
    ) -> Result<PreloadFuture> {
        let key: VideoKey = name.parse()?;
        Ok(self.preload_key(key, priority))
    }

    /// Cached handle for `url`, if its load has completed. Never starts a
    /// load.
    pub fn get_video(&self, url: &str) -> Option<MediaHandle> {
        self.inner
            .slots
            .get(url)
            .and_then(|slot| slot.ready_handle().cloned())
    }

    pub fn load_state(&self, url: &str) -> LoadState {
        self.inner
            .slots
            .get(url)
            .map(|slot| slot.state())
            .unwrap_or(LoadState::Unrequested)
    }

    /// Load `url` in the background the first time `target` becomes visible.
    ///
    /// The observer detaches itself after firing once. Registering a URL that
    /// already has an active observer does nothing.
    pub fn setup_lazy_loading(&self, target: &dyn ViewportTarget, url: &str) {
        match self.inner.observers.entry(url.to_string()) {
            Entry::Occupied(_) => {
                debug!(url = %url, "lazy loading already registered");
            }
            Entry::Vacant(vacant) => {
                let id =
                    self.inner.next_observer.fetch_add(1, Ordering::Relaxed);
                let intersections =
                    target.intersections(&self.inner.config.observer_options());
                let task = tokio::spawn(lazy::watch(
                    Arc::downgrade(&self.inner),
                    url.to_string(),
                    id,
                    intersections,
                    self.inner.config.lazy_trigger_ratio,
                ));
                vacant.insert(ObserverRegistration::new(id, task));
                debug!(url = %url, observer = id, "lazy loading registered");
            }
        }
    }

    /// Warm the entries right after `current_index` in background.
    ///
    /// Returns how many loads were requested. Failures are logged by the
    /// loads themselves and otherwise ignored.
    pub fn prefetch_upcoming<S: AsRef<str>>(
        &self,
        current_index: usize,
        ordered_urls: &[S],
    ) -> usize {
        let start = current_index.saturating_add(1);
        let end = start
            .saturating_add(self.inner.config.prefetch_count)
            .min(ordered_urls.len());

        let upcoming = ordered_urls.get(start..end).unwrap_or_default();
        for url in upcoming {
            // The load is driven by its own task; the future is not needed.
            drop(self.preload_single(url.as_ref(), LoadPriority::Background));
        }
        if !upcoming.is_empty() {
            debug!(
                current_index,
                count = upcoming.len(),
                "prefetching upcoming videos"
            );
        }
        upcoming.len()
    }

    pub fn stats(&self) -> PreloadStats {
        let (mut preloaded, mut loading) = (0, 0);
        for slot in self.inner.slots.iter() {
            match slot.value() {
                Slot::Ready { .. } => preloaded += 1,
                Slot::Loading { .. } => loading += 1,
            }
        }
        PreloadStats::new(preloaded, loading)
    }

    /// Number of lazy-load observers still waiting for visibility.
    pub fn observer_count(&self) -> usize {
        self.inner.observers.len()
    }

    /// Release every element, empty the store and disconnect every observer.
    ///
    /// In-flight loads resolve with [`crate::PreloadError::Abandoned`].
    /// Safe to call repeatedly.
    pub fn cleanup(&self) {
        let urls: Vec<String> = self
            .inner
            .slots
            .iter()
            .map(|slot| slot.key().clone())
            .collect();

        let (mut released, mut abandoned) = (0usize, 0usize);
        for url in urls {
            if let Some((_, slot)) = self.inner.slots.remove(&url) {
                match &slot {
                    Slot::Ready { .. } => released += 1,
                    Slot::Loading { .. } => abandoned += 1,
                }
                slot.release();
            }
        }

        let observed: Vec<String> = self
            .inner
            .observers
            .iter()
            .map(|registration| registration.key().clone())
            .collect();

        let mut detached = 0usize;
        for url in observed {
            if let Some((_, registration)) = self.inner.observers.remove(&url)
            {
                registration.disconnect();
                detached += 1;
            }
        }

        if released + abandoned + detached > 0 {
            info!(released, abandoned, detached, "video preloader cleaned up");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeMediaFactory, Script};
    use encore_contracts::media_element::MediaElement;
    use std::time::Duration;

    fn preloader(factory: &Arc<FakeMediaFactory>) -> VideoPreloader {
        VideoPreloader::new(factory.clone(), PreloaderConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn new_element_is_configured_before_loading() {
        let factory = FakeMediaFactory::new(Script::metadata_after(
            Duration::from_millis(5),
        ));
        let preloader = preloader(&factory);

        preloader
            .preload_single("https://cdn/a.mp4", LoadPriority::Critical)
            .await
            .unwrap();

        let element = factory.created().pop().unwrap();
        let settings = element.settings().unwrap();
        assert!(settings.muted && settings.plays_inline);
        assert_eq!(settings.buffering, encore_model::Buffering::Full);
        assert_eq!(element.source().as_deref(), Some("https://cdn/a.mp4"));
        assert_eq!(element.load_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn load_state_follows_the_episode() {
        let factory = FakeMediaFactory::new(Script::metadata_after(
            Duration::from_millis(20),
        ));
        let preloader = preloader(&factory);
        let url = "https://cdn/b.mp4";

        assert_eq!(preloader.load_state(url), LoadState::Unrequested);
        let load = preloader.preload_single(url, LoadPriority::Background);
        assert_eq!(preloader.load_state(url), LoadState::Loading);
        assert!(preloader.get_video(url).is_none());

        load.await.unwrap();
        assert_eq!(preloader.load_state(url), LoadState::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn ready_url_is_served_without_new_element() {
        let factory = FakeMediaFactory::new(Script::metadata_after(
            Duration::from_millis(1),
        ));
        let preloader = preloader(&factory);
        let url = "https://cdn/c.mp4";

        let first = preloader
            .preload_single(url, LoadPriority::Background)
            .await
            .unwrap();
        let second = preloader
            .preload_single(url, LoadPriority::Critical)
            .await
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(factory.created_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn save_data_requests_metadata_for_critical_loads() {
        let factory = FakeMediaFactory::new(Script::metadata_after(
            Duration::from_millis(1),
        ));
        let config = PreloaderConfig {
            save_data: true,
            ..PreloaderConfig::default()
        };
        let preloader = VideoPreloader::new(factory.clone(), config);

        preloader
            .preload_single("https://cdn/d.mp4", LoadPriority::Critical)
            .await
            .unwrap();

        let settings = factory.created()[0].settings().unwrap();
        assert_eq!(settings.buffering, encore_model::Buffering::Metadata);
    }

    #[tokio::test]
    async fn unknown_name_is_rejected_without_loading() {
        let factory = FakeMediaFactory::new(Script::Silent);
        let preloader = preloader(&factory);

        let err = preloader
            .preload_named("bass", LoadPriority::Background)
            .err();
        assert!(matches!(err, Some(PreloadError::UnknownKey(_))));
        assert_eq!(factory.created_count(), 0);
        assert_eq!(preloader.stats(), PreloadStats::default());
    }

    #[tokio::test]
    async fn debug_output_reports_counts() {
        let factory = FakeMediaFactory::new(Script::Silent);
        let preloader = preloader(&factory);
        let rendered = format!("{preloader:?}");
        assert!(rendered.contains("preloaded: 0"));
        assert!(rendered.contains("loads_started: 0"));
    }
}
