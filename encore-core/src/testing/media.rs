use encore_contracts::media_element::{
    ElementSettings, MediaElement, MediaEvent, MediaFactory, MediaFault,
    MediaHandle,
};
use futures::StreamExt;
use futures::channel::mpsc::{UnboundedSender, unbounded};
use futures::stream::BoxStream;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

use super::lock;

/// Events an element fires after `load()`, each after a delay relative to
/// the previous one.
#[derive(Debug, Clone, Default)]
pub enum Script {
    /// Never fires anything; only a watchdog can settle the load.
    #[default]
    Silent,
    Events(Vec<(Duration, MediaEvent)>),
}

impl Script {
    pub fn metadata_after(delay: Duration) -> Self {
        Script::Events(vec![
            (Duration::ZERO, MediaEvent::LoadStart),
            (delay, MediaEvent::LoadedMetadata),
        ])
    }

    /// Metadata then can-play, both at `delay`.
    pub fn playable_after(delay: Duration) -> Self {
        Script::Events(vec![
            (Duration::ZERO, MediaEvent::LoadStart),
            (delay, MediaEvent::LoadedMetadata),
            (Duration::ZERO, MediaEvent::CanPlay),
        ])
    }

    /// Only can-play, without a preceding metadata event.
    pub fn can_play_only_after(delay: Duration) -> Self {
        Script::Events(vec![(delay, MediaEvent::CanPlay)])
    }

    pub fn fail_after(delay: Duration, fault: MediaFault) -> Self {
        Script::Events(vec![
            (Duration::ZERO, MediaEvent::LoadStart),
            (delay, MediaEvent::Error(fault)),
        ])
    }
}

#[derive(Debug, Default)]
struct ScriptBook {
    default: Script,
    per_url: Mutex<HashMap<String, Script>>,
}

impl ScriptBook {
    fn script_for(&self, url: &str) -> Script {
        lock(&self.per_url)
            .get(url)
            .cloned()
            .unwrap_or_else(|| self.default.clone())
    }
}

type Subscribers = Arc<Mutex<Vec<UnboundedSender<MediaEvent>>>>;

#[derive(Debug, Default)]
struct FakeState {
    settings: Option<ElementSettings>,
    source: Option<String>,
    sources_set: Vec<String>,
    load_calls: usize,
    release_calls: usize,
    task: Option<JoinHandle<()>>,
}

/// Media element that plays back a [`Script`] instead of fetching anything.
#[derive(Debug)]
pub struct FakeMediaElement {
    book: Arc<ScriptBook>,
    subscribers: Subscribers,
    state: Mutex<FakeState>,
}

impl FakeMediaElement {
    fn new(book: Arc<ScriptBook>) -> Self {
        Self {
            book,
            subscribers: Arc::default(),
            state: Mutex::default(),
        }
    }

    pub fn settings(&self) -> Option<ElementSettings> {
        lock(&self.state).settings
    }

    /// First URL ever assigned, kept after release.
    pub fn requested_url(&self) -> Option<String> {
        lock(&self.state).sources_set.first().cloned()
    }

    pub fn load_calls(&self) -> usize {
        lock(&self.state).load_calls
    }

    pub fn release_calls(&self) -> usize {
        lock(&self.state).release_calls
    }

    pub fn is_released(&self) -> bool {
        let state = lock(&self.state);
        state.release_calls > 0 && state.source.is_none()
    }
}

fn broadcast(subscribers: &Subscribers, event: MediaEvent) {
    lock(subscribers)
        .retain(|tx| tx.unbounded_send(event.clone()).is_ok());
}

impl MediaElement for FakeMediaElement {
    fn configure(&self, settings: &ElementSettings) {
        lock(&self.state).settings = Some(*settings);
    }

    fn events(&self) -> BoxStream<'static, MediaEvent> {
        let (tx, rx) = unbounded();
        lock(&self.subscribers).push(tx);
        rx.boxed()
    }

    fn set_source(&self, url: &str) {
        let mut state = lock(&self.state);
        state.source = Some(url.to_string());
        state.sources_set.push(url.to_string());
    }

    fn source(&self) -> Option<String> {
        lock(&self.state).source.clone()
    }

    fn load(&self) {
        let mut state = lock(&self.state);
        state.load_calls += 1;
        if let Some(task) = state.task.take() {
            task.abort();
        }
        let Some(source) = state.source.clone() else {
            return;
        };

        let Script::Events(events) = self.book.script_for(&source) else {
            return;
        };
        let subscribers = self.subscribers.clone();
        state.task = Some(tokio::spawn(async move {
            for (delay, event) in events {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                broadcast(&subscribers, event);
            }
        }));
    }

    fn release(&self) {
        let mut state = lock(&self.state);
        state.release_calls += 1;
        state.source = None;
        if let Some(task) = state.task.take() {
            task.abort();
        }
    }
}

/// Factory that hands out [`FakeMediaElement`]s and remembers them.
#[derive(Debug)]
pub struct FakeMediaFactory {
    book: Arc<ScriptBook>,
    created: Mutex<Vec<Arc<FakeMediaElement>>>,
}

impl FakeMediaFactory {
    /// Factory whose elements follow `default` unless a URL has its own
    /// script.
    pub fn new(default: Script) -> Arc<Self> {
        Arc::new(Self {
            book: Arc::new(ScriptBook {
                default,
                per_url: Mutex::default(),
            }),
            created: Mutex::default(),
        })
    }

    pub fn script(&self, url: &str, script: Script) -> &Self {
        lock(&self.book.per_url).insert(url.to_string(), script);
        self
    }

    pub fn created(&self) -> Vec<Arc<FakeMediaElement>> {
        lock(&self.created).clone()
    }

    pub fn created_count(&self) -> usize {
        lock(&self.created).len()
    }

    /// Elements that were pointed at `url`, oldest first.
    pub fn created_for(&self, url: &str) -> Vec<Arc<FakeMediaElement>> {
        lock(&self.created)
            .iter()
            .filter(|element| element.requested_url().as_deref() == Some(url))
            .cloned()
            .collect()
    }
}

impl MediaFactory for FakeMediaFactory {
    fn create(&self) -> MediaHandle {
        let element = Arc::new(FakeMediaElement::new(self.book.clone()));
        lock(&self.created).push(element.clone());
        element
    }
}
