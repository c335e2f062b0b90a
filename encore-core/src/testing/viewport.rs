use encore_contracts::viewport::{
    IntersectionEntry, ObserverOptions, ViewportTarget,
};
use futures::StreamExt;
use futures::channel::mpsc::{UnboundedSender, unbounded};
use futures::stream::BoxStream;
use std::sync::Mutex;

use super::lock;

/// On-screen element whose visibility is reported by hand.
#[derive(Debug, Default)]
pub struct FakeViewport {
    observers: Mutex<Vec<UnboundedSender<IntersectionEntry>>>,
    options: Mutex<Vec<ObserverOptions>>,
}

impl FakeViewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `entry` to every live observer; returns how many received it.
    pub fn report(&self, entry: IntersectionEntry) -> usize {
        let mut observers = lock(&self.observers);
        observers.retain(|tx| tx.unbounded_send(entry).is_ok());
        observers.len()
    }

    /// Observers whose stream has not been dropped.
    pub fn active_observers(&self) -> usize {
        lock(&self.observers)
            .iter()
            .filter(|tx| !tx.is_closed())
            .count()
    }

    /// Total `intersections` calls so far.
    pub fn observe_calls(&self) -> usize {
        lock(&self.options).len()
    }

    pub fn last_options(&self) -> Option<ObserverOptions> {
        lock(&self.options).last().cloned()
    }

    /// Simulate the element leaving the document: every stream ends.
    pub fn unmount(&self) {
        lock(&self.observers).clear();
    }
}

impl ViewportTarget for FakeViewport {
    fn intersections(
        &self,
        options: &ObserverOptions,
    ) -> BoxStream<'static, IntersectionEntry> {
        let (tx, rx) = unbounded();
        lock(&self.observers).push(tx);
        lock(&self.options).push(options.clone());
        rx.boxed()
    }
}
