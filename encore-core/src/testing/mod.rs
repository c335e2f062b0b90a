//! Scripted platform fakes for deterministic tests.
//!
//! Event timings go through `tokio::time`, so tests running with a paused
//! clock (`#[tokio::test(start_paused = true)]`) see exact watchdog and
//! readiness timings.

mod media;
mod viewport;

pub use media::{FakeMediaElement, FakeMediaFactory, Script};
pub use viewport::FakeViewport;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
