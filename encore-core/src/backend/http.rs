//! `MediaElement` over plain HTTPS range requests.
//!
//! Readiness is approximated from bytes on hand: the metadata probe stands in
//! for `loadedmetadata`, the can-play threshold for `canplay`. Nothing is
//! decoded; the container signature is sniffed so that non-video responses
//! (error pages, redirects to HTML) fail the load instead of passing it.

use encore_contracts::media_element::{
    ElementSettings, MediaElement, MediaErrorCode, MediaEvent, MediaFactory,
    MediaFault, MediaHandle,
};
use encore_model::Buffering;
use futures::StreamExt;
use futures::stream::BoxStream;
use reqwest::StatusCode;
use reqwest::header::RANGE;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, trace};

use crate::constants::http::{
    CAN_PLAY_BYTES, EVENT_CHANNEL_CAPACITY, METADATA_PROBE_BYTES,
};

/// ISO BMFF box type at offset 4 of every MP4/MOV file.
const FTYP: &[u8; 4] = b"ftyp";
/// EBML magic opening every WebM/Matroska file.
const EBML_MAGIC: [u8; 4] = [0x1A, 0x45, 0xDF, 0xA3];
const SNIFF_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpBackendOptions {
    /// Bytes fetched before metadata counts as loaded.
    pub metadata_probe_bytes: u64,
    /// Bytes buffered before a fully buffered element can play.
    pub can_play_bytes: u64,
}

impl Default for HttpBackendOptions {
    fn default() -> Self {
        Self {
            metadata_probe_bytes: METADATA_PROBE_BYTES,
            can_play_bytes: CAN_PLAY_BYTES,
        }
    }
}

impl HttpBackendOptions {
    fn wanted_bytes(&self, buffering: Buffering) -> u64 {
        match buffering {
            Buffering::Metadata => self.metadata_probe_bytes,
            Buffering::Full => {
                self.can_play_bytes.max(self.metadata_probe_bytes)
            }
        }
    }
}

#[derive(Debug, Default)]
struct ElementState {
    settings: Option<ElementSettings>,
    source: Option<String>,
    buffered: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
}

/// Detached element that fetches the head of its source over HTTP.
#[derive(Debug)]
pub struct HttpMediaElement {
    client: reqwest::Client,
    options: HttpBackendOptions,
    events: broadcast::Sender<MediaEvent>,
    state: Mutex<ElementState>,
}

impl HttpMediaElement {
    pub fn new(client: reqwest::Client, options: HttpBackendOptions) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            client,
            options,
            events,
            state: Mutex::default(),
        }
    }

    /// Bytes received by the current load.
    pub fn buffered_bytes(&self) -> u64 {
        self.state().buffered.load(Ordering::Relaxed)
    }

    fn state(&self) -> MutexGuard<'_, ElementState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MediaElement for HttpMediaElement {
    fn configure(&self, settings: &ElementSettings) {
        self.state().settings = Some(*settings);
    }

    fn events(&self) -> BoxStream<'static, MediaEvent> {
        BroadcastStream::new(self.events.subscribe())
            .filter_map(|event| futures::future::ready(event.ok()))
            .boxed()
    }

    fn set_source(&self, url: &str) {
        self.state().source = Some(url.to_string());
    }

    fn source(&self) -> Option<String> {
        self.state().source.clone()
    }

    fn load(&self) {
        let mut state = self.state();
        if let Some(task) = state.task.take() {
            task.abort();
        }

        let Some(url) = state.source.clone() else {
            let _ = self.events.send(MediaEvent::Error(MediaFault::new(
                MediaErrorCode::SourceNotSupported,
                "no source attached",
            )));
            return;
        };

        let buffering = state
            .settings
            .map(|settings| settings.buffering)
            .unwrap_or(Buffering::Metadata);
        state.buffered = Arc::new(AtomicU64::new(0));

        let fetch = Fetch {
            client: self.client.clone(),
            url,
            buffering,
            options: self.options,
            events: self.events.clone(),
            buffered: state.buffered.clone(),
        };
        state.task = Some(tokio::spawn(fetch.run()));
    }

    fn release(&self) {
        let mut state = self.state();
        if let Some(task) = state.task.take() {
            task.abort();
        }
        if let Some(url) = state.source.take() {
            trace!(url = %url, "released http media element");
        }
        state.buffered = Arc::default();
    }
}

struct Fetch {
    client: reqwest::Client,
    url: String,
    buffering: Buffering,
    options: HttpBackendOptions,
    events: broadcast::Sender<MediaEvent>,
    buffered: Arc<AtomicU64>,
}

impl Fetch {
    async fn run(self) {
        let _ = self.events.send(MediaEvent::LoadStart);
        if let Err(fault) = self.fetch().await {
            debug!(url = %self.url, fault = %fault, "http media fetch failed");
            let _ = self.events.send(MediaEvent::Error(fault));
        }
    }

    async fn fetch(&self) -> Result<(), MediaFault> {
        let wanted = self.options.wanted_bytes(self.buffering);
        let probe = self.options.metadata_probe_bytes.min(wanted);

        let response = self
            .client
            .get(&self.url)
            .header(RANGE, range_header(wanted))
            .send()
            .await
            .map_err(network_fault)?;

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::PARTIAL_CONTENT {
            return Err(MediaFault::new(
                MediaErrorCode::Network,
                format!("HTTP {status}"),
            ));
        }

        let mut body = response.bytes_stream();
        let mut head: Vec<u8> = Vec::with_capacity(SNIFF_LEN);
        let mut received = 0u64;
        let mut metadata_loaded = false;

        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(network_fault)?;
            received += chunk.len() as u64;
            self.buffered.store(received, Ordering::Relaxed);

            let missing = SNIFF_LEN.saturating_sub(head.len());
            head.extend(chunk.iter().take(missing));

            if !metadata_loaded && received >= probe {
                self.metadata_loaded(&head)?;
                metadata_loaded = true;
            }
            if received >= wanted {
                break;
            }
        }

        if !metadata_loaded {
            self.metadata_loaded(&head)?;
        }
        if self.buffering == Buffering::Full {
            trace!(url = %self.url, received, "http media can play");
            let _ = self.events.send(MediaEvent::CanPlay);
        }
        Ok(())
    }

    fn metadata_loaded(&self, head: &[u8]) -> Result<(), MediaFault> {
        if !is_supported_container(head) {
            return Err(MediaFault::new(
                MediaErrorCode::SourceNotSupported,
                "response is not an MP4 or WebM stream",
            ));
        }
        let _ = self.events.send(MediaEvent::LoadedMetadata);
        Ok(())
    }
}

fn network_fault(err: reqwest::Error) -> MediaFault {
    MediaFault::new(MediaErrorCode::Network, err.to_string())
}

/// `Range` value requesting the first `len` bytes.
fn range_header(len: u64) -> String {
    format!("bytes=0-{}", len.saturating_sub(1))
}

fn is_supported_container(head: &[u8]) -> bool {
    head.get(4..8) == Some(FTYP.as_slice()) || head.starts_with(&EBML_MAGIC)
}

/// Hands out [`HttpMediaElement`]s sharing one connection pool.
#[derive(Debug, Clone)]
pub struct HttpMediaFactory {
    client: reqwest::Client,
    options: HttpBackendOptions,
}

impl HttpMediaFactory {
    pub fn new(client: reqwest::Client, options: HttpBackendOptions) -> Self {
        Self { client, options }
    }
}

impl MediaFactory for HttpMediaFactory {
    fn create(&self) -> MediaHandle {
        Arc::new(HttpMediaElement::new(self.client.clone(), self.options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_covers_exactly_the_wanted_bytes() {
        assert_eq!(range_header(65_536), "bytes=0-65535");
        assert_eq!(range_header(1), "bytes=0-0");
    }

    #[test]
    fn sniffs_mp4_and_webm_heads() {
        let mp4 = [0, 0, 0, 0x20, b'f', b't', b'y', b'p'];
        assert!(is_supported_container(&mp4));
        assert!(is_supported_container(&[0x1A, 0x45, 0xDF, 0xA3, 0x01]));
        assert!(!is_supported_container(b"<!DOCTYPE html>"));
        assert!(!is_supported_container(&[0, 0, 0]));
    }

    #[test]
    fn full_buffering_never_wants_less_than_the_probe() {
        let options = HttpBackendOptions {
            metadata_probe_bytes: 4_096,
            can_play_bytes: 1_024,
        };
        assert_eq!(options.wanted_bytes(Buffering::Full), 4_096);
        assert_eq!(options.wanted_bytes(Buffering::Metadata), 4_096);
    }

    #[tokio::test]
    async fn release_detaches_source_and_is_repeatable() {
        let element = HttpMediaElement::new(
            reqwest::Client::new(),
            HttpBackendOptions::default(),
        );
        element.set_source("https://example.invalid/a.mp4");
        element.release();
        element.release();
        assert_eq!(element.source(), None);
        assert_eq!(element.buffered_bytes(), 0);
    }

    #[tokio::test]
    async fn load_without_source_reports_an_error() {
        let element = HttpMediaElement::new(
            reqwest::Client::new(),
            HttpBackendOptions::default(),
        );
        let mut events = element.events();
        element.load();
        match events.next().await {
            Some(MediaEvent::Error(fault)) => {
                assert_eq!(fault.code, MediaErrorCode::SourceNotSupported)
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}
