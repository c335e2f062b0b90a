use encore_model::Buffering;
use futures::stream::BoxStream;
use std::fmt;
use std::sync::Arc;

/// Shared handle to a media element owned by the preloader's store.
pub type MediaHandle = Arc<dyn MediaElement>;

/// CORS mode for the element's fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrossOrigin {
    #[default]
    Anonymous,
    UseCredentials,
}

/// Attributes applied to a freshly created element before it loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementSettings {
    pub muted: bool,
    pub plays_inline: bool,
    pub cross_origin: CrossOrigin,
    pub buffering: Buffering,
}

impl ElementSettings {
    /// Silent, inline, anonymous-CORS element used for off-screen preloads.
    pub const fn offscreen(buffering: Buffering) -> Self {
        Self {
            muted: true,
            plays_inline: true,
            cross_origin: CrossOrigin::Anonymous,
            buffering,
        }
    }
}

/// Readiness and failure notifications, in the order a browser fires them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaEvent {
    LoadStart,
    /// Duration and dimensions are known (`loadedmetadata`).
    LoadedMetadata,
    /// Enough data is buffered to begin playback (`canplay`).
    CanPlay,
    Error(MediaFault),
}

/// Mirrors the `MediaError.code` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaErrorCode {
    Aborted,
    Network,
    Decode,
    SourceNotSupported,
}

impl fmt::Display for MediaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MediaErrorCode::Aborted => "aborted",
            MediaErrorCode::Network => "network error",
            MediaErrorCode::Decode => "decode error",
            MediaErrorCode::SourceNotSupported => "source not supported",
        };
        f.write_str(label)
    }
}

/// Failure reported by a media element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFault {
    pub code: MediaErrorCode,
    pub message: String,
}

impl MediaFault {
    pub fn new(code: MediaErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for MediaFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

/// A media element the preloader can configure, load and release.
///
/// Implementations use interior mutability; every method takes `&self` so a
/// handle can be shared between the store and any number of consumers.
pub trait MediaElement: Send + Sync + fmt::Debug {
    fn configure(&self, settings: &ElementSettings);

    /// Subscribe to events fired after this call. Subscribe before
    /// [`MediaElement::load`] to observe the whole load.
    fn events(&self) -> BoxStream<'static, MediaEvent>;

    fn set_source(&self, url: &str);

    /// Currently attached source, `None` once released.
    fn source(&self) -> Option<String>;

    /// Start (or restart) fetching the attached source.
    fn load(&self);

    /// Detach the source and drop buffered media so the platform stops
    /// buffering and decoding. Releasing twice is a no-op.
    fn release(&self);
}

/// Creates detached (off-DOM) elements.
pub trait MediaFactory: Send + Sync + fmt::Debug {
    fn create(&self) -> MediaHandle;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offscreen_settings_are_silent_and_inline() {
        let settings = ElementSettings::offscreen(Buffering::Metadata);
        assert!(settings.muted);
        assert!(settings.plays_inline);
        assert_eq!(settings.cross_origin, CrossOrigin::Anonymous);
        assert_eq!(settings.buffering.as_preload_attr(), "metadata");
    }

    #[test]
    fn fault_display_includes_message_when_present() {
        let bare = MediaFault::new(MediaErrorCode::Decode, "");
        assert_eq!(bare.to_string(), "decode error");

        let detailed = MediaFault::new(MediaErrorCode::Network, "HTTP 403");
        assert_eq!(detailed.to_string(), "network error: HTTP 403");
    }
}
