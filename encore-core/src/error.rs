use encore_contracts::media_element::MediaFault;
use encore_model::ModelError;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single preload.
///
/// `Clone` because one in-flight load hands the same result to every caller
/// that joined it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PreloadError {
    #[error("video preload timed out after {after:?}: {url}")]
    LoadTimeout { url: String, after: Duration },

    #[error("failed to preload video {url}: {fault}")]
    LoadFailure { url: String, fault: MediaFault },

    #[error(transparent)]
    UnknownKey(#[from] ModelError),

    /// The store was cleaned up while the load was in flight.
    #[error("video preload abandoned: {url}")]
    Abandoned { url: String },
}

impl PreloadError {
    /// URL the failure refers to, if any.
    pub fn url(&self) -> Option<&str> {
        match self {
            PreloadError::LoadTimeout { url, .. }
            | PreloadError::LoadFailure { url, .. }
            | PreloadError::Abandoned { url } => Some(url),
            PreloadError::UnknownKey(_) => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, PreloadError::LoadTimeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, PreloadError>;
