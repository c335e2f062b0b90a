//! Static mapping from [`VideoKey`] to object-storage URLs and sizes.

use url::Url;

use crate::error::{ModelError, Result};
use crate::video_key::VideoKey;

/// Immutable registry record for one site video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceEntry {
    pub key: VideoKey,
    pub url: &'static str,
    pub size_bytes: u64,
    pub size_label: &'static str,
    /// Whether the page needs the video before first paint.
    pub priority: bool,
}

impl ResourceEntry {
    /// Last path segment of the URL, e.g. `guitar-optimized.mp4`.
    pub fn file_name(&self) -> &'static str {
        file_name_of(self.url)
    }
}

pub(crate) const HERO: ResourceEntry = ResourceEntry {
    key: VideoKey::Hero,
    url: "https://tln-vids.s3.ap-south-1.amazonaws.com/drumkit-optimized-v2.mp4",
    size_bytes: 10_040_000,
    size_label: "10.04 MB",
    priority: true,
};

pub(crate) const GUITAR: ResourceEntry = ResourceEntry {
    key: VideoKey::Guitar,
    url: "https://tln-vids.s3.ap-south-1.amazonaws.com/guitar-optimized.mp4",
    size_bytes: 12_380_000,
    size_label: "12.38 MB",
    priority: false,
};

pub(crate) const VINYL1: ResourceEntry = ResourceEntry {
    key: VideoKey::Vinyl1,
    url: "https://tln-vids.s3.ap-south-1.amazonaws.com/vinyl1-optimized.mp4",
    size_bytes: 11_890_000,
    size_label: "11.89 MB",
    priority: false,
};

pub(crate) const VINYL2: ResourceEntry = ResourceEntry {
    key: VideoKey::Vinyl2,
    url: "https://tln-vids.s3.ap-south-1.amazonaws.com/vinyl2-optimized-v2.mp4",
    size_bytes: 12_490_000,
    size_label: "12.49 MB",
    priority: false,
};

pub(crate) const DRUMCYM: ResourceEntry = ResourceEntry {
    key: VideoKey::Drumcym,
    url: "https://tln-vids.s3.ap-south-1.amazonaws.com/drumcym-optimized.mp4",
    size_bytes: 12_380_000,
    size_label: "12.38 MB",
    priority: false,
};

/// Every static entry in registry order.
pub fn entries() -> impl Iterator<Item = &'static ResourceEntry> {
    VideoKey::ALL.into_iter().map(VideoKey::entry)
}

/// Videos behind the scroll-driven story panels, top to bottom.
pub const fn story_order() -> [VideoKey; 4] {
    [
        VideoKey::Drumcym,
        VideoKey::Guitar,
        VideoKey::Vinyl1,
        VideoKey::Vinyl2,
    ]
}

/// Hero plus the first story panel.
pub const fn default_critical_set() -> [VideoKey; 2] {
    [VideoKey::Hero, VideoKey::Drumcym]
}

pub fn total_size_bytes() -> u64 {
    entries().map(|entry| entry.size_bytes).sum()
}

/// Decimal megabytes with two places, matching the per-entry labels.
pub fn total_size_label() -> String {
    format_megabytes(total_size_bytes())
}

pub(crate) fn format_megabytes(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / 1_000_000.0)
}

fn file_name_of(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// A registry entry after its URL has been resolved against an asset root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntry {
    pub key: VideoKey,
    pub url: String,
    pub size_bytes: u64,
    pub size_label: &'static str,
    pub priority: bool,
}

/// Resolved view of the registry used at runtime.
///
/// The default registry points at the cloud bucket.
/// [`ResourceRegistry::rebased`] serves the same files from another root,
/// e.g. a local `/vids` mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRegistry {
    entries: Vec<ResolvedEntry>,
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self {
            entries: entries()
                .map(|entry| ResolvedEntry {
                    key: entry.key,
                    url: entry.url.to_string(),
                    size_bytes: entry.size_bytes,
                    size_label: entry.size_label,
                    priority: entry.priority,
                })
                .collect(),
        }
    }
}

impl ResourceRegistry {
    /// Registry whose URLs keep their file names but live under `base`.
    ///
    /// Absolute `http(s)` roots are validated; anything else is treated as a
    /// site-relative path prefix.
    pub fn rebased(base: &str) -> Result<Self> {
        let base = base.trim();
        let absolute =
            base.starts_with("http://") || base.starts_with("https://");

        let root = if absolute {
            let mut root =
                Url::parse(base).map_err(|err| ModelError::InvalidBaseUrl {
                    base: base.to_string(),
                    reason: err.to_string(),
                })?;
            if !root.path().ends_with('/') {
                let path = format!("{}/", root.path());
                root.set_path(&path);
            }
            Some(root)
        } else {
            None
        };

        let mut registry = Self::default();
        for entry in &mut registry.entries {
            let file = file_name_of(&entry.url).to_string();
            entry.url = match &root {
                Some(root) => root
                    .join(&file)
                    .map_err(|err| ModelError::InvalidBaseUrl {
                        base: base.to_string(),
                        reason: err.to_string(),
                    })?
                    .to_string(),
                None => format!("{}/{}", base.trim_end_matches('/'), file),
            };
        }
        Ok(registry)
    }

    pub fn get(&self, key: VideoKey) -> &ResolvedEntry {
        // Entries are built from `VideoKey::ALL`, so every key is present at
        // its own index.
        &self.entries[key_index(key)]
    }

    pub fn url(&self, key: VideoKey) -> &str {
        &self.get(key).url
    }

    /// Resolve a list of keys to URLs, preserving order.
    pub fn urls(&self, keys: &[VideoKey]) -> Vec<String> {
        keys.iter().map(|key| self.url(*key).to_string()).collect()
    }

    /// Reverse lookup used by logging and reports.
    pub fn key_for_url(&self, url: &str) -> Option<VideoKey> {
        self.entries
            .iter()
            .find(|entry| entry.url == url)
            .map(|entry| entry.key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedEntry> {
        self.entries.iter()
    }
}

const fn key_index(key: VideoKey) -> usize {
    match key {
        VideoKey::Hero => 0,
        VideoKey::Guitar => 1,
        VideoKey::Vinyl1 => 2,
        VideoKey::Vinyl2 => 3,
        VideoKey::Drumcym => 4,
    }
}
