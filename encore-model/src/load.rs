
/// Buffering hint handed to a media element (`preload` attribute).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Buffering {
    /// Fetch enough to know duration and dimensions only.
    Metadata,
    /// Buffer playable data.
    Full,
}

impl Buffering {
    /// Value of the HTML `preload` attribute.
    pub const fn as_preload_attr(self) -> &'static str {
        match self {
            Buffering::Metadata => "metadata",
            Buffering::Full => "auto",
        }
    }
}

/// Priority tier for a single preload request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LoadPriority {
    /// Needed before the page can be shown; buffers fully and waits longer.
    Critical,
    /// Metadata-only warmup: lazy loads, prefetch, secondary critical entries.
    #[default]
    Background,
}

impl LoadPriority {
    pub const fn from_flag(priority: bool) -> Self {
        if priority {
            LoadPriority::Critical
        } else {
            LoadPriority::Background
        }
    }

    pub const fn is_critical(self) -> bool {
        matches!(self, LoadPriority::Critical)
    }

    /// Buffering requested when bandwidth is not constrained.
    pub const fn buffering(self) -> Buffering {
        match self {
            LoadPriority::Critical => Buffering::Full,
            LoadPriority::Background => Buffering::Metadata,
        }
    }
}

/// Per-URL lifecycle as observed by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LoadState {
    Unrequested,
    Loading,
    Ready,
}
