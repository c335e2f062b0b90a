use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::error::ModelError;
use crate::registry::{self, ResourceEntry};

/// Symbolic identifier for every video the site ships.
///
/// The set is closed: adding a variant without a registry entry fails to
/// compile because [`VideoKey::entry`] matches exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum VideoKey {
    /// Drum kit loop behind the landing hero.
    Hero,
    Guitar,
    Vinyl1,
    Vinyl2,
    /// Cymbal close-up, first story panel.
    Drumcym,
}

impl VideoKey {
    /// Every key, hero first, in registry order.
    pub const ALL: [VideoKey; 5] = [
        VideoKey::Hero,
        VideoKey::Guitar,
        VideoKey::Vinyl1,
        VideoKey::Vinyl2,
        VideoKey::Drumcym,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            VideoKey::Hero => "hero",
            VideoKey::Guitar => "guitar",
            VideoKey::Vinyl1 => "vinyl1",
            VideoKey::Vinyl2 => "vinyl2",
            VideoKey::Drumcym => "drumcym",
        }
    }

    /// Static registry record for this key.
    pub const fn entry(self) -> &'static ResourceEntry {
        match self {
            VideoKey::Hero => &registry::HERO,
            VideoKey::Guitar => &registry::GUITAR,
            VideoKey::Vinyl1 => &registry::VINYL1,
            VideoKey::Vinyl2 => &registry::VINYL2,
            VideoKey::Drumcym => &registry::DRUMCYM,
        }
    }

    /// Remote URL in the default (cloud) registry.
    pub const fn url(self) -> &'static str {
        self.entry().url
    }
}

impl Display for VideoKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VideoKey {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        VideoKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ModelError::UnknownKey(s.to_string()))
    }
}
