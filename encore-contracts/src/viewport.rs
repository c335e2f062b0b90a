use futures::stream::BoxStream;
use std::fmt;

/// Observer configuration, as passed to `IntersectionObserver`.
#[derive(Debug, Clone, PartialEq)]
pub struct ObserverOptions {
    /// Margin in CSS pixels that grows the viewport on every side.
    pub root_margin_px: u32,
    /// Visibility ratios at which the platform reports an entry.
    pub thresholds: Vec<f32>,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            root_margin_px: 50,
            thresholds: vec![0.1, 0.25, 0.5],
        }
    }
}

/// One visibility report for an observed element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub is_intersecting: bool,
    pub ratio: f32,
}

impl IntersectionEntry {
    pub const fn visible(ratio: f32) -> Self {
        Self {
            is_intersecting: true,
            ratio,
        }
    }

    pub const fn hidden() -> Self {
        Self {
            is_intersecting: false,
            ratio: 0.0,
        }
    }

    /// Intersecting and strictly above `min_ratio`.
    pub fn exceeds(&self, min_ratio: f32) -> bool {
        self.is_intersecting && self.ratio > min_ratio
    }
}

/// An on-screen element whose visibility can be observed.
pub trait ViewportTarget: Send + Sync + fmt::Debug {
    /// Start observing. Dropping the stream stops observation.
    fn intersections(
        &self,
        options: &ObserverOptions,
    ) -> BoxStream<'static, IntersectionEntry>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_exclusive() {
        assert!(!IntersectionEntry::visible(0.1).exceeds(0.1));
        assert!(IntersectionEntry::visible(0.25).exceeds(0.1));
        assert!(!IntersectionEntry::hidden().exceeds(0.0));
    }
}
