/// Point-in-time view of the preloader's store.
///
/// [`PreloadStats::new`] derives `total` from the other two counts. The
/// fields stay public, so a hand-built value can disagree with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PreloadStats {
    pub preloaded: usize,
    pub loading: usize,
    pub total: usize,
}

impl PreloadStats {
    pub const fn new(preloaded: usize, loading: usize) -> Self {
        Self {
            preloaded,
            loading,
            total: preloaded + loading,
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Ready share of everything requested so far, in `0.0..=1.0`.
    pub fn ready_fraction(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.preloaded as f32 / self.total as f32
        }
    }
}
