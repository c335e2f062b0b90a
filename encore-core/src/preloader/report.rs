use encore_model::{LoadPriority, VideoKey};

use crate::error::PreloadError;

/// Settled result of one entry of a critical-set preload.
#[derive(Debug, Clone)]
pub struct CriticalOutcome {
    pub key: VideoKey,
    pub url: String,
    pub priority: LoadPriority,
    pub result: Result<(), PreloadError>,
}

impl CriticalOutcome {
    pub fn is_ready(&self) -> bool {
        self.result.is_ok()
    }
}

/// Every outcome of a `preload_critical_set` call, in request order.
#[derive(Debug, Clone, Default)]
pub struct CriticalSetReport {
    pub outcomes: Vec<CriticalOutcome>,
}

impl CriticalSetReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &CriticalOutcome> {
        self.outcomes.iter().filter(|outcome| outcome.is_ready())
    }

    pub fn failed(&self) -> impl Iterator<Item = &CriticalOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_ready())
    }

    pub fn all_ready(&self) -> bool {
        self.outcomes.iter().all(CriticalOutcome::is_ready)
    }

    pub fn outcome(&self, key: VideoKey) -> Option<&CriticalOutcome> {
        self.outcomes.iter().find(|outcome| outcome.key == key)
    }
}
