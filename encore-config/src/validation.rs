use encore_model::ModelError;
use thiserror::Error;

use crate::site::SiteConfig;

/// Settings that would make the pipeline misbehave.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },
    #[error("{field} must be within {range}, got {value}")]
    OutOfRange {
        field: &'static str,
        range: &'static str,
        value: f32,
    },
    #[error("invalid registry configuration: {0}")]
    Registry(#[from] ModelError),
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Reject unusable settings and collect the questionable ones.
pub fn apply_guard_rails(
    config: &SiteConfig,
) -> Result<ConfigWarnings, ConfigError> {
    let mut warnings = ConfigWarnings::default();
    let preloader = &config.preloader;
    let gate = &config.loading_gate;

    for (field, value) in [
        ("preloader.critical_timeout_ms", preloader.critical_timeout_ms),
        ("preloader.background_timeout_ms", preloader.background_timeout_ms),
        ("loading_gate.max_wait_ms", gate.max_wait_ms),
    ] {
        if value == 0 {
            return Err(ConfigError::ZeroDuration { field });
        }
    }

    if !(0.0..1.0).contains(&preloader.lazy_trigger_ratio) {
        return Err(ConfigError::OutOfRange {
            field: "preloader.lazy_trigger_ratio",
            range: "[0, 1)",
            value: preloader.lazy_trigger_ratio,
        });
    }
    if let Some(&bad) = preloader
        .lazy_thresholds
        .iter()
        .find(|threshold| !(0.0..=1.0).contains(*threshold))
    {
        return Err(ConfigError::OutOfRange {
            field: "preloader.lazy_thresholds",
            range: "[0, 1]",
            value: bad,
        });
    }

    config.registry()?;

    if preloader.critical_set.is_empty() {
        warnings.push_with_hint(
            "preloader.critical_set is empty; nothing is warmed before first paint",
            "List at least the hero video",
        );
    }
    if preloader.critical_timeout_ms < preloader.background_timeout_ms {
        warnings.push(
            "critical watchdog is shorter than the background watchdog; full buffering will time out first",
        );
    }
    if gate.max_wait_ms < gate.min_display_ms {
        warnings.push_with_hint(
            "loading_gate.max_wait_ms is below min_display_ms; the cap never applies",
            "Raise max_wait_ms or lower min_display_ms",
        );
    }
    if gate.videos.is_empty() {
        warnings.push(
            "loading_gate.videos is empty; the gate only waits out its pauses",
        );
    }

    Ok(warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_without_warnings() {
        let warnings = apply_guard_rails(&SiteConfig::default()).unwrap();
        assert!(warnings.is_empty(), "{warnings:?}");
    }

    #[test]
    fn zero_watchdog_is_rejected() {
        let mut config = SiteConfig::default();
        config.preloader.background_timeout_ms = 0;
        let err = apply_guard_rails(&config).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ZeroDuration {
                field: "preloader.background_timeout_ms"
            }
        ));
    }

    #[test]
    fn full_visibility_trigger_is_rejected() {
        let mut config = SiteConfig::default();
        config.preloader.lazy_trigger_ratio = 1.0;
        assert!(matches!(
            apply_guard_rails(&config),
            Err(ConfigError::OutOfRange { .. })
        ));
    }

    #[test]
    fn malformed_asset_root_is_rejected() {
        let mut config = SiteConfig::default();
        config.registry.asset_base_url = Some("https://".into());
        assert!(matches!(
            apply_guard_rails(&config),
            Err(ConfigError::Registry(_))
        ));
    }

    #[test]
    fn questionable_gate_timing_warns() {
        let mut config = SiteConfig::default();
        config.loading_gate.max_wait_ms = 1_000;
        config.preloader.critical_set.clear();
        let warnings = apply_guard_rails(&config).unwrap();
        assert_eq!(warnings.items.len(), 2);
    }
}
