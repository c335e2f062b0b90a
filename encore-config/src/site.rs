use anyhow::{Context, anyhow};
use encore_core::{LoadingGateConfig, PreloaderConfig};
use encore_model::ResourceRegistry;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::validation::ConfigError;

/// Path to a TOML or JSON config file.
pub const CONFIG_PATH_VAR: &str = "ENCORE_CONFIG_PATH";
/// Inline JSON config.
pub const CONFIG_JSON_VAR: &str = "ENCORE_CONFIG_JSON";

const DEFAULT_FILES: &[&str] = &[
    "encore.toml",
    "encore.json",
    "config/encore.toml",
    "config/encore.json",
];

/// Source that produced the site configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigSource {
    #[default]
    Default,
    EnvPath(PathBuf),
    EnvInline,
    File(PathBuf),
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => f.write_str("built-in defaults"),
            ConfigSource::EnvPath(path) => {
                write!(f, "${CONFIG_PATH_VAR} ({})", path.display())
            }
            ConfigSource::EnvInline => write!(f, "${CONFIG_JSON_VAR}"),
            ConfigSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Where the video files are served from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Root that replaces the object-storage bucket, e.g.
    /// `https://cdn.example.com/vids` or a site-relative `/vids`.
    pub asset_base_url: Option<String>,
}

impl RegistryConfig {
    pub fn registry(&self) -> Result<ResourceRegistry, ConfigError> {
        match self.asset_base_url.as_deref().map(str::trim) {
            Some(base) if !base.is_empty() => {
                Ok(ResourceRegistry::rebased(base)?)
            }
            _ => Ok(ResourceRegistry::default()),
        }
    }
}

/// Everything a page (or the probe) needs to build its video pipeline.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    pub preloader: PreloaderConfig,
    pub loading_gate: LoadingGateConfig,
    pub registry: RegistryConfig,
}

impl SiteConfig {
    /// Load from `$ENCORE_CONFIG_PATH`, then `$ENCORE_CONFIG_JSON`, then a
    /// default file in the working directory, then built-in defaults.
    pub fn load_from_env() -> anyhow::Result<(Self, ConfigSource)> {
        let cwd = env::current_dir()
            .context("failed to resolve the working directory")?;
        Self::load_with(|name| env::var(name).ok(), &cwd)
    }

    /// [`SiteConfig::load_from_env`] with an explicit variable lookup and
    /// directory for the default files.
    pub fn load_with(
        lookup: impl Fn(&str) -> Option<String>,
        search_root: &Path,
    ) -> anyhow::Result<(Self, ConfigSource)> {
        if let Some(path_str) = lookup(CONFIG_PATH_VAR)
            && !path_str.trim().is_empty()
        {
            let path = PathBuf::from(path_str.trim());
            let config = Self::load_from_file(&path)?;
            return Ok((config, ConfigSource::EnvPath(path)));
        }

        if let Some(raw) = lookup(CONFIG_JSON_VAR)
            && !raw.trim().is_empty()
        {
            let parsed = Self::parse_json(&raw)
                .with_context(|| format!("failed to parse {CONFIG_JSON_VAR}"))?;
            return Ok((parsed, ConfigSource::EnvInline));
        }

        if let Some(path) = Self::find_default_file(search_root) {
            let config = Self::load_from_file(&path)?;
            return Ok((config, ConfigSource::File(path)));
        }

        Ok((Self::default(), ConfigSource::Default))
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path).with_context(|| {
            format!("failed to read site config from {}", path.display())
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::parse_json(&contents).with_context(|| {
                format!("invalid site config {}", path.display())
            }),
            Some("toml") | Some("tml") => {
                toml::from_str(&contents).map_err(|err| {
                    anyhow!("invalid site config {}: {}", path.display(), err)
                })
            }
            _ => Self::parse_from_str(&contents, &path.display().to_string()),
        }
    }

    pub fn parse_from_str(
        contents: &str,
        origin: &str,
    ) -> anyhow::Result<Self> {
        // TOML first, JSON as a fallback.
        toml::from_str(contents).or_else(|toml_err| {
            serde_json::from_str(contents).map_err(|json_err| {
                anyhow!(
                    "failed to parse site config {}: toml error: {}; json error: {}",
                    origin,
                    toml_err,
                    json_err
                )
            })
        })
    }

    pub fn parse_json(raw: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw)
            .map_err(|err| anyhow!("invalid site config json: {err}"))
    }

    /// Resolved registry for this site.
    pub fn registry(&self) -> Result<ResourceRegistry, ConfigError> {
        self.registry.registry()
    }

    fn find_default_file(root: &Path) -> Option<PathBuf> {
        DEFAULT_FILES
            .iter()
            .map(|candidate| root.join(candidate))
            .find(|path| path.exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encore_model::VideoKey;

    #[test]
    fn toml_sections_override_only_named_fields() {
        let config = SiteConfig::parse_from_str(
            r#"
            [preloader]
            background_timeout_ms = 4000
            critical_set = ["hero", "guitar"]

            [loading_gate]
            max_wait_ms = 8000
            "#,
            "inline",
        )
        .unwrap();

        assert_eq!(config.preloader.background_timeout_ms, 4_000);
        assert_eq!(config.preloader.critical_timeout_ms, 5_000);
        assert_eq!(
            config.preloader.critical_set,
            vec![VideoKey::Hero, VideoKey::Guitar]
        );
        assert_eq!(config.loading_gate.max_wait_ms, 8_000);
        assert_eq!(config.loading_gate.min_display_ms, 3_000);
        assert_eq!(config.registry, RegistryConfig::default());
    }

    #[test]
    fn json_is_accepted_as_a_fallback() {
        let config = SiteConfig::parse_from_str(
            r#"{"preloader": {"save_data": true}}"#,
            "inline",
        )
        .unwrap();
        assert!(config.preloader.save_data);
    }

    #[test]
    fn garbage_reports_both_parsers() {
        let err = SiteConfig::parse_from_str("{{ nope", "inline")
            .unwrap_err()
            .to_string();
        assert!(err.contains("toml error"));
        assert!(err.contains("json error"));
    }

    #[test]
    fn unknown_video_key_is_rejected() {
        assert!(
            SiteConfig::parse_json(
                r#"{"preloader": {"critical_set": ["bass"]}}"#
            )
            .is_err()
        );
    }

    #[test]
    fn blank_base_url_keeps_the_cloud_registry() {
        let registry = RegistryConfig {
            asset_base_url: Some("  ".into()),
        };
        assert_eq!(registry.registry().unwrap(), ResourceRegistry::default());
    }

    #[test]
    fn local_base_url_keeps_file_names() {
        let registry = RegistryConfig {
            asset_base_url: Some("/vids".into()),
        }
        .registry()
        .unwrap();
        assert_eq!(
            registry.url(VideoKey::Hero),
            "/vids/drumkit-optimized-v2.mp4"
        );
    }
}
