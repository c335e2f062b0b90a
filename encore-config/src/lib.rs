//! Site configuration for Encore.
//!
//! One [`SiteConfig`] carries the preloader, loading gate and registry
//! settings. It is loaded from the environment, a TOML/JSON file or
//! defaults, then checked with [`apply_guard_rails`] before use.

pub mod site;
pub mod validation;

pub use site::{ConfigSource, RegistryConfig, SiteConfig};
pub use validation::{
    ConfigError, ConfigWarning, ConfigWarnings, apply_guard_rails,
};
