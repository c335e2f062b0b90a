//! # Encore Core
//!
//! Video preloading and playback-readiness pipeline for the Encore band site.
//!
//! ## Overview
//!
//! - **Preloader** ([`preloader::VideoPreloader`]): one keyed store of
//!   per-URL slots (`Loading` or `Ready`) that deduplicates concurrent loads,
//!   arms a watchdog per load, tracks lazy-load observers and reports
//!   [`PreloadStats`](encore_model::PreloadStats).
//! - **Adapters** ([`adapters`]): the non-visual halves of the loading screen
//!   and of a rendered video, built on the preloader's public surface.
//! - **Backend** ([`backend`]): an HTTP implementation of the media element
//!   contract for native hosts (feature `http`).
//!
//! ## Feature Flags
//!
//! - `http` (default): reqwest-backed media elements.
//! - `test-utils`: scripted fake media elements and viewports.
//!
//! ## Examples
//!
//! ```no_run
//! use encore_core::{PreloaderConfig, VideoPreloader};
//! use encore_model::{LoadPriority, VideoKey};
//!
//! # #[cfg(feature = "http")]
//! async fn warm() -> Result<(), Box<dyn std::error::Error>> {
//!     let factory = encore_core::backend::HttpMediaFactory::new(
//!         reqwest::Client::new(),
//!         Default::default(),
//!     );
//!     let preloader = VideoPreloader::new(
//!         std::sync::Arc::new(factory),
//!         PreloaderConfig::default(),
//!     );
//!
//!     let report = preloader.preload_critical_set(&[]).await;
//!     println!("{} ready", report.succeeded().count());
//!
//!     let hero = preloader
//!         .preload_key(VideoKey::Hero, LoadPriority::Critical)
//!         .await?;
//!     println!("hero source: {:?}", hero.source());
//!     preloader.cleanup();
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod adapters;
#[cfg(feature = "http")]
pub mod backend;
pub mod config;
pub mod constants;
pub mod error;
pub mod preloader;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use config::{LoadingGateConfig, PreloaderConfig};
pub use error::{PreloadError, Result};
pub use preloader::{CriticalSetReport, PreloadFuture, VideoPreloader};
