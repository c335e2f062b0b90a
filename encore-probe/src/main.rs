//! # Encore Probe
//!
//! Warms the site's videos against the real object store and reports what a
//! visitor's browser would see: which critical videos become ready, how long
//! the loading screen stays up, and where each file is served from.

mod cli;
mod report;

use anyhow::Context;
use clap::Parser;
use encore_config::{ConfigSource, SiteConfig, apply_guard_rails};
use encore_core::VideoPreloader;
use encore_core::adapters::LoadingGate;
use encore_core::backend::{HttpBackendOptions, HttpMediaFactory};
use encore_model::ResourceRegistry;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_file_loaded = dotenvy::dotenv().is_ok();
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,encore_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if env_file_loaded {
        debug!("loaded .env file");
    }

    let (config, source) = load_config(&cli)?;
    let warnings =
        apply_guard_rails(&config).context("configuration rejected")?;
    for warning in &warnings.items {
        warn!(hint = ?warning.hint, "{}", warning.message);
    }
    info!(source = %source, "configuration loaded");

    let registry = config.registry().context("failed to resolve registry")?;

    match cli.command {
        Command::Registry => {
            report::print_registry(&registry, cli.json)?;
        }
        Command::Critical { ref keys } => {
            let preloader = http_preloader(&cli, &config, registry)?;
            let started = Instant::now();
            let outcome = preloader.preload_critical_set(keys).await;
            let summary = report::CriticalSummary::new(
                &outcome,
                preloader.stats(),
                started.elapsed(),
            );
            preloader.cleanup();
            report::print_critical(&summary, cli.json)?;
        }
        Command::Gate => {
            let preloader = http_preloader(&cli, &config, registry)?;
            let gate = LoadingGate::new(
                preloader.clone(),
                config.loading_gate.clone(),
            );

            let mut updates = gate.subscribe();
            let json = cli.json;
            let printer = tokio::spawn(async move {
                while updates.changed().await.is_ok() {
                    let progress = updates.borrow_and_update().clone();
                    if let Err(err) = report::print_progress(&progress, json) {
                        warn!(error = %err, "failed to print progress");
                    }
                }
            });

            let last = gate.run().await;
            drop(gate);
            printer.await.context("progress printer panicked")?;
            info!(
                preloaded = last.preloaded,
                expected = last.expected,
                stats = ?preloader.stats(),
                "loading screen dismissed"
            );
            preloader.cleanup();
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<(SiteConfig, ConfigSource)> {
    let (mut config, source) = match &cli.config {
        Some(path) => (
            SiteConfig::load_from_file(path)?,
            ConfigSource::File(path.clone()),
        ),
        None => SiteConfig::load_from_env()?,
    };

    if let Some(base) = &cli.asset_base_url {
        config.registry.asset_base_url = Some(base.clone());
    }
    if cli.save_data {
        config.preloader.save_data = true;
    }
    Ok((config, source))
}

fn http_preloader(
    cli: &Cli,
    config: &SiteConfig,
    registry: ResourceRegistry,
) -> anyhow::Result<VideoPreloader> {
    let client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(cli.connect_timeout_secs))
        .user_agent(concat!("encore-probe/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build HTTP client")?;

    let factory = HttpMediaFactory::new(client, HttpBackendOptions::default());
    Ok(VideoPreloader::with_registry(
        Arc::new(factory),
        config.preloader.clone(),
        registry,
    ))
}
