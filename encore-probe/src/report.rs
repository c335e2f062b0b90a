//! Text and JSON rendering of probe results.

use encore_core::CriticalSetReport;
use encore_core::adapters::LoadingProgress;
use encore_core::adapters::loading_gate::footer_text;
use encore_model::{LoadPriority, PreloadStats, ResourceRegistry, VideoKey};
use serde::Serialize;
use std::io::{self, Write};
use std::time::Duration;

#[derive(Debug, Serialize)]
pub(crate) struct OutcomeLine {
    pub key: VideoKey,
    pub url: String,
    pub priority: LoadPriority,
    pub ready: bool,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CriticalSummary {
    pub outcomes: Vec<OutcomeLine>,
    pub stats: PreloadStats,
    pub elapsed_ms: u64,
}

impl CriticalSummary {
    pub(crate) fn new(
        report: &CriticalSetReport,
        stats: PreloadStats,
        elapsed: Duration,
    ) -> Self {
        let outcomes = report
            .outcomes
            .iter()
            .map(|outcome| OutcomeLine {
                key: outcome.key,
                url: outcome.url.clone(),
                priority: outcome.priority,
                ready: outcome.is_ready(),
                error: outcome.result.as_ref().err().map(ToString::to_string),
            })
            .collect();
        Self {
            outcomes,
            stats,
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }

    fn render(&self, out: &mut impl Write) -> io::Result<()> {
        for line in &self.outcomes {
            let status = if line.ready { "ready" } else { "FAILED" };
            write!(
                out,
                "{:<8} {:<10} {:<7}",
                line.key.as_str(),
                priority_label(line.priority),
                status
            )?;
            match &line.error {
                Some(error) => writeln!(out, " {error}")?,
                None => writeln!(out, " {}", line.url)?,
            }
        }
        writeln!(
            out,
            "preloaded {}/{} in {} ms",
            self.stats.preloaded,
            self.outcomes.len(),
            self.elapsed_ms
        )
    }
}

#[derive(Debug, Serialize)]
struct RegistryLine<'a> {
    key: VideoKey,
    url: &'a str,
    size_bytes: u64,
    size_label: &'a str,
    priority: bool,
}

fn registry_lines(registry: &ResourceRegistry) -> Vec<RegistryLine<'_>> {
    registry
        .iter()
        .map(|entry| RegistryLine {
            key: entry.key,
            url: &entry.url,
            size_bytes: entry.size_bytes,
            size_label: entry.size_label,
            priority: entry.priority,
        })
        .collect()
}

fn render_registry(
    registry: &ResourceRegistry,
    out: &mut impl Write,
) -> io::Result<()> {
    for line in registry_lines(registry) {
        let flag = if line.priority { "*" } else { " " };
        writeln!(
            out,
            "{flag} {:<8} {:>9}  {}",
            line.key.as_str(),
            line.size_label,
            line.url
        )?;
    }
    writeln!(out, "{}", footer_text())
}

fn priority_label(priority: LoadPriority) -> &'static str {
    match priority {
        LoadPriority::Critical => "critical",
        LoadPriority::Background => "background",
    }
}

pub(crate) fn print_registry(
    registry: &ResourceRegistry,
    json: bool,
) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &registry_lines(registry))?;
        writeln!(out)?;
    } else {
        render_registry(registry, &mut out)?;
    }
    Ok(())
}

pub(crate) fn print_critical(
    summary: &CriticalSummary,
    json: bool,
) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, summary)?;
        writeln!(out)?;
    } else {
        summary.render(&mut out)?;
    }
    Ok(())
}

pub(crate) fn print_progress(
    progress: &LoadingProgress,
    json: bool,
) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    if json {
        serde_json::to_writer(&mut out, progress)?;
        writeln!(out)?;
    } else {
        writeln!(
            out,
            "[{:>5.1}%] {}",
            progress.percent,
            progress.stage_text()
        )?;
    }
    Ok(())
}
