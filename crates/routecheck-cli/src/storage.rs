//! Run report storage
//!
//! Every `routecheck run` is saved regardless of `--output` mode.
//! Directory layout: `{report_dir}/{timestamp}_{selection}[_{filter}][-N]/`

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};

use routecheck_core::report::{sanitize_filename, write_reports};
use routecheck_core::{Config, Verdict};
use routecheck_runner::SuiteSummary;

/// Everything needed to persist a run.
pub struct RunData<'a> {
    pub config: &'a Config,
    pub summary: &'a SuiteSummary,
    pub verdict: &'a Verdict,
    /// Suite name or "all"
    pub selection: &'a str,
    /// `--filter` text, if any
    pub filter: Option<&'a str>,
}

/// Save a run under `base`. Returns the run directory.
///
/// Writes the per-scenario attachments and `index.json`, then `summary.json`
/// and a `config.toml` snapshot with the API key masked.
pub fn save_run(base: &Path, data: &RunData) -> Result<PathBuf> {
    let run_dir = unique_dir(base, &build_dir_name(data.selection, data.filter));
    write_reports(&data.summary.reports, &run_dir)
        .with_context(|| format!("writing scenario reports to {}", run_dir.display()))?;

    let mut snapshot = data.config.clone();
    if !snapshot.api_key.is_empty() {
        snapshot.api_key = "***".to_string();
    }
    let config_toml = toml::to_string_pretty(&snapshot).context("serializing config snapshot")?;
    std::fs::write(run_dir.join("config.toml"), config_toml)?;

    let summary = serde_json::json!({
        "verdict": {
            "status": data.verdict.status.to_string(),
            "exit_code": data.verdict.exit_code,
            "reason": data.verdict.reason,
        },
        "stats": {
            "total": data.summary.total,
            "passed": data.summary.passed,
            "failed": data.summary.failed,
        },
        "meta": {
            "timestamp": timestamp_iso(),
            "selection": data.selection,
            "filter": data.filter,
            "duration_ms": data.summary.duration_ms,
            "routing_url": data.config.routing_url,
            "places_url": data.config.places_url,
        },
    });
    std::fs::write(
        run_dir.join("summary.json"),
        serde_json::to_string_pretty(&summary)?,
    )?;

    Ok(run_dir)
}

/// `{timestamp}_{selection}[_{filter}]` e.g. `20261016T093000_routing_traffic_modes`
fn build_dir_name(selection: &str, filter: Option<&str>) -> String {
    match filter {
        Some(f) => format!("{}_{selection}_{}", timestamp_compact(), sanitize_filename(f)),
        None => format!("{}_{selection}", timestamp_compact()),
    }
}

/// `base/name`, or `base/name-2`, `base/name-3`, ... when already taken.
fn unique_dir(base: &Path, name: &str) -> PathBuf {
    let first = base.join(name);
    if !first.exists() {
        return first;
    }
    (2..)
        .map(|n| base.join(format!("{name}-{n}")))
        .find(|p| !p.exists())
        .unwrap_or(first)
}

/// `"20261016T093000"`
fn timestamp_compact() -> String {
    let (y, mo, d, h, mi, s) = utc_now();
    format!("{y:04}{mo:02}{d:02}T{h:02}{mi:02}{s:02}")
}

/// `"2026-10-16T09:30:00Z"`
fn timestamp_iso() -> String {
    let (y, mo, d, h, mi, s) = utc_now();
    format!("{y:04}-{mo:02}-{d:02}T{h:02}:{mi:02}:{s:02}Z")
}

fn utc_now() -> (i32, u32, u32, u32, u32, u32) {
    let epoch_secs = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    let days = (epoch_secs / 86400) as i64;
    let tod = epoch_secs % 86400;
    let (y, m, d) = civil_from_days(days);
    (
        y,
        m,
        d,
        (tod / 3600) as u32,
        ((tod % 3600) / 60) as u32,
        (tod % 60) as u32,
    )
}

/// Epoch days to (year, month, day), after Howard Hinnant's `civil_from_days`.
fn civil_from_days(days: i64) -> (i32, u32, u32) {
    let z = days + 719_468;
    let era = (if z >= 0 { z } else { z - 146_096 }) / 146_097;
    let doe = (z - era * 146_097) as u32;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    (y as i32, m, d)
}
