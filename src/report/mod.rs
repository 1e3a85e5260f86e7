//! Report generation for recovery results

use std::fmt::Write as _;
use std::path::PathBuf;

use serde::Serialize;

use crate::types::{AssessedFragment, RecoverConfig, RecoveryOutcome, RunSummary, Verdict};

/// JSON structure for fragments (internal serialization)
#[derive(Serialize)]
struct FragmentJson {
    index: usize,
    start: u64,
    end: u64,
    size: u64,
    start_clock: u64,
    end_clock: u64,
    span_ticks: u64,
    duration_secs: f64,
    verdict: Verdict,
}

/// JSON structure for recordings (internal serialization)
#[derive(Serialize)]
struct RecordingJson {
    index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<String>,
    size: u64,
    /// byte offsets of the parts, in export order
    parts: Vec<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_clock: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_clock: Option<u64>,
}

/// JSON structure for complete report (internal serialization)
#[derive(Serialize)]
struct ReportJson<'a> {
    generated: String,
    inputs: Vec<String>,
    config: &'a RecoverConfig,
    fragments: Vec<FragmentJson>,
    recordings: Vec<RecordingJson>,
    summary: &'a RunSummary,
}

/// Report generator for recovery results
pub struct Reporter;

impl Reporter {
    /// Generate pretty-printed JSON string for CLI output
    pub fn generate_json_report(inputs: &[PathBuf], config: &RecoverConfig, outcome: &RecoveryOutcome) -> String {
        let fragments = outcome
            .fragments
            .iter()
            .enumerate()
            .map(|(index, a)| FragmentJson {
                index,
                start: a.fragment.start,
                end: a.fragment.end,
                size: a.fragment.size(),
                start_clock: a.fragment.start_time.ticks(),
                end_clock: a.fragment.end_time.ticks(),
                span_ticks: a.fragment.time_diff().ticks(),
                duration_secs: a.fragment.time_diff().as_duration().as_secs_f64(),
                verdict: a.verdict,
            })
            .collect();

        let recordings = outcome
            .recordings
            .iter()
            .map(|r| RecordingJson {
                index: r.index,
                file: outcome
                    .files
                    .get(r.index)
                    .map(|p| p.display().to_string()),
                size: r.size(),
                parts: r.parts.iter().map(|p| p.start).collect(),
                start_clock: r.start_time().map(|t| t.ticks()),
                end_clock: r.end_time().map(|t| t.ticks()),
            })
            .collect();

        let rep = ReportJson {
            generated: chrono::Utc::now().to_rfc3339(),
            inputs: inputs.iter().map(|p| p.display().to_string()).collect(),
            config,
            fragments,
            recordings,
            summary: &outcome.summary,
        };
        serde_json::to_string_pretty(&rep)
            .unwrap_or_else(|_| "{\"error\": \"JSON serialization failed\"}".to_string())
    }

    /// Human-readable fragment table
    pub fn render_table(fragments: &[AssessedFragment], blocksize: u64) -> String {
        let width = fragments.len().saturating_sub(1).to_string().len();
        let mut out = String::new();
        let rule = format!(
            "{}-+--------------+------------+--------------+--------------+--------------+--------",
            "-".repeat(width)
        );
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(
            out,
            "{:>width$} | {:>12} | {:>10} | {:>12} | {:>12} | {:>12} | Verdict",
            "#", "Start", "Blocks", "Clock Start", "Clock End", "Duration"
        );
        let _ = writeln!(out, "{rule}");
        for (i, a) in fragments.iter().enumerate() {
            let f = &a.fragment;
            let _ = writeln!(
                out,
                "{:>width$} | {:>12} | {:>10} | {:>12} | {:>12} | {:>12} | {}",
                i,
                f.start,
                f.block_count(blocksize),
                f.start_time.ticks(),
                f.end_time.ticks(),
                f.time_diff().to_string(),
                match a.verdict {
                    Verdict::Keep => "keep",
                    Verdict::Discard => "discard",
                }
            );
        }
        out
    }

    /// One-line summary for the end of a run
    pub fn summary_line(summary: &RunSummary) -> String {
        if summary.no_timestamps() {
            return format!("{} blocks read, no timestamps found", summary.blocks);
        }
        format!(
            "{} blocks read ({} timestamped): {} fragments, {} kept, {} discarded, {} recordings, {} bytes written",
            summary.blocks,
            summary.timestamped_blocks,
            summary.fragments,
            summary.kept,
            summary.discarded,
            summary.recordings,
            summary.bytes_written
        )
    }
}
