//! Plain-text rendering of screening results and report delivery.

use crate::models::signal::{ScreeningResult, SignalRecord, VolumeSurgeRecord, VolumeSurgeResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Write;
use thiserror::Error;
use tracing::info;

/// Candidates shown per section of a combined report.
pub const SECTION_TOP: usize = 5;
/// Signal labels shown per candidate in a combined report.
pub const SECTION_SIGNALS: usize = 3;

pub const NO_CANDIDATES: &str = "No candidates found.";
pub const DISCLAIMER: &str =
    "For reference only. This is not investment advice; every investment decision is your own.";

pub struct ReportSection<'a> {
    pub heading: &'a str,
    pub result: &'a ScreeningResult,
}

impl<'a> ReportSection<'a> {
    pub fn new(heading: &'a str, result: &'a ScreeningResult) -> Self {
        Self { heading, result }
    }
}

/// Combined report: the top few candidates of every section.
pub fn render_scan_report(
    title: &str,
    sections: &[ReportSection<'_>],
    generated_at: DateTime<Utc>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}", title);
    let _ = writeln!(out, "Scanned at {}", format_timestamp(generated_at));

    for section in sections {
        let _ = writeln!(out);
        let _ = writeln!(out, "## {} (top {})", section.heading, SECTION_TOP);
        if section.result.is_empty() {
            let _ = writeln!(out, "{}", NO_CANDIDATES);
            continue;
        }
        for record in section.result.records.iter().take(SECTION_TOP) {
            let _ = writeln!(out, "- **{}**{}", record.display_name, id_suffix(record));
            let _ = writeln!(
                out,
                "  price {} | change {:+.2}% | signals: {}",
                record.current_price,
                record.price_change_pct,
                record
                    .signals
                    .iter()
                    .take(SECTION_SIGNALS)
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }

    push_footer(&mut out);
    out
}

/// Single-profile report listing every ranked candidate in full.
pub fn render_ranked_report(
    title: &str,
    result: &ScreeningResult,
    generated_at: DateTime<Utc>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}", title);
    let _ = writeln!(out, "Scanned at {}", format_timestamp(generated_at));
    let _ = writeln!(out);

    if result.is_empty() {
        let _ = writeln!(out, "{}", NO_CANDIDATES);
    } else {
        for (rank, record) in result.records.iter().enumerate() {
            out.push_str(&render_record_detail(Some(rank + 1), record));
        }
    }

    if !result.failures.is_empty() {
        let _ = writeln!(
            out,
            "({} of {} instruments could not be analyzed)",
            result.failures.len(),
            result.scanned
        );
    }

    push_footer(&mut out);
    out
}

/// One analyzed instrument with every indicator reading and signal.
pub fn render_record_detail(rank: Option<usize>, record: &SignalRecord) -> String {
    let mut out = String::new();
    match rank {
        Some(rank) => {
            let _ = writeln!(out, "{}. {}{}", rank, record.display_name, id_suffix(record));
        }
        None => {
            let _ = writeln!(out, "{}{}", record.display_name, id_suffix(record));
        }
    }
    let _ = writeln!(out, "   price: {}", record.current_price);
    let _ = writeln!(out, "   change: {:+.2}%", record.price_change_pct);
    match record.rsi {
        Some(rsi) => {
            let _ = writeln!(out, "   RSI: {:.2}", rsi);
        }
        None => {
            let _ = writeln!(out, "   RSI: n/a");
        }
    }
    let _ = writeln!(out, "   volume ratio: {:.2}x", record.volume_ratio);
    if record.signals.is_empty() {
        let _ = writeln!(out, "   signals: none");
    } else {
        let _ = writeln!(
            out,
            "   signals ({}): {}",
            record.signal_count,
            record.signals.join(", ")
        );
    }
    out
}

/// Volume-surge ranking, one entry per candidate.
pub fn render_volume_report(
    title: &str,
    result: &VolumeSurgeResult,
    generated_at: DateTime<Utc>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}", title);
    let _ = writeln!(out, "Scanned at {}", format_timestamp(generated_at));
    let _ = writeln!(out);

    if result.is_empty() {
        let _ = writeln!(out, "{}", NO_CANDIDATES);
    } else {
        for (rank, record) in result.records.iter().enumerate() {
            out.push_str(&render_volume_record(rank + 1, record));
        }
    }

    if !result.failures.is_empty() {
        let _ = writeln!(
            out,
            "({} of {} instruments could not be analyzed)",
            result.failures.len(),
            result.scanned
        );
    }

    push_footer(&mut out);
    out
}

fn render_volume_record(rank: usize, record: &VolumeSurgeRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}. {}{}",
        rank,
        record.display_name,
        name_suffix(&record.display_name, &record.instrument_id)
    );
    let _ = writeln!(
        out,
        "   close {} | change {:+.2}% | volume {} vs avg {} ({:.2}x)",
        record.close,
        record.price_change_pct,
        record.volume,
        record.average_volume,
        record.volume_ratio
    );
    out
}

/// Usage text: what can be requested, which rules are checked, and the disclaimer.
pub fn render_help() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# tickerscan");
    let _ = writeln!(out, "Technical buy-interest screener for equities and crypto.");
    let _ = writeln!(out);
    let _ = writeln!(out, "## Scans");
    for (name, what) in [
        ("all", "equities and crypto, top 5 of each"),
        ("equities", "equities ranked by signal count (top 10)"),
        ("crypto", "crypto ranked by signal count (top 10)"),
        ("volume", "latest volume against the 20-bar average, 1.5x and up (top 20)"),
        ("analyze <id>", "every reading and signal for one instrument"),
    ] {
        let _ = writeln!(out, "- {}: {}", name, what);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "## Signals");
    for rule in [
        "RSI(14) leaving or sitting in oversold (35)",
        "MACD(12, 26) crossing above zero",
        "EMA(5) crossing or staying above EMA(20)",
        "Bollinger %B(20, 2) bouncing off the lower band (0.2)",
        "Volume at 1.5x the 29-bar average or more",
        "MFI(14) oversold (below 30) or overbought (above 70)",
    ] {
        let _ = writeln!(out, "- {}", rule);
    }
    push_footer(&mut out);
    out
}

fn id_suffix(record: &SignalRecord) -> String {
    name_suffix(&record.display_name, &record.instrument_id)
}

fn name_suffix(display_name: &str, instrument_id: &str) -> String {
    if display_name == instrument_id {
        String::new()
    } else {
        format!(" ({})", instrument_id)
    }
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn push_footer(out: &mut String) {
    let _ = writeln!(out);
    let _ = writeln!(out, "_{}_", DISCLAIMER);
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report delivery failed: {0}")]
    Delivery(String),
}

/// Destination for rendered reports (chat channel, log, file).
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn deliver(&self, report: &str) -> Result<(), ReportError>;
}

/// Emits reports through `tracing`.
#[derive(Debug, Clone, Default)]
pub struct LogReportSink;

#[async_trait]
impl ReportSink for LogReportSink {
    async fn deliver(&self, report: &str) -> Result<(), ReportError> {
        info!(bytes = report.len(), "LogReportSink: report ready\n{}", report);
        Ok(())
    }
}
