//! JSON log lines: one JSON object per line (ndjson) for ingestion and audit.

use crate::posture::PostureSummary;
use crate::risk::{ActorRiskProfile, AnalysisReport, AnalysisWarning};
use crate::snapshot::SkippedRecord;
use serde::Serialize;
use std::io::Write;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// One line of analysis output
#[derive(Serialize)]
#[serde(tag = "line", rename_all = "snake_case")]
pub enum ReportLine<'a> {
    Run {
        run_id: String,
        generated_at: String,
        profiles: usize,
        findings: usize,
        skipped: &'a [SkippedRecord],
        warnings: &'a [AnalysisWarning],
    },
    Profile(&'a ActorRiskProfile),
    Posture(&'a PostureSummary),
}

impl<'a> ReportLine<'a> {
    pub fn run(report: &'a AnalysisReport) -> Self {
        ReportLine::Run {
            run_id: report.run_id.to_string(),
            generated_at: report.generated_at.to_rfc3339(),
            profiles: report.profiles.len(),
            findings: report.findings_count,
            skipped: &report.skipped,
            warnings: &report.warnings,
        }
    }
}

/// Initialize tracing with JSON format (one JSON object per line)
pub struct StructuredLogger;

impl StructuredLogger {
    /// Install global subscriber: level from RUST_LOG or default. Logs go to stderr so stdout stays data.
    pub fn init(json: bool, default_level: &str) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
        if json {
            let fmt = tracing_subscriber::fmt::layer()
                .json()
                .with_span_events(FmtSpan::NONE)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt)
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    /// Emit a single JSON line without going through tracing
    pub fn emit_json(event: &impl Serialize, w: &mut impl Write) -> std::io::Result<()> {
        let line = serde_json::to_string(event)?;
        writeln!(w, "{}", line)
    }
}
