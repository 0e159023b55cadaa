//! Triage entrypoint: analyze one transaction snapshot and print the ranked profiles
//! and posture summary as JSON lines.
//!
//! Usage: payops-triage <transactions.json> [users.json]

use payops_triage::{
    config::EngineConfig,
    directory::{HttpDirectory, StaticDirectory, UserDirectory},
    logging::{ReportLine, StructuredLogger},
    snapshot::{parse_transactions, parse_users},
    TriageEngine,
};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config_path = std::env::var("PAYOPS_TRIAGE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.json"));
    let config = EngineConfig::load(&config_path);

    StructuredLogger::init(config.log.json, &config.log.level);

    let mut args = std::env::args().skip(1);
    let Some(tx_path) = args.next().map(PathBuf::from) else {
        eprintln!("usage: payops-triage <transactions.json> [users.json]");
        std::process::exit(2);
    };
    let users_path = args.next().map(PathBuf::from).or_else(|| config.directory.users_path.clone());

    let batch = parse_transactions(&std::fs::read_to_string(&tx_path)?)?;
    if !batch.rejected.is_empty() {
        warn!(rejected = batch.rejected.len(), "unparseable transactions left out");
    }
    let users = match &users_path {
        Some(p) => parse_users(&std::fs::read_to_string(p)?)?,
        None => Vec::new(),
    };
    info!(transactions = batch.records.len(), users = users.len(), "snapshot loaded");

    let directory: Arc<dyn UserDirectory> = match HttpDirectory::new(&config.directory) {
        Ok(Some(http)) => {
            info!(endpoint = http.base_url(), "using remote user directory");
            Arc::new(http)
        }
        Ok(None) => Arc::new(StaticDirectory::new(users.clone())),
        Err(e) => {
            error!(error = %e, "remote user directory is configured but unusable");
            return Err(e.into());
        }
    };
    let engine = TriageEngine::new(config, directory);

    let mut report = engine.analyze_snapshot(&batch.records)?;
    report.skipped.extend(batch.rejected);
    let posture = engine.summarize_posture(&batch.records, &users)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    StructuredLogger::emit_json(&ReportLine::run(&report), &mut out)?;
    for profile in &report.profiles {
        StructuredLogger::emit_json(&ReportLine::Profile(profile), &mut out)?;
    }
    StructuredLogger::emit_json(&ReportLine::Posture(&posture), &mut out)?;
    out.flush()?;
    Ok(())
}
