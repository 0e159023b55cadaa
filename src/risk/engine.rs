//! Triage engine: snapshot → detectors → merge → per-actor rollup → rank → directory enrichment.

use super::{aggregate, merge_findings, rank, ActorRiskProfile};
use crate::config::EngineConfig;
use crate::detectors::DetectorSet;
use crate::directory::{apply_block_status, lookup_with_timeout, UserDirectory};
use crate::error::{DirectoryError, EngineResult};
use crate::posture::{self, PostureSummary};
use crate::snapshot::{SkippedRecord, Snapshot, TransactionRecord, UserRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Non-fatal conditions surfaced alongside the profiles
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisWarning {
    DirectoryUnavailable { reason: String },
    DirectoryTimeout { timeout_ms: u64 },
}

impl From<DirectoryError> for AnalysisWarning {
    fn from(e: DirectoryError) -> Self {
        match e {
            DirectoryError::Timeout(timeout_ms) => AnalysisWarning::DirectoryTimeout { timeout_ms },
            other => AnalysisWarning::DirectoryUnavailable {
                reason: other.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    /// Ranked, highest risk first
    pub profiles: Vec<ActorRiskProfile>,
    pub findings_count: usize,
    pub skipped: Vec<SkippedRecord>,
    pub warnings: Vec<AnalysisWarning>,
}

impl AnalysisReport {
    pub fn skipped_records(&self) -> usize {
        self.skipped.len()
    }

    /// True when block status could not be confirmed
    pub fn directory_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }
}

pub struct TriageEngine {
    config: EngineConfig,
    detectors: DetectorSet,
    directory: Arc<dyn UserDirectory>,
}

impl TriageEngine {
    pub fn new(config: EngineConfig, directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            config,
            detectors: DetectorSet::default(),
            directory,
        }
    }

    pub fn with_detectors(mut self, detectors: DetectorSet) -> Self {
        self.detectors = detectors;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Flag suspicious transactions and roll them up into ranked, enriched actor profiles.
    /// Snapshot sizing is the caller's concern.
    pub fn analyze_snapshot(&self, transactions: &[TransactionRecord]) -> EngineResult<AnalysisReport> {
        let run_id = Uuid::new_v4();
        let policy = &self.config.policy;
        policy.validate()?;
        let snapshot = Snapshot::build(transactions);

        let raw = self.detectors.run(&snapshot, policy);
        let findings = merge_findings(raw, policy);
        let findings_count = findings.len();
        let mut profiles = aggregate(findings, policy)?;
        rank(&mut profiles);

        let mut warnings = Vec::new();
        if !profiles.is_empty() {
            let ids: Vec<String> = profiles.iter().map(|p| p.actor_id.clone()).collect();
            match lookup_with_timeout(&self.directory, ids, self.config.directory.timeout()) {
                Ok(users) => apply_block_status(&mut profiles, &users),
                Err(e) => {
                    warn!(%run_id, error = %e, "directory lookup failed; block status unknown");
                    apply_block_status(&mut profiles, &[]);
                    warnings.push(AnalysisWarning::from(e));
                }
            }
        }

        info!(
            %run_id,
            records = snapshot.len(),
            skipped = snapshot.skipped().len(),
            findings = findings_count,
            profiles = profiles.len(),
            warnings = warnings.len(),
            "snapshot analyzed"
        );

        Ok(AnalysisReport {
            run_id,
            generated_at: Utc::now(),
            profiles,
            findings_count,
            skipped: snapshot.skipped().to_vec(),
            warnings,
        })
    }

    /// Dashboard counters from the same kind of snapshot, independent of profiles
    pub fn summarize_posture(
        &self,
        transactions: &[TransactionRecord],
        users: &[UserRecord],
    ) -> EngineResult<PostureSummary> {
        let snapshot = Snapshot::build(transactions);
        let summary = posture::summarize(&snapshot, users, &self.config.posture)?;
        info!(
            flagged = summary.flagged_transactions,
            high_risk = summary.high_risk_transactions,
            blocked_users = summary.blocked_users,
            compliance = summary.policy_compliance,
            "posture summarized"
        );
        Ok(summary)
    }
}
