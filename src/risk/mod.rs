//! Risk scoring: findings, per-transaction merging, per-actor rollup and the engine that drives them.

mod dedup;
mod engine;
mod profile;

pub use dedup::merge_findings;
pub use engine::{AnalysisReport, AnalysisWarning, TriageEngine};
pub use profile::{aggregate, rank, ActorRiskProfile};

use crate::config::RiskPolicy;
use crate::detectors::DetectorId;
use crate::snapshot::{ActorContact, TransactionKind, TransactionRecord, TransactionStatus};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: u8, policy: &RiskPolicy) -> Self {
        if score >= policy.critical_from {
            RiskLevel::Critical
        } else if score >= policy.high_from {
            RiskLevel::High
        } else if score >= policy.medium_from {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Pattern identifiers attached to findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFlag {
    LargeAmount,
    FailedLargeTransaction,
    MultipleFailedTransactions,
    RapidFailures,
    RapidTransactions,
    VelocityCheck,
    HighFailureRate,
}

/// Display fields of the originating transaction, copied for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionView {
    pub reference: String,
    pub amount: Decimal,
    pub currency: String,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(skip_serializing_if = "ActorContact::is_empty")]
    pub contact: ActorContact,
}

impl From<&TransactionRecord> for TransactionView {
    fn from(tx: &TransactionRecord) -> Self {
        Self {
            reference: tx.reference.clone(),
            amount: tx.amount,
            currency: tx.currency.clone(),
            kind: tx.kind,
            status: tx.status,
            created_at: tx.created_at,
            updated_at: tx.updated_at,
            ip_address: tx.metadata.ip_address.clone(),
            location: tx.metadata.location.clone(),
            device: tx.metadata.device.clone(),
            contact: tx.actor.clone().unwrap_or_default(),
        }
    }
}

/// Verdict on one transaction, from one detector or merged from several
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub transaction_id: String,
    pub actor_id: String,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub flags: BTreeSet<RiskFlag>,
    pub reason: String,
    /// Detector whose reason is reported
    pub detected_by: DetectorId,
    pub transaction: TransactionView,
    /// Position in the validated snapshot
    #[serde(skip)]
    pub(crate) record_index: usize,
}

impl Finding {
    pub fn new(
        idx: usize,
        tx: &TransactionRecord,
        detector: DetectorId,
        score: u8,
        flags: &[RiskFlag],
        reason: impl Into<String>,
        policy: &RiskPolicy,
    ) -> Self {
        Self {
            transaction_id: tx.id.clone(),
            actor_id: tx.actor_id.clone(),
            risk_score: score,
            risk_level: RiskLevel::from_score(score, policy),
            flags: flags.iter().copied().collect(),
            reason: reason.into(),
            detected_by: detector,
            transaction: TransactionView::from(tx),
            record_index: idx,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.transaction.status == TransactionStatus::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detector_scores_bucket_as_documented() {
        let p = RiskPolicy::default();
        assert_eq!(RiskLevel::from_score(p.failure_burst_score, &p), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(p.large_failed_score, &p), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(p.velocity_score, &p), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(p.failure_rate_score, &p), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(40, &p), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(39, &p), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(100, &p), RiskLevel::Critical);
    }

    #[test]
    fn flags_serialize_as_pattern_ids() {
        let s = serde_json::to_string(&RiskFlag::FailedLargeTransaction).unwrap();
        assert_eq!(s, "\"failed_large_transaction\"");
    }
}
