//! Actors whose transactions mostly fail.

use super::{Detector, DetectorId};
use crate::config::RiskPolicy;
use crate::risk::{Finding, RiskFlag};
use crate::snapshot::Snapshot;

pub struct HighFailureRate;

impl Detector for HighFailureRate {
    const ID: DetectorId = DetectorId::HighFailureRate;

    fn detect(&self, snapshot: &Snapshot<'_>, policy: &RiskPolicy) -> Vec<Finding> {
        let mut out = Vec::new();
        for group in snapshot.groups() {
            let total = group.indices.len();
            if total < policy.failure_rate_min_transactions || total == 0 {
                continue;
            }
            let failed: Vec<usize> = group
                .indices
                .iter()
                .copied()
                .filter(|&i| snapshot.record(i).is_failed())
                .collect();
            // integer comparison keeps the boundary exact
            if failed.len() as u64 * 100 <= total as u64 * u64::from(policy.failure_rate_threshold_pct) {
                continue;
            }

            let pct = failed.len() as f64 * 100.0 / total as f64;
            let reason = format!(
                "High failure rate: {:.0}% ({} of {} transactions failed)",
                pct,
                failed.len(),
                total
            );
            for i in failed {
                out.push(Finding::new(
                    i,
                    snapshot.record(i),
                    Self::ID,
                    policy.failure_rate_score,
                    &[RiskFlag::HighFailureRate],
                    reason.clone(),
                    policy,
                ));
            }
        }
        out
    }
}
