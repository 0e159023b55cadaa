//! Bursts of failed transactions close to the actor's most recent failure.

use super::{Detector, DetectorId};
use crate::config::RiskPolicy;
use crate::risk::{Finding, RiskFlag};
use crate::snapshot::Snapshot;
use chrono::{DateTime, Utc};

pub struct FailureBurst;

impl Detector for FailureBurst {
    const ID: DetectorId = DetectorId::FailureBurst;

    fn detect(&self, snapshot: &Snapshot<'_>, policy: &RiskPolicy) -> Vec<Finding> {
        let mut out = Vec::new();
        for group in snapshot.groups() {
            let failed: Vec<usize> = group
                .indices
                .iter()
                .copied()
                .filter(|&i| snapshot.record(i).is_failed())
                .collect();
            if failed.len() < policy.failure_burst_min_failed {
                continue;
            }
            // Window is anchored on the data, not on wall-clock time
            let Some(latest) = failed.iter().map(|&i| snapshot.record(i).created_at).max() else {
                continue;
            };
            let cutoff = latest
                .checked_sub_signed(policy.failure_burst_window())
                .unwrap_or(DateTime::<Utc>::MIN_UTC);
            let recent: Vec<usize> = failed
                .into_iter()
                .filter(|&i| snapshot.record(i).created_at >= cutoff)
                .collect();
            if recent.len() < policy.failure_burst_min_recent {
                continue;
            }

            let reason = format!(
                "{} failed transactions within {} minutes",
                recent.len(),
                policy.failure_burst_window().num_minutes()
            );
            for i in recent {
                out.push(Finding::new(
                    i,
                    snapshot.record(i),
                    Self::ID,
                    policy.failure_burst_score,
                    &[RiskFlag::MultipleFailedTransactions, RiskFlag::RapidFailures],
                    reason.clone(),
                    policy,
                ));
            }
        }
        out
    }
}
