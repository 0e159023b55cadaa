//! Single failed transactions above the large-amount cutoff, regardless of history.

use super::{Detector, DetectorId};
use crate::config::RiskPolicy;
use crate::risk::{Finding, RiskFlag};
use crate::snapshot::Snapshot;

pub struct LargeFailedAmount;

impl Detector for LargeFailedAmount {
    const ID: DetectorId = DetectorId::LargeFailedAmount;

    fn detect(&self, snapshot: &Snapshot<'_>, policy: &RiskPolicy) -> Vec<Finding> {
        snapshot
            .records()
            .iter()
            .enumerate()
            .filter(|(_, tx)| tx.is_failed() && tx.amount > policy.large_failed_amount)
            .map(|(i, tx)| {
                Finding::new(
                    i,
                    tx,
                    Self::ID,
                    policy.large_failed_score,
                    &[RiskFlag::LargeAmount, RiskFlag::FailedLargeTransaction],
                    format!("Failed transaction of {} {}", tx.amount, tx.currency),
                    policy,
                )
            })
            .collect()
    }
}
