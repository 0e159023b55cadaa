//! Sliding windows of consecutive transactions packed into a short span.

use super::{Detector, DetectorId};
use crate::config::RiskPolicy;
use crate::risk::{Finding, RiskFlag};
use crate::snapshot::Snapshot;
use std::collections::HashSet;

pub struct VelocityCheck;

impl Detector for VelocityCheck {
    const ID: DetectorId = DetectorId::Velocity;

    fn detect(&self, snapshot: &Snapshot<'_>, policy: &RiskPolicy) -> Vec<Finding> {
        let size = policy.velocity_window_size;
        let max_span = policy.velocity_max_span();
        let reason = format!(
            "{}+ transactions within {} minutes",
            size,
            max_span.num_minutes()
        );

        let mut out = Vec::new();
        if size == 0 {
            return out;
        }
        for group in snapshot.groups() {
            let mut ordered = group.indices.clone();
            // stable: equal timestamps keep snapshot order
            ordered.sort_by_key(|&i| snapshot.record(i).created_at);

            let mut flagged: HashSet<usize> = HashSet::new();
            for window in ordered.windows(size) {
                let first = snapshot.record(window[0]).created_at;
                let last = snapshot.record(window[size - 1]).created_at;
                if last - first >= max_span {
                    continue;
                }
                for &i in window {
                    if flagged.insert(i) {
                        out.push(Finding::new(
                            i,
                            snapshot.record(i),
                            Self::ID,
                            policy.velocity_score,
                            &[RiskFlag::RapidTransactions, RiskFlag::VelocityCheck],
                            reason.clone(),
                            policy,
                        ));
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::testutil::tx;
    use crate::snapshot::TransactionStatus::Success;

    #[test]
    fn overlapping_windows_flag_each_transaction_once() {
        // six transactions a minute apart: two qualifying windows sharing four members
        let txs: Vec<_> = (0..6)
            .map(|n| tx(&format!("t{n}"), "u1", Success, 10, n * 60))
            .collect();
        let snap = Snapshot::build(&txs);
        let found = VelocityCheck.detect(&snap, &RiskPolicy::default());
        assert_eq!(found.len(), 6);
        let ids: HashSet<_> = found.iter().map(|f| f.transaction_id.as_str()).collect();
        assert_eq!(ids.len(), 6);
        assert_eq!(found[0].reason, "5+ transactions within 5 minutes");
    }

    #[test]
    fn span_of_exactly_five_minutes_is_not_rapid() {
        let txs: Vec<_> = (0..5)
            .map(|n| tx(&format!("t{n}"), "u1", Success, 10, n * 75))
            .collect();
        let snap = Snapshot::build(&txs);
        assert!(VelocityCheck.detect(&snap, &RiskPolicy::default()).is_empty());
    }

    #[test]
    fn input_order_does_not_matter() {
        let txs: Vec<_> = [240, 0, 180, 60, 120]
            .iter()
            .enumerate()
            .map(|(n, &s)| tx(&format!("t{n}"), "u1", Success, 10, s))
            .collect();
        let snap = Snapshot::build(&txs);
        assert_eq!(VelocityCheck.detect(&snap, &RiskPolicy::default()).len(), 5);
    }

    #[test]
    fn actors_are_windowed_separately() {
        let txs: Vec<_> = (0..6)
            .map(|n| tx(&format!("t{n}"), if n % 2 == 0 { "a" } else { "b" }, Success, 10, n * 10))
            .collect();
        let snap = Snapshot::build(&txs);
        assert!(VelocityCheck.detect(&snap, &RiskPolicy::default()).is_empty());
    }
}
