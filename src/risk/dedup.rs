//! Merge detections of the same transaction into one finding.

use super::{Finding, RiskLevel};
use crate::config::RiskPolicy;
use std::collections::HashMap;

/// One finding per transaction id: union of flags, max score, level recomputed from the max.
/// The reason comes from the highest-scoring detection; ties go to the lower-ranked detector,
/// so the result does not depend on the order detectors ran in.
/// Output is ordered by snapshot position.
pub fn merge_findings(findings: Vec<Finding>, policy: &RiskPolicy) -> Vec<Finding> {
    let mut merged: Vec<Finding> = Vec::with_capacity(findings.len());
    let mut by_tx: HashMap<String, usize> = HashMap::with_capacity(findings.len());

    for f in findings {
        match by_tx.get(&f.transaction_id).copied() {
            Some(slot) => {
                let cur = &mut merged[slot];
                cur.flags.extend(f.flags.iter().copied());
                let wins = f.risk_score > cur.risk_score
                    || (f.risk_score == cur.risk_score && f.detected_by < cur.detected_by);
                if wins {
                    cur.risk_score = f.risk_score;
                    cur.reason = f.reason;
                    cur.detected_by = f.detected_by;
                }
                cur.risk_level = RiskLevel::from_score(cur.risk_score, policy);
            }
            None => {
                by_tx.insert(f.transaction_id.clone(), merged.len());
                merged.push(f);
            }
        }
    }

    merged.sort_by_key(|f| f.record_index);
    merged
}
