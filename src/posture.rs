//! System-wide posture counters for dashboard reporting.
//!
//! Computed straight from the snapshot, independent of actor profiles. The incident
//! and compliance figures are coarse proxies defined by [`PosturePolicy`]; they carry
//! no identity and are rebuilt on every call.

use crate::config::PosturePolicy;
use crate::error::{EngineError, EngineResult};
use crate::snapshot::{Snapshot, UserRecord};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PostureSummary {
    pub flagged_transactions: u64,
    pub high_risk_transactions: u64,
    pub blocked_users: u64,
    pub active_incidents: u64,
    pub critical_incidents: u64,
    pub pending_review: u64,
    pub policy_compliance: u64,
}

pub fn summarize(snapshot: &Snapshot<'_>, users: &[UserRecord], policy: &PosturePolicy) -> EngineResult<PostureSummary> {
    let mut flagged: u64 = 0;
    let mut high_risk: u64 = 0;
    for tx in snapshot.records().iter().filter(|tx| tx.is_failed()) {
        flagged = flagged
            .checked_add(1)
            .ok_or(EngineError::CountOverflow("flagged_transactions"))?;
        if tx.amount > policy.high_risk_amount {
            high_risk = high_risk
                .checked_add(1)
                .ok_or(EngineError::CountOverflow("high_risk_transactions"))?;
        }
    }
    let blocked_users = users.iter().filter(|u| u.status.is_restricted()).count() as u64;

    Ok(PostureSummary {
        flagged_transactions: flagged,
        high_risk_transactions: high_risk,
        blocked_users,
        active_incidents: ratio(flagged, policy.incident_divisor),
        critical_incidents: ratio(high_risk, policy.critical_incident_divisor),
        pending_review: ratio(flagged, policy.pending_review_divisor),
        policy_compliance: compliance(flagged, policy.compliance_floor),
    })
}

fn ratio(count: u64, divisor: u64) -> u64 {
    count.checked_div(divisor).unwrap_or(0)
}

fn compliance(flagged: u64, floor: u64) -> u64 {
    if flagged == 0 {
        return 100;
    }
    100u64.saturating_sub(flagged).max(floor).min(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::testutil::tx;
    use crate::snapshot::TransactionStatus::{Failed, Success};
    use crate::snapshot::{ActorContact, UserStatus};

    fn user(id: &str, status: UserStatus) -> UserRecord {
        UserRecord {
            id: id.to_string(),
            status,
            blocked_at: None,
            contact: ActorContact::default(),
        }
    }

    #[test]
    fn empty_snapshot_is_all_zero_and_compliant() {
        let snap = Snapshot::build(&[]);
        let s = summarize(&snap, &[], &PosturePolicy::default()).unwrap();
        assert_eq!(
            s,
            PostureSummary {
                policy_compliance: 100,
                ..PostureSummary::default()
            }
        );
    }

    #[test]
    fn counts_and_proxies() {
        let mut txs: Vec<_> = (0..30)
            .map(|n| tx(&format!("f{n}"), "u1", Failed, if n < 11 { 2_000_000 } else { 10 }, n))
            .collect();
        txs.push(tx("s", "u2", Success, 5_000_000, 0));
        txs.push(tx("edge", "u2", Failed, 1_000_000, 0));
        let users = vec![
            user("u1", UserStatus::Suspended),
            user("u2", UserStatus::Blocked),
            user("u3", UserStatus::Active),
        ];
        let snap = Snapshot::build(&txs);
        let s = summarize(&snap, &users, &PosturePolicy::default()).unwrap();
        assert_eq!(s.flagged_transactions, 31);
        assert_eq!(s.high_risk_transactions, 11);
        assert_eq!(s.blocked_users, 2);
        assert_eq!(s.active_incidents, 3);
        assert_eq!(s.critical_incidents, 2);
        assert_eq!(s.pending_review, 10);
        assert_eq!(s.policy_compliance, 85);
    }

    #[test]
    fn compliance_tracks_flagged_volume_down_to_floor() {
        assert_eq!(compliance(0, 85), 100);
        assert_eq!(compliance(1, 85), 99);
        assert_eq!(compliance(15, 85), 85);
        assert_eq!(compliance(10_000, 85), 85);
        assert_eq!(compliance(3, 120), 100);
    }

    #[test]
    fn zero_divisor_yields_zero() {
        assert_eq!(ratio(42, 0), 0);
    }
}
