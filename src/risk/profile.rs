//! Per-actor rollup of merged findings, and triage ordering.

use super::{Finding, RiskFlag, RiskLevel};
use crate::config::RiskPolicy;
use crate::error::{EngineError, EngineResult};
use crate::snapshot::ActorContact;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActorRiskProfile {
    pub actor_id: String,
    #[serde(skip_serializing_if = "ActorContact::is_empty")]
    pub contact: ActorContact,
    /// Max over the actor's findings; only ever raised while merging
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub flags: BTreeSet<RiskFlag>,
    pub suspicious_transaction_count: usize,
    pub failed_transaction_count: usize,
    pub total_flagged_amount: Decimal,
    pub last_suspicious_activity_at: DateTime<Utc>,
    pub transactions: Vec<Finding>,
    pub is_blocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked_at: Option<DateTime<Utc>>,
}

impl ActorRiskProfile {
    fn open(f: &Finding) -> Self {
        Self {
            actor_id: f.actor_id.clone(),
            contact: ActorContact::default(),
            risk_score: 0,
            risk_level: RiskLevel::Low,
            flags: BTreeSet::new(),
            suspicious_transaction_count: 0,
            failed_transaction_count: 0,
            total_flagged_amount: Decimal::ZERO,
            last_suspicious_activity_at: f.transaction.created_at,
            transactions: Vec::new(),
            is_blocked: false,
            blocked_at: None,
        }
    }

    fn absorb(&mut self, f: Finding) -> EngineResult<()> {
        self.risk_score = self.risk_score.max(f.risk_score);
        self.flags.extend(f.flags.iter().copied());
        self.suspicious_transaction_count += 1;
        if f.is_failed() {
            self.failed_transaction_count += 1;
        }
        self.total_flagged_amount = self
            .total_flagged_amount
            .checked_add(f.transaction.amount)
            .ok_or_else(|| EngineError::AmountOverflow {
                actor_id: self.actor_id.clone(),
            })?;
        if f.transaction.created_at > self.last_suspicious_activity_at {
            self.last_suspicious_activity_at = f.transaction.created_at;
        }
        fill_contact(&mut self.contact, &f.transaction.contact);
        self.transactions.push(f);
        Ok(())
    }
}

fn fill_contact(into: &mut ActorContact, from: &ActorContact) {
    if into.name.is_none() {
        into.name = from.name.clone();
    }
    if into.email.is_none() {
        into.email = from.email.clone();
    }
    if into.phone.is_none() {
        into.phone = from.phone.clone();
    }
}

/// Group merged findings by actor in a single pass. Actors without findings never appear.
pub fn aggregate(findings: Vec<Finding>, policy: &RiskPolicy) -> EngineResult<Vec<ActorRiskProfile>> {
    let mut profiles: Vec<ActorRiskProfile> = Vec::new();
    let mut by_actor: HashMap<String, usize> = HashMap::new();

    for f in findings {
        let slot = match by_actor.get(&f.actor_id).copied() {
            Some(slot) => slot,
            None => {
                by_actor.insert(f.actor_id.clone(), profiles.len());
                profiles.push(ActorRiskProfile::open(&f));
                profiles.len() - 1
            }
        };
        profiles[slot].absorb(f)?;
    }

    for p in &mut profiles {
        p.risk_level = RiskLevel::from_score(p.risk_score, policy);
    }
    Ok(profiles)
}

/// Highest score first, then most recent activity; exact ties keep their order.
pub fn rank(profiles: &mut [ActorRiskProfile]) {
    profiles.sort_by(|a, b| {
        b.risk_score
            .cmp(&a.risk_score)
            .then_with(|| b.last_suspicious_activity_at.cmp(&a.last_suspicious_activity_at))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::testutil::tx;
    use crate::detectors::DetectorId;
    use crate::snapshot::TransactionStatus::{Failed, Success};
    use crate::snapshot::TransactionStatus;

    fn finding(idx: usize, id: &str, actor: &str, status: TransactionStatus, amount: i64, secs: i64, score: u8) -> Finding {
        let p = RiskPolicy::default();
        Finding::new(
            idx,
            &tx(id, actor, status, amount, secs),
            DetectorId::Velocity,
            score,
            &[RiskFlag::VelocityCheck],
            "r",
            &p,
        )
    }

    #[test]
    fn rolls_up_per_actor() {
        let p = RiskPolicy::default();
        let profiles = aggregate(
            vec![
                finding(0, "t1", "a", Failed, 100, 10, 75),
                finding(1, "t2", "b", Success, 5, 20, 90),
                finding(2, "t3", "a", Success, 50, 30, 85),
            ],
            &p,
        )
        .unwrap();
        assert_eq!(profiles.len(), 2);
        let a = &profiles[0];
        assert_eq!(a.actor_id, "a");
        assert_eq!(a.risk_score, 85);
        assert_eq!(a.risk_level, RiskLevel::High);
        assert_eq!(a.suspicious_transaction_count, 2);
        assert_eq!(a.failed_transaction_count, 1);
        assert_eq!(a.total_flagged_amount, Decimal::from(150));
        assert_eq!(a.last_suspicious_activity_at, crate::detectors::testutil::base() + chrono::Duration::seconds(30));
        assert!(!a.is_blocked);
    }

    #[test]
    fn contact_is_taken_from_first_finding_that_has_it() {
        let p = RiskPolicy::default();
        let mut with_contact = tx("t2", "a", Failed, 1, 0);
        with_contact.actor = Some(ActorContact {
            name: Some("Jane".into()),
            email: None,
            phone: Some("+256700000001".into()),
        });
        let f2 = Finding::new(1, &with_contact, DetectorId::Velocity, 75, &[RiskFlag::VelocityCheck], "r", &p);
        let profiles = aggregate(vec![finding(0, "t1", "a", Failed, 1, 0, 75), f2], &p).unwrap();
        assert_eq!(profiles[0].contact.name.as_deref(), Some("Jane"));
        assert_eq!(profiles[0].contact.email, None);
    }

    #[test]
    fn amount_overflow_is_an_error() {
        let p = RiskPolicy::default();
        let mut a = tx("t1", "a", Failed, 0, 0);
        a.amount = Decimal::MAX;
        let mut b = tx("t2", "a", Failed, 0, 0);
        b.amount = Decimal::MAX;
        let fa = Finding::new(0, &a, DetectorId::LargeFailedAmount, 90, &[RiskFlag::LargeAmount], "r", &p);
        let fb = Finding::new(1, &b, DetectorId::LargeFailedAmount, 90, &[RiskFlag::LargeAmount], "r", &p);
        let err = aggregate(vec![fa, fb], &p).unwrap_err();
        assert!(matches!(err, EngineError::AmountOverflow { actor_id } if actor_id == "a"));
    }

    #[test]
    fn rank_orders_by_score_then_recency_then_insertion() {
        let p = RiskPolicy::default();
        let mut profiles = aggregate(
            vec![
                finding(0, "t1", "low", Success, 1, 500, 75),
                finding(1, "t2", "old", Success, 1, 10, 90),
                finding(2, "t3", "new", Success, 1, 20, 90),
                finding(3, "t4", "tie1", Success, 1, 100, 80),
                finding(4, "t5", "tie2", Success, 1, 100, 80),
            ],
            &p,
        )
        .unwrap();
        rank(&mut profiles);
        let order: Vec<_> = profiles.iter().map(|p| p.actor_id.as_str()).collect();
        assert_eq!(order, vec!["new", "old", "tie1", "tie2", "low"]);
    }
}
