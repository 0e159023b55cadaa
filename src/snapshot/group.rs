//! Validated snapshot: an arena of borrowed records plus per-actor index lists.

use super::TransactionRecord;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingId,
    MissingActor,
    NegativeAmount,
    Unparseable,
}

/// A record left out of detector consideration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    /// Transaction id, or the array position when no id could be read
    pub record: String,
    pub reason: SkipReason,
}

/// Transactions of one actor, as indices into the snapshot arena in input order
#[derive(Debug, Clone)]
pub struct ActorGroup<'a> {
    pub actor_id: &'a str,
    pub indices: Vec<usize>,
}

#[derive(Debug)]
pub struct Snapshot<'a> {
    records: Vec<&'a TransactionRecord>,
    groups: Vec<ActorGroup<'a>>,
    skipped: Vec<SkippedRecord>,
}

impl<'a> Snapshot<'a> {
    /// Validate and group. Malformed records are reported, never fatal.
    pub fn build(transactions: &'a [TransactionRecord]) -> Self {
        let mut records = Vec::with_capacity(transactions.len());
        let mut groups: Vec<ActorGroup<'a>> = Vec::new();
        let mut by_actor: HashMap<&'a str, usize> = HashMap::new();
        let mut skipped = Vec::new();

        for tx in transactions {
            let reason = if tx.id.trim().is_empty() {
                Some(SkipReason::MissingId)
            } else if tx.actor_id.trim().is_empty() {
                Some(SkipReason::MissingActor)
            } else if tx.amount < Decimal::ZERO {
                Some(SkipReason::NegativeAmount)
            } else {
                None
            };
            if let Some(reason) = reason {
                warn!(record = %tx.id, reason = ?reason, "skipping malformed transaction");
                skipped.push(SkippedRecord {
                    record: tx.id.clone(),
                    reason,
                });
                continue;
            }

            let idx = records.len();
            records.push(tx);
            let slot = *by_actor.entry(tx.actor_id.as_str()).or_insert_with(|| {
                groups.push(ActorGroup {
                    actor_id: tx.actor_id.as_str(),
                    indices: Vec::new(),
                });
                groups.len() - 1
            });
            groups[slot].indices.push(idx);
        }

        Self {
            records,
            groups,
            skipped,
        }
    }

    pub fn record(&self, idx: usize) -> &'a TransactionRecord {
        self.records[idx]
    }

    pub fn records(&self) -> &[&'a TransactionRecord] {
        &self.records
    }

    /// Actor groups in order of first appearance
    pub fn groups(&self) -> &[ActorGroup<'a>] {
        &self.groups
    }

    pub fn skipped(&self) -> &[SkippedRecord] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
