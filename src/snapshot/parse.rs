//! Tolerant JSON parsing: one bad entry does not discard the batch.

use super::{SkipReason, SkippedRecord, TransactionRecord, UserRecord};
use crate::error::{EngineError, EngineResult};
use serde_json::Value;
use tracing::warn;

/// Records that deserialized, plus the entries that did not
#[derive(Debug, Default)]
pub struct TransactionBatch {
    pub records: Vec<TransactionRecord>,
    pub rejected: Vec<SkippedRecord>,
}

/// Parse a JSON array of transactions entry by entry.
/// Only a non-array document is an error.
pub fn parse_transactions(json: &str) -> EngineResult<TransactionBatch> {
    let entries = top_level_array(json)?;
    let mut batch = TransactionBatch::default();
    for (pos, entry) in entries.into_iter().enumerate() {
        let label = entry
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{pos}"));
        match serde_json::from_value::<TransactionRecord>(entry) {
            Ok(tx) => batch.records.push(tx),
            Err(e) => {
                warn!(record = %label, error = %e, "rejecting unparseable transaction");
                batch.rejected.push(SkippedRecord {
                    record: label,
                    reason: SkipReason::Unparseable,
                });
            }
        }
    }
    Ok(batch)
}

/// Parse a JSON array of users, dropping entries that do not deserialize
pub fn parse_users(json: &str) -> EngineResult<Vec<UserRecord>> {
    let entries = top_level_array(json)?;
    Ok(entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<UserRecord>(entry) {
            Ok(u) => Some(u),
            Err(e) => {
                warn!(error = %e, "dropping unparseable user");
                None
            }
        })
        .collect())
}

fn top_level_array(json: &str) -> EngineResult<Vec<Value>> {
    match serde_json::from_str::<Value>(json)? {
        Value::Array(entries) => Ok(entries),
        other => Err(EngineError::Snapshot(format!(
            "expected a JSON array, found {}",
            kind_of(&other)
        ))),
    }
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{TransactionKind, TransactionStatus, UserStatus};
    use rust_decimal::Decimal;

    #[test]
    fn parses_camel_case_records_and_metadata() {
        let json = r#"[{
            "id": "t1", "reference": "R1", "actorId": "u1", "amount": "15000000",
            "currency": "UGX", "type": "DISBURSEMENT", "status": "FAILED",
            "createdAt": "2026-03-01T10:00:00Z",
            "metadata": { "ipAddress": "10.0.0.1", "device": "android", "channel": "ussd" },
            "actor": { "name": "Jane", "phone": "+256700000000" }
        }]"#;
        let batch = parse_transactions(json).unwrap();
        assert!(batch.rejected.is_empty());
        let tx = &batch.records[0];
        assert_eq!(tx.amount, Decimal::from(15_000_000));
        assert_eq!(tx.kind, TransactionKind::Disbursement);
        assert_eq!(tx.status, TransactionStatus::Failed);
        assert_eq!(tx.metadata.ip_address.as_deref(), Some("10.0.0.1"));
        assert_eq!(tx.metadata.location, None);
        assert_eq!(tx.metadata.extra["channel"], "ussd");
        assert_eq!(tx.actor.as_ref().unwrap().name.as_deref(), Some("Jane"));
    }

    #[test]
    fn unknown_kind_and_missing_metadata_default() {
        let json = r#"[{ "id": "t1", "actorId": "u1", "amount": 5, "type": "CRYPTO_SWAP",
            "status": "SUCCESS", "createdAt": "2026-03-01T10:00:00Z" }]"#;
        let batch = parse_transactions(json).unwrap();
        let tx = &batch.records[0];
        assert_eq!(tx.kind, TransactionKind::Other);
        assert_eq!(tx.metadata, Default::default());
        assert!(tx.actor.is_none());
    }

    #[test]
    fn null_optional_fields_read_as_empty() {
        let json = r#"[{ "id": "big", "reference": null, "actorId": "u1", "amount": 15000000,
            "currency": null, "type": null, "status": "FAILED",
            "createdAt": "2026-03-01T10:00:00Z", "metadata": null, "actor": null }]"#;
        let batch = parse_transactions(json).unwrap();
        assert!(batch.rejected.is_empty());
        let tx = &batch.records[0];
        assert_eq!(tx.reference, "");
        assert_eq!(tx.currency, "");
        assert_eq!(tx.kind, TransactionKind::Other);
        assert_eq!(tx.metadata, Default::default());
        assert!(tx.actor.is_none());
    }

    #[test]
    fn null_actor_is_left_for_validation() {
        let json = r#"[{ "id": "t1", "actorId": null, "amount": 1, "status": "FAILED",
            "createdAt": "2026-03-01T10:00:00Z" }]"#;
        let batch = parse_transactions(json).unwrap();
        assert_eq!(batch.records[0].actor_id, "");
    }

    #[test]
    fn bad_entries_are_rejected_individually() {
        let json = r#"[
            { "id": "ok", "actorId": "u1", "amount": 1, "status": "SUCCESS", "createdAt": "2026-03-01T10:00:00Z" },
            { "id": "bad", "actorId": "u1", "amount": "lots", "status": "SUCCESS", "createdAt": "2026-03-01T10:00:00Z" },
            { "actorId": "u1" }
        ]"#;
        let batch = parse_transactions(json).unwrap();
        assert_eq!(batch.records.len(), 1);
        let labels: Vec<_> = batch.rejected.iter().map(|r| r.record.as_str()).collect();
        assert_eq!(labels, vec!["bad", "#2"]);
    }

    #[test]
    fn non_array_document_is_an_error() {
        assert!(matches!(
            parse_transactions(r#"{"data": []}"#),
            Err(EngineError::Snapshot(_))
        ));
    }

    #[test]
    fn parses_users_with_flattened_contact() {
        let json = r#"[
            { "id": "u1", "status": "SUSPENDED", "blockedAt": "2026-02-01T00:00:00Z", "email": "a@b.c" },
            { "id": "u2", "status": "ACTIVE" },
            { "status": "ACTIVE" }
        ]"#;
        let users = parse_users(json).unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].status, UserStatus::Suspended);
        assert!(users[0].blocked_at.is_some());
        assert_eq!(users[0].contact.email.as_deref(), Some("a@b.c"));
    }
}
