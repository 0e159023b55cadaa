//! Snapshot inputs: transaction records and user directory entries as delivered by the backend API.
//! Records are read-only to the engine; grouping borrows them.

mod group;
mod parse;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

pub use group::{ActorGroup, SkipReason, SkippedRecord, Snapshot};
pub use parse::{parse_transactions, parse_users, TransactionBatch};

/// One transaction as fetched by the snapshot provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reference: String,
    /// Initiating user; empty when the backend omitted it
    #[serde(default, deserialize_with = "null_as_default")]
    pub actor_id: String,
    pub amount: Decimal,
    #[serde(default, deserialize_with = "null_as_default")]
    pub currency: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: TransactionMetadata,
    /// Contact details of the initiating user, when the API joins them in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<ActorContact>,
}

/// Missing and explicit `null` both read as the type's default
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Success,
    Failed,
    Pending,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Collection,
    Disbursement,
    Transfer,
    Deposit,
    Withdrawal,
    BillPayment,
    Airtime,
    Refund,
    #[default]
    #[serde(other)]
    Other,
}

/// Known metadata keys as typed fields; everything else is kept verbatim in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorContact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ActorContact {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none()
    }
}

/// User directory entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub status: UserStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub contact: ActorContact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    #[default]
    Active,
    Suspended,
    Blocked,
    Pending,
    Inactive,
}

impl UserStatus {
    /// Status that marks a profile as blocked during enrichment
    pub fn is_suspended(self) -> bool {
        self == UserStatus::Suspended
    }

    /// Statuses counted as blocked in the posture summary
    pub fn is_restricted(self) -> bool {
        matches!(self, UserStatus::Suspended | UserStatus::Blocked)
    }
}

impl TransactionRecord {
    pub fn is_failed(&self) -> bool {
        self.status == TransactionStatus::Failed
    }
}
