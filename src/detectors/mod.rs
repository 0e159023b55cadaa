//! Heuristic detectors over a validated snapshot.
//!
//! Each detector is stateless and reads the whole snapshot (usually actor by actor).
//! The set keeps a fixed execution order; that order also ranks detectors when
//! merged findings tie on score.

mod failure_burst;
mod failure_rate;
mod large_failed;
mod velocity;

pub use failure_burst::FailureBurst;
pub use failure_rate::HighFailureRate;
pub use large_failed::LargeFailedAmount;
pub use velocity::VelocityCheck;

use crate::config::RiskPolicy;
use crate::risk::Finding;
use crate::snapshot::Snapshot;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Detector identity. Declaration order is the tie-break rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorId {
    FailureBurst,
    LargeFailedAmount,
    Velocity,
    HighFailureRate,
}

impl DetectorId {
    pub const ALL: [DetectorId; 4] = [
        DetectorId::FailureBurst,
        DetectorId::LargeFailedAmount,
        DetectorId::Velocity,
        DetectorId::HighFailureRate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DetectorId::FailureBurst => "failure_burst",
            DetectorId::LargeFailedAmount => "large_failed_amount",
            DetectorId::Velocity => "velocity",
            DetectorId::HighFailureRate => "high_failure_rate",
        }
    }
}

pub trait Detector {
    const ID: DetectorId;

    /// Findings for this pattern. Must not flag the same transaction twice.
    fn detect(&self, snapshot: &Snapshot<'_>, policy: &RiskPolicy) -> Vec<Finding>;
}

/// Ordered detector list, dispatched statically by id
#[derive(Debug, Clone)]
pub struct DetectorSet {
    order: Vec<DetectorId>,
}

impl Default for DetectorSet {
    fn default() -> Self {
        Self {
            order: DetectorId::ALL.to_vec(),
        }
    }
}

impl DetectorSet {
    /// Run detectors in a caller-chosen order; merged output does not depend on it
    pub fn with_order(order: impl IntoIterator<Item = DetectorId>) -> Self {
        Self {
            order: order.into_iter().collect(),
        }
    }

    /// Concatenated findings of every detector, in execution order
    pub fn run(&self, snapshot: &Snapshot<'_>, policy: &RiskPolicy) -> Vec<Finding> {
        let mut out = Vec::new();
        for &id in &self.order {
            let found = match id {
                DetectorId::FailureBurst => FailureBurst.detect(snapshot, policy),
                DetectorId::LargeFailedAmount => LargeFailedAmount.detect(snapshot, policy),
                DetectorId::Velocity => VelocityCheck.detect(snapshot, policy),
                DetectorId::HighFailureRate => HighFailureRate.detect(snapshot, policy),
            };
            debug!(detector = id.name(), findings = found.len(), "detector finished");
            out.extend(found);
        }
        out
    }
}
