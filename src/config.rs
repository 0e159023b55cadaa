//! Engine configuration. Every heuristic threshold lives here so detectors stay free of literals.

use crate::error::{EngineError, EngineResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Detector thresholds, scores and risk-level buckets
    #[serde(default)]
    pub policy: RiskPolicy,
    /// Dashboard posture arithmetic
    #[serde(default)]
    pub posture: PosturePolicy,
    /// User directory used for block-status enrichment
    #[serde(default)]
    pub directory: DirectoryConfig,
    /// Logging
    #[serde(default)]
    pub log: LogConfig,
}

/// Detector policy. Immutable once handed to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskPolicy {
    // === Failure burst ===
    /// Failed transactions an actor needs overall before bursts are considered
    pub failure_burst_min_failed: usize,
    /// Failed transactions required inside the recent window
    pub failure_burst_min_recent: usize,
    /// Window measured back from the actor's latest failure
    pub failure_burst_window_secs: i64,
    pub failure_burst_score: u8,

    // === Large failed amount ===
    pub large_failed_amount: Decimal,
    pub large_failed_score: u8,

    // === Velocity ===
    /// Consecutive transactions per sliding window
    pub velocity_window_size: usize,
    /// Window span must stay strictly below this
    pub velocity_max_span_secs: i64,
    pub velocity_score: u8,

    // === Failure rate ===
    pub failure_rate_min_transactions: usize,
    /// Failure rate must strictly exceed this, in percent
    pub failure_rate_threshold_pct: u32,
    pub failure_rate_score: u8,

    // === Risk level buckets (inclusive lower bounds) ===
    pub critical_from: u8,
    pub high_from: u8,
    pub medium_from: u8,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self {
            failure_burst_min_failed: 5,
            failure_burst_min_recent: 5,
            failure_burst_window_secs: 60 * 60,
            failure_burst_score: 85,
            large_failed_amount: Decimal::new(10_000_000, 0),
            large_failed_score: 90,
            velocity_window_size: 5,
            velocity_max_span_secs: 5 * 60,
            velocity_score: 75,
            failure_rate_min_transactions: 10,
            failure_rate_threshold_pct: 70,
            failure_rate_score: 80,
            critical_from: 90,
            high_from: 70,
            medium_from: 40,
        }
    }
}

/// Longest accepted detector window: ten years
pub const MAX_POLICY_WINDOW_SECS: i64 = 10 * 365 * 24 * 60 * 60;

impl RiskPolicy {
    /// Saturates instead of panicking on out-of-range values; [`validate`](Self::validate) rejects those.
    pub fn failure_burst_window(&self) -> chrono::Duration {
        chrono::Duration::try_seconds(self.failure_burst_window_secs).unwrap_or(chrono::Duration::MAX)
    }

    pub fn velocity_max_span(&self) -> chrono::Duration {
        chrono::Duration::try_seconds(self.velocity_max_span_secs).unwrap_or(chrono::Duration::MAX)
    }

    /// Reject windows and scores the detectors cannot work with
    pub fn validate(&self) -> EngineResult<()> {
        for (name, secs) in [
            ("failure_burst_window_secs", self.failure_burst_window_secs),
            ("velocity_max_span_secs", self.velocity_max_span_secs),
        ] {
            if !(1..=MAX_POLICY_WINDOW_SECS).contains(&secs) {
                return Err(EngineError::Policy(format!(
                    "{name} must be between 1 and {MAX_POLICY_WINDOW_SECS}, got {secs}"
                )));
            }
        }
        for (name, score) in [
            ("failure_burst_score", self.failure_burst_score),
            ("large_failed_score", self.large_failed_score),
            ("velocity_score", self.velocity_score),
            ("failure_rate_score", self.failure_rate_score),
        ] {
            if score > 100 {
                return Err(EngineError::Policy(format!("{name} must be at most 100, got {score}")));
            }
        }
        Ok(())
    }
}

/// Posture summary constants. These are reporting proxies carried over as-is;
/// none of them tracks real incident state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PosturePolicy {
    /// Failed transactions above this amount count as high risk
    pub high_risk_amount: Decimal,
    pub incident_divisor: u64,
    pub critical_incident_divisor: u64,
    pub pending_review_divisor: u64,
    /// Lowest compliance percentage reported while anything is flagged
    pub compliance_floor: u64,
}

impl Default for PosturePolicy {
    fn default() -> Self {
        Self {
            high_risk_amount: Decimal::new(1_000_000, 0),
            incident_divisor: 10,
            critical_incident_divisor: 5,
            pending_review_divisor: 3,
            compliance_floor: 85,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Base URL of the user directory API; unset means a static user file is used
    pub endpoint: Option<String>,
    /// Upper bound on a single lookup, including the HTTP round trip
    pub timeout_ms: u64,
    /// Static users file used when no endpoint is configured
    pub users_path: Option<PathBuf>,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_ms: 2_000,
            users_path: None,
        }
    }
}

impl DirectoryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

impl EngineConfig {
    /// Load from JSON file if present; otherwise return default
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            if let Ok(c) = Self::from_file(path) {
                return c;
            }
        }
        Self::default()
    }

    /// Load from JSON file, surfacing read, parse and policy failures
    pub fn from_file(path: &Path) -> EngineResult<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data).map_err(|e| EngineError::Config(e.to_string()))?;
        config.policy.validate()?;
        Ok(config)
    }
}
