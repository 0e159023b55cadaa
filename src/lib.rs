//! Payments-operations risk triage.
//!
//! Modular structure:
//! - [`snapshot`]: Transaction and user inputs, validation, per-actor grouping
//! - [`detectors`]: Heuristic detectors over a snapshot
//! - [`risk`]: Finding merge, actor rollup, ranking and the triage engine
//! - [`directory`]: User directory lookups and block-status enrichment
//! - [`posture`]: Dashboard posture counters
//! - [`logging`]: Structured JSON logging

pub mod config;
pub mod error;
pub mod snapshot;
pub mod detectors;
pub mod risk;
pub mod directory;
pub mod posture;
pub mod logging;

pub use config::EngineConfig;
pub use error::{DirectoryError, EngineError, EngineResult};
pub use snapshot::{TransactionRecord, UserRecord, Snapshot};
pub use detectors::{DetectorId, DetectorSet};
pub use risk::{ActorRiskProfile, AnalysisReport, Finding, RiskLevel, TriageEngine};
pub use directory::{HttpDirectory, StaticDirectory, UserDirectory};
pub use posture::PostureSummary;
pub use logging::StructuredLogger;
