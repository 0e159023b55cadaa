//! Structured logging setup and ndjson output.

mod format;

pub use format::{ReportLine, StructuredLogger};
