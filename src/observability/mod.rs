//! Observability for the revision journal
//!
//! This module provides:
//! - Structured logging (JSON lines on stderr)
//! - Per-journal counters
//! - Typed lifecycle events
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. Logging never fails the caller
//! 3. Deterministic field order
//!
//! # Usage
//!
//! ```ignore
//! use revjournal::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::ScanFailed, &[("error", "timed out")]);
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{JournalMetrics, MetricsSnapshot};

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
