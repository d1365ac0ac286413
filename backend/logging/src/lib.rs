//! Structured logging for the OCR labeling service.
//!
//! Console plus optional rolling JSON file output, and the label audit events.

pub mod event_logger;
pub mod logger;

pub use event_logger::{EventLogEntry, EventLogger, LabelEvent};
pub use logger::init_logger;
