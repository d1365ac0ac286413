//! Label Event Logger
//!
//! Reviewer-facing actions (recognitions, saved labels, failures) emitted on
//! the `label_events` target so the audit trail can be filtered on its own.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LabelEvent {
    TextRecognized {
        /// `None` for direct uploads.
        image_name: Option<String>,
        regions: usize,
    },
    LabelSaved {
        image_name: String,
        text: String,
    },
    OperationFailed {
        operation: String,
        image_name: Option<String>,
        kind: String,
        error_msg: String,
    },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: LabelEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Serialize the event and hand it to the tracing pipeline.
    pub fn log_event(event: LabelEvent) {
        let entry = EventLogEntry {
            timestamp: Utc::now(),
            event,
        };
        match serde_json::to_string(&entry) {
            Ok(json) => info!(target: "label_events", event = %json, "Label event"),
            Err(_) => info!(target: "label_events", event = ?entry, "Label event"),
        }
    }
}
