//! Serializable types for the persisted action log.
//!
//! A recording is a single JSON array. Each element wraps one canonical action
//! with the time it was recorded:
//!
//! ```json
//! [{"timestamp": 782000000.5, "action": {"type": "INCREMENT", "payload": "ReSwift_Null", "isTypedAction": false}}]
//! ```

use crate::action::StandardAction;
use crate::errors::RewindError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// 2001-01-01T00:00:00Z, the epoch recorded timestamps are measured from.
pub const REFERENCE_EPOCH_UNIX_SECS: u64 = 978_307_200;

/// Seconds between the reference epoch and `at`. Negative before the epoch.
pub fn seconds_since_reference_epoch(at: SystemTime) -> f64 {
    let epoch = UNIX_EPOCH + Duration::from_secs(REFERENCE_EPOCH_UNIX_SECS);
    match at.duration_since(epoch) {
        Ok(elapsed) => elapsed.as_secs_f64(),
        Err(before) => -before.duration().as_secs_f64(),
    }
}

// ── RecordedAction ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedAction {
    pub timestamp: f64,
    pub action: StandardAction,
}

impl RecordedAction {
    pub fn new(action: StandardAction, at: SystemTime) -> Self {
        Self {
            timestamp: seconds_since_reference_epoch(at),
            action,
        }
    }
}

// ── Log text ──────────────────────────────────────────────────────────────────

pub fn render_log(entries: &[RecordedAction], pretty: bool) -> Result<String, RewindError> {
    let rendered = if pretty {
        serde_json::to_string_pretty(entries)
    } else {
        serde_json::to_string(entries)
    };
    rendered.map_err(|e| RewindError::Serialization(e.to_string()))
}

/// Parse a log leniently.
///
/// Anything that is not a top-level array yields no entries. Elements without
/// a decodable `action` object are skipped; a missing or non-numeric
/// `timestamp` reads as `0.0`.
pub fn parse_log(text: &str) -> Vec<RecordedAction> {
    let elements = match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(elements)) => elements,
        Ok(_) => {
            tracing::warn!("recording is not a JSON array; ignoring it");
            return Vec::new();
        }
        Err(error) => {
            tracing::warn!(error = %error, "recording is not valid JSON; ignoring it");
            return Vec::new();
        }
    };

    elements
        .iter()
        .enumerate()
        .filter_map(|(position, element)| {
            let parsed = element
                .get("action")
                .and_then(StandardAction::from_dictionary)
                .map(|action| RecordedAction {
                    timestamp: element
                        .get("timestamp")
                        .and_then(Value::as_f64)
                        .unwrap_or(0.0),
                    action,
                });
            if parsed.is_none() {
                tracing::warn!(position, "skipping malformed recording entry");
            }
            parsed
        })
        .collect()
}
