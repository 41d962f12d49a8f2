use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const ENVELOPE_TYPE: &str = "mraid_event_from_simulator";

/// Message the harness posts into the creative's context.
///
/// Wire shape: `{"type": "mraid_event_from_simulator", "event": ..., "args": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "mraid_event_from_simulator")]
pub struct SimulatorMessage {
    pub event: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl SimulatorMessage {
    pub fn new(event: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            event: event.into(),
            args,
        }
    }

    /// Accepts only values carrying the simulator envelope tag; anything else
    /// posted to the context is not meant for the mock.
    pub fn from_value(value: &Value) -> Option<Self> {
        if value.get("type").and_then(Value::as_str) != Some(ENVELOPE_TYPE) {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }
}
