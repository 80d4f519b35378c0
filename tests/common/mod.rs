use reqlog::LogBackend;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tracing::Level;

/// Backend capturing emitted payloads for assertions.
#[derive(Clone, Default)]
pub struct RecordingBackend {
    events: Arc<Mutex<Vec<(Level, Value)>>>,
}

impl RecordingBackend {
    pub fn events(&self) -> Vec<(Level, Value)> {
        self.events.lock().unwrap().clone()
    }
}

impl LogBackend for RecordingBackend {
    fn name(&self) -> &str {
        "requests_out"
    }

    fn emit(&self, level: Level, payload: &Value) {
        self.events.lock().unwrap().push((level, payload.clone()));
    }
}
