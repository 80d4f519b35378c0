mod envelope;

pub use envelope::Envelope;

use crate::filter::{Filter, FilterDecision, apply_filters};
use serde_json::Value;
use tracing::Level;

/// Target and logger name of the default backend. Also the final tag on
/// every record it emits.
pub const DEFAULT_LOGGER_NAME: &str = "requests_out";

/// The leveled logging sink an adapter hands finished records to.
///
/// Implementations receive the fully filtered, serialized payload; by the
/// time it arrives here every multi-value field is a flattened string.
pub trait LogBackend: Send + Sync {
    /// Logger name, appended as the last tag of every emitted record.
    fn name(&self) -> &str;

    fn emit(&self, level: Level, payload: &Value);
}

/// Backend emitting records as `tracing` events with the serialized record
/// in the `payload` field.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingBackend;

impl TracingBackend {
    pub fn new() -> Self {
        Self
    }
}

impl LogBackend for TracingBackend {
    fn name(&self) -> &str {
        DEFAULT_LOGGER_NAME
    }

    fn emit(&self, level: Level, payload: &Value) {
        if level == Level::ERROR {
            tracing::error!(target: DEFAULT_LOGGER_NAME, payload = %payload);
        } else if level == Level::WARN {
            tracing::warn!(target: DEFAULT_LOGGER_NAME, payload = %payload);
        } else if level == Level::DEBUG {
            tracing::debug!(target: DEFAULT_LOGGER_NAME, payload = %payload);
        } else if level == Level::TRACE {
            tracing::trace!(target: DEFAULT_LOGGER_NAME, payload = %payload);
        } else {
            tracing::info!(target: DEFAULT_LOGGER_NAME, payload = %payload);
        }
    }
}

/// Turns log calls into filtered, tagged record emissions.
///
/// Static tags and global filters are fixed at construction and shared
/// read-only across calls; per-call filters ride on the envelope. Global
/// filters run first, then the envelope's, each exactly once. A dropped
/// envelope suppresses the backend call entirely.
pub struct LogAdapter<B: LogBackend> {
    backend: B,
    tags: Vec<String>,
    filters: Vec<Box<dyn Filter>>,
}

impl<B: LogBackend> LogAdapter<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            tags: Vec::new(),
            filters: Vec::new(),
        }
    }

    pub fn with_tags<I>(mut self, tags: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_filters(mut self, filters: Vec<Box<dyn Filter>>) -> Self {
        self.filters = filters;
        self
    }

    pub fn info(&self, message: impl Into<Envelope>) {
        self.log(Level::INFO, message);
    }

    /// Error-level emission, used for exchanges that ended in a transport
    /// failure.
    pub fn error(&self, message: impl Into<Envelope>) {
        self.log(Level::ERROR, message);
    }

    pub fn log(&self, level: Level, message: impl Into<Envelope>) {
        let (mut record, dropped, local_filters) = message.into().into_parts();

        record.add_tags(self.tags.iter().cloned());
        record.add_tag(self.backend.name());

        let chain = self
            .filters
            .iter()
            .map(|f| &**f)
            .chain(local_filters.iter().map(|f| &**f));
        let decision = apply_filters(&mut record, chain);

        if dropped || decision == FilterDecision::Drop {
            return;
        }

        self.backend.emit(level, &record.as_value());
    }
}
