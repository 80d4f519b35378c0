use crate::filter::Filter;
use crate::record::LogRecord;

/// Wraps a record on its way to emission, carrying record-scoped filters
/// and the drop flag.
///
/// The envelope starts active; `mark_dropped` is terminal. Dropped
/// envelopes are suppressed entirely by the adapter, no partial emission
/// occurs. The filter list is append-only and owned exclusively here.
pub struct Envelope {
    record: LogRecord,
    dropped: bool,
    filters: Vec<Box<dyn Filter>>,
}

impl Envelope {
    pub fn new(record: LogRecord) -> Self {
        Self {
            record,
            dropped: false,
            filters: Vec::new(),
        }
    }

    pub fn record(&self) -> &LogRecord {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut LogRecord {
        &mut self.record
    }

    pub fn add_filter(&mut self, filter: Box<dyn Filter>) {
        self.filters.push(filter);
    }

    pub fn add_filters<I>(&mut self, filters: I)
    where
        I: IntoIterator<Item = Box<dyn Filter>>,
    {
        self.filters.extend(filters);
    }

    pub fn mark_dropped(&mut self) {
        self.dropped = true;
    }

    pub fn is_dropped(&self) -> bool {
        self.dropped
    }

    pub(crate) fn into_parts(self) -> (LogRecord, bool, Vec<Box<dyn Filter>>) {
        (self.record, self.dropped, self.filters)
    }
}

impl From<LogRecord> for Envelope {
    fn from(record: LogRecord) -> Self {
        Envelope::new(record)
    }
}

impl From<&str> for Envelope {
    fn from(message: &str) -> Self {
        Envelope::new(LogRecord::new(message))
    }
}

impl From<String> for Envelope {
    fn from(message: String) -> Self {
        Envelope::new(LogRecord::new(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_active() {
        let envelope = Envelope::new(LogRecord::new("msg"));
        assert!(!envelope.is_dropped());
    }

    #[test]
    fn dropping_is_terminal() {
        let mut envelope = Envelope::new(LogRecord::new("msg"));
        envelope.mark_dropped();
        envelope.mark_dropped();
        assert!(envelope.is_dropped());
    }

    #[test]
    fn plain_strings_normalize_into_message_records() {
        let envelope: Envelope = "hello".into();
        assert_eq!(envelope.record().message(), "hello");
        assert!(envelope.record().exchange().is_none());
    }
}
