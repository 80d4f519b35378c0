use super::{FILTERED, Filter, FilterDecision, FilterError};
use crate::record::LogRecord;
use regex::Regex;

/// Replaces every occurrence of a configured literal term in the record's
/// message with the `<filtered>` token.
///
/// Applies to every record kind, since every record carries a message.
#[derive(Debug, Clone)]
pub struct MessageBlacklist {
    pattern: Option<Regex>,
}

impl MessageBlacklist {
    /// Builds one alternation pattern from the escaped terms. An empty
    /// blacklist matches nothing.
    pub fn new<I, S>(terms: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let escaped: Vec<String> = terms
            .into_iter()
            .map(|term| regex::escape(term.as_ref()))
            .collect();

        let pattern = if escaped.is_empty() {
            None
        } else {
            Some(Regex::new(&escaped.join("|"))?)
        };

        Ok(Self { pattern })
    }
}

impl Filter for MessageBlacklist {
    fn apply(&self, record: &mut LogRecord) -> Result<FilterDecision, FilterError> {
        if let Some(pattern) = &self.pattern {
            record.message = pattern.replace_all(&record.message, FILTERED).into_owned();
        }

        Ok(FilterDecision::Keep)
    }
}
