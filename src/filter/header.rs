use super::{FILTERED, Filter, FilterDecision, FilterError, Scope};
use crate::record::{LogRecord, MultiValueMap, titlecase};

/// Replaces the values of configured headers with the `<filtered>` token on
/// the scoped side(s) of the exchange. Absent headers are untouched.
///
/// Names match case-insensitively through the same title-case
/// normalization the record applies when headers are added.
#[derive(Debug, Clone)]
pub struct HeaderRedact {
    names: Vec<String>,
    scope: Scope,
}

impl HeaderRedact {
    pub fn new<I, S>(names: I, scope: Scope) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names.into_iter().map(|n| titlecase(n.as_ref())).collect(),
            scope,
        }
    }
}

impl Filter for HeaderRedact {
    fn apply(&self, record: &mut LogRecord) -> Result<FilterDecision, FilterError> {
        let Some(exchange) = record.exchange_mut() else {
            return Ok(FilterDecision::Keep);
        };

        if self.scope.applies_to_request() {
            redact_headers(&self.names, &mut exchange.request_headers);
        }

        if self.scope.applies_to_response() {
            redact_headers(&self.names, &mut exchange.response_headers);
        }

        Ok(FilterDecision::Keep)
    }
}

fn redact_headers(names: &[String], headers: &mut MultiValueMap) {
    for name in names {
        if headers.contains_key(name) {
            headers.set(name, FILTERED);
        }
    }
}
