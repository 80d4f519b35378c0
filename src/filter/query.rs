use super::{FILTERED, Filter, FilterDecision, FilterError, Scope};
use crate::record::LogRecord;

/// Replaces the values of configured query parameters with the `<filtered>`
/// token. Parameter names match exactly; absent parameters are untouched.
///
/// The query string only exists on the request side, so a response-only
/// scope makes this filter a no-op.
#[derive(Debug, Clone)]
pub struct QueryRedact {
    names: Vec<String>,
    scope: Scope,
}

impl QueryRedact {
    pub fn new<I, S>(names: I, scope: Scope) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            scope,
        }
    }
}

impl Filter for QueryRedact {
    fn apply(&self, record: &mut LogRecord) -> Result<FilterDecision, FilterError> {
        if !self.scope.applies_to_request() {
            return Ok(FilterDecision::Keep);
        }

        let Some(exchange) = record.exchange_mut() else {
            return Ok(FilterDecision::Keep);
        };

        for name in &self.names {
            if exchange.request_query.contains_key(name) {
                exchange.request_query.set(name, FILTERED);
            }
        }

        Ok(FilterDecision::Keep)
    }
}
