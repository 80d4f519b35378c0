use super::{Filter, FilterDecision, FilterError, Scope, joined_content_type};
use crate::record::{LogRecord, MultiValueMap};

/// Content types whose bodies are logged verbatim by default.
pub const LOGGABLE_TYPES: &[&str] = &["application/json", "text/plain", "text/html"];

/// Replaces bodies whose `Content-Type` is outside a configured allow-list
/// with a `<body not loggable Content-Type ...>` marker.
///
/// The allow-list matches by substring against all `Content-Type` values
/// joined with `,`, so parameters like `; charset=utf-8` do not defeat it.
/// Empty or absent bodies never trip the gate.
#[derive(Debug, Clone)]
pub struct ContentTypeGate {
    allowed: Vec<String>,
    scope: Scope,
}

impl ContentTypeGate {
    pub fn new<I, S>(allowed: I, scope: Scope) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
            scope,
        }
    }

    /// Gate allowing the default loggable types on both sides.
    pub fn with_default_types() -> Self {
        Self::new(LOGGABLE_TYPES.iter().copied(), Scope::All)
    }

    fn gate(&self, body: &mut Option<String>, headers: &MultiValueMap) {
        let has_body = body.as_ref().is_some_and(|b| !b.is_empty());
        if !has_body {
            return;
        }

        let content_type = joined_content_type(headers);
        let loggable = !content_type.is_empty()
            && self
                .allowed
                .iter()
                .any(|allowed| content_type.contains(allowed.as_str()));

        if !loggable {
            *body = Some(format!("<body not loggable Content-Type {content_type}>"));
        }
    }
}

impl Filter for ContentTypeGate {
    fn apply(&self, record: &mut LogRecord) -> Result<FilterDecision, FilterError> {
        let Some(exchange) = record.exchange_mut() else {
            return Ok(FilterDecision::Keep);
        };

        if self.scope.applies_to_request() {
            let request_body = &mut exchange.request_body;
            self.gate(request_body, &exchange.request_headers);
        }

        if self.scope.applies_to_response() {
            let response_body = &mut exchange.response_body;
            self.gate(response_body, &exchange.response_headers);
        }

        Ok(FilterDecision::Keep)
    }
}
