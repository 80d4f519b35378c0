mod body;
mod header;
mod json_body;
mod message;
mod query;

pub use body::{ContentTypeGate, LOGGABLE_TYPES};
pub use header::HeaderRedact;
pub use json_body::{BodySchema, JsonSchemaRedact};
pub use message::MessageBlacklist;
pub use query::QueryRedact;

use crate::record::{LogRecord, MultiValueMap};
use thiserror::Error;

/// Replacement token written over every redacted value.
pub const FILTERED: &str = "<filtered>";

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid blacklist pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
    #[error("Body is not valid JSON: {0}")]
    BodyNotJson(#[from] serde_json::Error),
}

/// Which side of a request/response exchange a filter touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    #[default]
    All,
    RequestOnly,
    ResponseOnly,
}

impl Scope {
    pub fn applies_to_request(self) -> bool {
        matches!(self, Scope::All | Scope::RequestOnly)
    }

    pub fn applies_to_response(self) -> bool {
        matches!(self, Scope::All | Scope::ResponseOnly)
    }
}

/// What a filter decided about the record it just saw.
///
/// `Drop` marks the record for exclusion; the surrounding envelope turns it
/// into suppressed emission. Filters that only redact return `Keep`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterDecision {
    #[default]
    Keep,
    Drop,
}

/// A redaction/exclusion rule applied to a record before emission.
///
/// Filters dispatch on the record kind and silently keep records of a kind
/// they do not handle. Mutating the record (and the returned decision) are
/// the only observable effects; filters hold no per-record state.
pub trait Filter: Send + Sync {
    fn apply(&self, record: &mut LogRecord) -> Result<FilterDecision, FilterError>;
}

/// Adapter turning a bare function or closure into a filter.
pub struct FilterFn<F>(pub F);

impl<F> Filter for FilterFn<F>
where
    F: Fn(&mut LogRecord) -> Result<FilterDecision, FilterError> + Send + Sync,
{
    fn apply(&self, record: &mut LogRecord) -> Result<FilterDecision, FilterError> {
        (self.0)(record)
    }
}

/// Applies `filters` to `record` in order, sequentially, so later filters
/// observe the mutations of earlier ones.
///
/// A failing filter is isolated: the failure is reported and the chain
/// continues, leaving the record exactly as the completed filters left it.
/// Returns `Drop` if any filter asked for exclusion.
pub fn apply_filters<'a, I>(record: &mut LogRecord, filters: I) -> FilterDecision
where
    I: IntoIterator<Item = &'a dyn Filter>,
{
    let mut decision = FilterDecision::Keep;

    for filter in filters {
        match filter.apply(record) {
            Ok(FilterDecision::Drop) => decision = FilterDecision::Drop,
            Ok(FilterDecision::Keep) => {}
            Err(err) => {
                tracing::warn!(error = %err, "filter failed to apply; record left unredacted by it");
            }
        }
    }

    decision
}

// All Content-Type values joined with `,`, matching the flattened form the
// record serializes.
pub(crate) fn joined_content_type(headers: &MultiValueMap) -> String {
    headers.get_all("Content-Type").join(",")
}
