use super::{MultiValueMap, RecordError};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use url::Url;

/// One structured log event, destined for serialization.
///
/// The base shape is a message plus an additive-only tag list; the
/// request/response kind adds the full exchange payload. Filters dispatch on
/// the kind once, so record variants never need per-filter type checks.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub(crate) message: String,
    pub(crate) extra_tags: Vec<String>,
    pub(crate) kind: RecordKind,
}

#[derive(Debug, Clone)]
pub enum RecordKind {
    Message,
    Exchange(Box<ExchangeData>),
}

impl LogRecord {
    /// A plain message record.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            extra_tags: Vec::new(),
            kind: RecordKind::Message,
        }
    }

    /// An empty request/response record, to be populated through the
    /// exchange setters.
    pub fn request_response() -> Self {
        Self {
            message: String::new(),
            extra_tags: Vec::new(),
            kind: RecordKind::Exchange(Box::default()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Tags in wrap order: innermost first, adapter/global tags appended
    /// last. Never deduplicated.
    pub fn tags(&self) -> &[String] {
        &self.extra_tags
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) {
        self.extra_tags.push(tag.into());
    }

    pub fn add_tags<I>(&mut self, tags: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.extra_tags.extend(tags.into_iter().map(Into::into));
    }

    pub fn exchange(&self) -> Option<&ExchangeData> {
        match &self.kind {
            RecordKind::Exchange(data) => Some(data),
            RecordKind::Message => None,
        }
    }

    pub fn exchange_mut(&mut self) -> Option<&mut ExchangeData> {
        match &mut self.kind {
            RecordKind::Exchange(data) => Some(data),
            RecordKind::Message => None,
        }
    }

    /// The canonical nested serialization shape. Idempotent and
    /// side-effect free; multi-value fields are flattened to joined strings.
    pub fn as_value(&self) -> Value {
        match &self.kind {
            RecordKind::Message => json!({
                "extra_tags": self.extra_tags,
                "message": self.message,
            }),
            RecordKind::Exchange(data) => json!({
                "extra_tags": self.extra_tags,
                "message": self.message,
                "request": {
                    "start": data.request_start,
                    "end": data.request_end,
                    "time": data.request_time,
                    "method": data.method,
                    "header": data.request_headers.flatten(),
                    "query": data.request_query.flatten(),
                    "url": data.url,
                    "host": data.host,
                    "path": data.path,
                    "route": data.route,
                    "route_match": data.route_match,
                    "user": data.user,
                    "user_uuid": data.user_uuid,
                    "body": data.request_body,
                },
                "response": {
                    "status_code": data.status_code,
                    "header": data.response_headers.flatten(),
                    "body": data.response_body,
                },
            }),
        }
    }
}

/// Request/response facts accumulated over one outbound HTTP exchange.
///
/// Setters are write-oriented: each validates or normalizes its input and
/// stores it, last write wins. Timestamps are Unix epoch seconds.
#[derive(Debug, Clone, Default)]
pub struct ExchangeData {
    pub(crate) request_start: Option<f64>,
    pub(crate) request_end: Option<f64>,
    pub(crate) request_time: Option<f64>,
    pub(crate) method: Option<String>,
    pub(crate) url: Option<String>,
    pub(crate) host: Option<String>,
    pub(crate) path: Option<String>,
    pub(crate) route: Option<String>,
    pub(crate) status_code: Option<u16>,
    pub(crate) user: Option<String>,
    pub(crate) user_uuid: Option<String>,
    pub(crate) request_query: MultiValueMap,
    pub(crate) request_headers: MultiValueMap,
    pub(crate) request_body: Option<String>,
    pub(crate) response_headers: MultiValueMap,
    pub(crate) response_body: Option<String>,
    pub(crate) route_match: BTreeMap<String, String>,
}

impl ExchangeData {
    pub fn set_method(&mut self, method: &str) {
        self.method = Some(method.to_uppercase());
    }

    /// Stores the URL verbatim and derives `host` and `path` from it.
    /// An unparseable URL keeps the raw value and leaves both derived
    /// fields unset.
    pub fn set_url(&mut self, url: &str) {
        self.url = Some(url.to_string());

        if let Ok(parsed) = Url::parse(url) {
            self.path = Some(parsed.path().to_string());
            self.host = parsed.host_str().map(|host| match parsed.port() {
                Some(port) => format!("{host}:{port}"),
                None => host.to_string(),
            });
        }
    }

    pub fn set_route(&mut self, route: impl Into<String>) {
        self.route = Some(route.into());
    }

    /// Accepts exactly the closed interval [100, 599]; rejected values
    /// leave the field as it was.
    pub fn set_status_code(&mut self, code: u16) -> Result<(), RecordError> {
        if !(100..=599).contains(&code) {
            return Err(RecordError::InvalidStatusCode(code));
        }

        self.status_code = Some(code);
        Ok(())
    }

    pub fn set_request_start(&mut self, start: f64) {
        self.request_start = Some(start);
        self.recompute_time();
    }

    pub fn set_request_end(&mut self, end: f64) {
        self.request_end = Some(end);
        self.recompute_time();
    }

    // Elapsed milliseconds, recomputed whenever either bound moves. May be
    // negative when bounds are set out of order; not validated.
    fn recompute_time(&mut self) {
        if let (Some(start), Some(end)) = (self.request_start, self.request_end) {
            self.request_time = Some((end - start) * 1000.0);
        }
    }

    pub fn set_request_body(&mut self, body: impl Into<String>) {
        self.request_body = Some(body.into());
    }

    pub fn set_response_body(&mut self, body: impl Into<String>) {
        self.response_body = Some(body.into());
    }

    pub fn set_user(&mut self, user: impl Into<String>) {
        self.user = Some(user.into());
    }

    pub fn set_user_uuid(&mut self, user_uuid: impl Into<String>) {
        self.user_uuid = Some(user_uuid.into());
    }

    /// Header names are title-case normalized so later lookups and
    /// redaction match case-insensitively.
    pub fn add_request_header(&mut self, name: &str, value: impl ToString) {
        self.request_headers.add(titlecase(name), value);
    }

    pub fn add_response_header(&mut self, name: &str, value: impl ToString) {
        self.response_headers.add(titlecase(name), value);
    }

    pub fn add_request_query(&mut self, name: &str, value: impl ToString) {
        self.request_query.add(name, value);
    }

    pub fn add_route_match(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.route_match.insert(name.into(), value.into());
    }
}

/// Title-cases a field name: the first letter of every run of alphabetic
/// characters is upper-cased, the rest lower-cased (`x-token` -> `X-Token`).
pub(crate) fn titlecase(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_alpha = false;

    for ch in name.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }

    out
}
