use crate::adapter::{DEFAULT_LOGGER_NAME, LogAdapter, LogBackend, TracingBackend};
use crate::filter::{ContentTypeGate, Filter, Scope};
use crate::record::{ExchangeData, LogRecord, RecordError};
use anyhow::Context;
use bytes::Bytes;
use chrono::Utc;
use reqwest::header::HeaderMap;
use reqwest::{Client, Request, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

/// Sentinel stored in place of a body that cannot be decoded as text.
pub const RAW_BODY: &str = "<RAW Data>";

/// Content types the wrapper's default body gate logs verbatim.
pub const DEFAULT_ALLOWED_TYPES: &[&str] = &[
    "application/json",
    "text/plain",
    "text/html",
    "application/x-www-form-urlencoded",
];

/// Outbound HTTP client with request/response logging.
///
/// Every executed exchange is captured into a record, run through the
/// adapter's filter chain, and emitted at info level; transport failures
/// are emitted at error level without response fields and then returned to
/// the caller. A failure inside the logging path itself is reported as a
/// secondary diagnostic and never propagates: logging must not break the
/// request being logged.
pub struct LoggedClient<B: LogBackend = TracingBackend> {
    inner: Client,
    adapter: LogAdapter<B>,
}

impl LoggedClient {
    /// Wraps `inner`, tagging every record with `tag` and installing the
    /// default content-type gate.
    pub fn new(inner: Client, tag: impl Into<String>) -> Self {
        Self::with_backend(inner, TracingBackend::new(), tag, Vec::new())
    }

    /// Like `new`, with additional global filters appended after the
    /// default content-type gate.
    pub fn with_filters(
        inner: Client,
        tag: impl Into<String>,
        filters: Vec<Box<dyn Filter>>,
    ) -> Self {
        Self::with_backend(inner, TracingBackend::new(), tag, filters)
    }
}

impl<B: LogBackend> LoggedClient<B> {
    /// Full constructor with a caller-supplied emission backend.
    pub fn with_backend(
        inner: Client,
        backend: B,
        tag: impl Into<String>,
        extra_filters: Vec<Box<dyn Filter>>,
    ) -> Self {
        let mut filters: Vec<Box<dyn Filter>> = vec![Box::new(ContentTypeGate::new(
            DEFAULT_ALLOWED_TYPES.iter().copied(),
            Scope::All,
        ))];
        filters.extend(extra_filters);

        let adapter = LogAdapter::new(backend)
            .with_tags([tag.into()])
            .with_filters(filters);

        Self { inner, adapter }
    }

    /// Executes `request` and logs the exchange.
    ///
    /// The response body is read to completion so it can be logged, so the
    /// caller gets a [`LoggedResponse`] holding the already-buffered bytes
    /// instead of a streaming response.
    pub async fn execute(&self, request: Request) -> reqwest::Result<LoggedResponse> {
        let start = epoch_seconds();
        let captured = capture_request(&request);

        let response = match self.inner.execute(request).await {
            Ok(response) => response,
            Err(err) => {
                self.log_exchange(start, epoch_seconds(), &captured, None);
                return Err(err);
            }
        };

        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().clone();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(err) => {
                self.log_exchange(start, epoch_seconds(), &captured, None);
                return Err(err);
            }
        };

        let captured_response = CapturedResponse {
            status,
            headers: headers.clone(),
            body: body.clone(),
        };
        self.log_exchange(start, epoch_seconds(), &captured, Some(&captured_response));

        Ok(LoggedResponse {
            status,
            headers,
            url,
            body,
        })
    }

    // Error boundary: a logging failure is a secondary diagnostic, never an
    // error for the caller's request.
    fn log_exchange(
        &self,
        start: f64,
        end: f64,
        request: &CapturedRequest,
        response: Option<&CapturedResponse>,
    ) {
        if let Err(err) = self.try_log_exchange(start, end, request, response) {
            tracing::error!(target: DEFAULT_LOGGER_NAME, error = %format!("{err:#}"), "failed to log request");
        }
    }

    fn try_log_exchange(
        &self,
        start: f64,
        end: f64,
        request: &CapturedRequest,
        response: Option<&CapturedResponse>,
    ) -> anyhow::Result<()> {
        let mut record = LogRecord::request_response();

        {
            let exchange = record
                .exchange_mut()
                .context("request/response record has no exchange data")?;
            exchange.set_request_start(start);
            exchange.set_request_end(end);
            record_request(exchange, request);
            if let Some(response) = response {
                record_response(exchange, response)?;
            }
        }

        if response.is_some() {
            self.adapter.info(record);
        } else {
            self.adapter.error(record);
        }

        Ok(())
    }
}

/// A fully buffered response returned by [`LoggedClient::execute`].
#[derive(Debug, Clone)]
pub struct LoggedResponse {
    status: StatusCode,
    headers: HeaderMap,
    url: Url,
    body: Bytes,
}

impl LoggedResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }
}

struct CapturedRequest {
    method: String,
    url: Url,
    headers: HeaderMap,
    body: Option<Bytes>,
}

struct CapturedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

// Request facts are captured before the request is consumed by the send;
// streaming bodies have no buffered bytes and are recorded without a body.
fn capture_request(request: &Request) -> CapturedRequest {
    CapturedRequest {
        method: request.method().as_str().to_string(),
        url: request.url().clone(),
        headers: request.headers().clone(),
        body: request
            .body()
            .and_then(|body| body.as_bytes())
            .map(Bytes::copy_from_slice),
    }
}

fn record_request(exchange: &mut ExchangeData, request: &CapturedRequest) {
    exchange.set_method(&request.method);
    exchange.set_url(request.url.as_str());

    for (name, value) in &request.headers {
        exchange.add_request_header(name.as_str(), String::from_utf8_lossy(value.as_bytes()));
    }

    for (name, value) in request.url.query_pairs() {
        exchange.add_request_query(&name, value);
    }

    if let Some(body) = request.body.as_ref().filter(|body| !body.is_empty()) {
        exchange.set_request_body(decode_body(body));
    }
}

fn record_response(
    exchange: &mut ExchangeData,
    response: &CapturedResponse,
) -> Result<(), RecordError> {
    exchange.set_status_code(response.status.as_u16())?;

    for (name, value) in &response.headers {
        exchange.add_response_header(name.as_str(), String::from_utf8_lossy(value.as_bytes()));
    }

    if !response.body.is_empty() {
        exchange.set_response_body(decode_body(&response.body));
    }

    Ok(())
}

fn decode_body(body: &Bytes) -> String {
    match std::str::from_utf8(body) {
        Ok(text) => text.to_string(),
        Err(_) => RAW_BODY.to_string(),
    }
}

fn epoch_seconds() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
