//! Tracked transport middleware.
//!
//! Every outgoing request through [`TrackedTransport`] brackets one tracked
//! operation: started before dispatch, ended after completion or failure,
//! with the error returned unchanged after bookkeeping. A request carrying
//! the [`SILENT_REQUEST_HEADER`] marker is exempt — the one wire-level
//! contract in the system. The middleware is an explicit registration point
//! on the [`Transport`] seam rather than a patched global constructor, so
//! the "every request brackets an operation" rule holds for any client the
//! host plugs in.

use crate::result::{EsperarError, EsperarResult};
use crate::tracker::{OperationGuard, TrackerHandle};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::VecDeque;

/// Marker header exempting a request from loading-state bookkeeping
pub const SILENT_REQUEST_HEADER: &str = "x-silent-request";

// =============================================================================
// REQUEST / RESPONSE
// =============================================================================

/// HTTP methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HttpMethod {
    /// GET request
    #[default]
    Get,
    /// POST request
    Post,
    /// PUT request
    Put,
    /// DELETE request
    Delete,
    /// PATCH request
    Patch,
    /// HEAD request
    Head,
    /// OPTIONS request
    Options,
}

impl HttpMethod {
    /// Convert to the wire string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

/// An outgoing request as seen by the tracked transport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// HTTP method
    pub method: HttpMethod,
    /// Request URL
    pub url: String,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Request body
    pub body: Vec<u8>,
}

impl Request {
    /// Create a request
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Create a GET request
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// Create a POST request
    #[must_use]
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    /// Set the body
    #[must_use]
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Set a JSON body
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn with_json<T: Serialize>(mut self, data: &T) -> EsperarResult<Self> {
        self.body = serde_json::to_vec(data)?;
        self.headers
            .insert("content-type".to_string(), "application/json".to_string());
        Ok(self)
    }

    /// Mark the request silent, exempting it from bookkeeping
    #[must_use]
    pub fn silent(self) -> Self {
        self.with_header(SILENT_REQUEST_HEADER, "1")
    }

    /// Whether a header is present, by case-insensitive name
    #[must_use]
    pub fn has_header(&self, name: &str) -> bool {
        self.headers
            .keys()
            .any(|key| key.eq_ignore_ascii_case(name))
    }

    /// Whether this request carries the silent marker
    #[must_use]
    pub fn is_silent(&self) -> bool {
        self.has_header(SILENT_REQUEST_HEADER)
    }
}

/// A completed response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HashMap<String, String>,
    /// Response body
    pub body: Vec<u8>,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: 200,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }
}

impl Response {
    /// Create an empty 200 response
    #[must_use]
    pub fn ok() -> Self {
        Self::default()
    }

    /// Create a response with the given status
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Set the body
    #[must_use]
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    /// Get the body as a string
    #[must_use]
    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Whether the status is in the 2xx range
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

// =============================================================================
// TRANSPORT SEAM
// =============================================================================

/// The HTTP-client seam the middleware wraps
pub trait Transport {
    /// Execute a request to completion
    ///
    /// # Errors
    ///
    /// Returns a transport error when the request cannot complete
    fn execute(&mut self, request: &Request) -> EsperarResult<Response>;
}

/// Middleware bracketing every non-silent request with one tracked
/// operation
#[derive(Debug)]
pub struct TrackedTransport<T> {
    inner: T,
    tracker: TrackerHandle,
}

impl<T: Transport> TrackedTransport<T> {
    /// Wrap a transport with tracker bookkeeping
    #[must_use]
    pub fn new(inner: T, tracker: TrackerHandle) -> Self {
        Self { inner, tracker }
    }

    /// Unwrap the inner transport
    #[must_use]
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Transport> Transport for TrackedTransport<T> {
    fn execute(&mut self, request: &Request) -> EsperarResult<Response> {
        if request.is_silent() {
            tracing::trace!(url = %request.url, "silent request, bookkeeping skipped");
            return self.inner.execute(request);
        }

        // The guard ends the operation when it drops, on the error path too;
        // the result passes through untouched
        let _guard = OperationGuard::begin(self.tracker.clone());
        self.inner.execute(request)
    }
}

// =============================================================================
// LEGACY REQUEST LIFECYCLE
// =============================================================================

/// Probe mapping the legacy request object's lifecycle events onto the
/// tracker.
///
/// The host wires its load-start and load-end callbacks here; load-end
/// fires on success, failure, and abort alike.
#[derive(Debug, Clone)]
pub struct RequestLifecycle {
    tracker: TrackerHandle,
}

impl RequestLifecycle {
    /// Create a probe for the given tracker
    #[must_use]
    pub fn new(tracker: TrackerHandle) -> Self {
        Self { tracker }
    }

    /// The request started loading
    pub fn load_started(&self) {
        self.tracker.operation_started();
    }

    /// The request finished loading, successfully or not
    pub fn load_ended(&self) {
        self.tracker.operation_ended();
    }
}

// =============================================================================
// MOCK TRANSPORT
// =============================================================================

/// Canned transport for tests: replays queued outcomes and records every
/// request it sees
#[derive(Debug, Default)]
pub struct MockTransport {
    outcomes: VecDeque<EsperarResult<Response>>,
    requests: Vec<Request>,
}

impl MockTransport {
    /// Create an empty mock; unqueued requests get an empty 200
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response
    pub fn enqueue_ok(&mut self, response: Response) {
        self.outcomes.push_back(Ok(response));
    }

    /// Queue a transport failure
    pub fn enqueue_error(&mut self, message: impl Into<String>) {
        self.outcomes.push_back(Err(EsperarError::transport(message)));
    }

    /// Requests executed so far, in order
    #[must_use]
    pub fn requests(&self) -> &[Request] {
        &self.requests
    }
}

impl Transport for MockTransport {
    fn execute(&mut self, request: &Request) -> EsperarResult<Response> {
        self.requests.push(request.clone());
        self.outcomes.pop_front().unwrap_or_else(|| Ok(Response::ok()))
    }
}
