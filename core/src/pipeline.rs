//! The request pipeline: one `RequestSpec` in, one network call, one
//! decoded value or classified error out.
//!
//! # Design
//! URL and header construction are free functions with no hidden state, so
//! resolving the same spec twice gives the same request. `RequestPipeline`
//! adds the three things that need collaborators: reading the token from the
//! `TokenStore`, dispatching through the `Transport`, and tearing down the
//! session on 401/403.
//!
//! There are no retries. A 401 is observed once and signalled once.

use std::sync::Arc;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, HttpError, NetworkError, GENERIC_HTTP_MESSAGE};
use crate::http::{HttpRequest, HttpResponse, WireBody};
use crate::request::{parse_template, RequestBody, RequestSpec, ResponseKind, Segment};
use crate::session::{token_expired, unix_now, SessionInvalidated, SessionListener, TokenStore};
use crate::transport::Transport;

/// Characters escaped in a substituted path parameter: the WHATWG
/// path-segment set plus `%`, so a value always stays one segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'%');

/// A successfully decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Json(Value),
    Blob(Vec<u8>),
    Text(String),
}

impl Decoded {
    pub fn into_json(self) -> Option<Value> {
        match self {
            Decoded::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Decoded::Json(value) => value.to_string().into_bytes(),
            Decoded::Blob(bytes) => bytes,
            Decoded::Text(text) => text.into_bytes(),
        }
    }
}

/// Substitutes percent-encoded path parameters and appends the encoded
/// query string.
///
/// `base_url` is used as given; `RequestPipeline` strips its trailing `/`
/// once at construction.
pub fn resolve_url(base_url: &str, spec: &RequestSpec) -> String {
    let mut url = String::with_capacity(base_url.len() + spec.endpoint().len());
    url.push_str(base_url);
    for segment in parse_template(spec.endpoint()) {
        match segment {
            Segment::Literal(text) => url.push_str(text),
            Segment::Placeholder(name) => match spec.path_params().get(name) {
                Some(value) => url.extend(utf8_percent_encode(value, PATH_SEGMENT)),
                // unreachable for a built spec
                None => {
                    url.push(':');
                    url.push_str(name);
                }
            },
        }
    }

    let query = spec.query_params();
    if !query.is_empty() {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .finish();
        url.push('?');
        url.push_str(&encoded);
    }
    url
}

/// `Accept` always; `Content-Type: application/json` unless the body is an
/// opaque form payload; `Authorization` when auth is required and a
/// non-empty token exists.
pub fn build_headers(spec: &RequestSpec, token: Option<&str>) -> Vec<(String, String)> {
    let mut headers = vec![("Accept".to_string(), "application/json".to_string())];
    if !spec.body().is_some_and(RequestBody::is_form) {
        headers.push(("Content-Type".to_string(), "application/json".to_string()));
    }
    if spec.requires_auth() {
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }
    }
    headers
}

/// Serializes the body for methods that carry one. GET and DELETE never do,
/// even when the `RequestSpec` has a body.
pub fn serialize_body(spec: &RequestSpec) -> Option<WireBody> {
    if !spec.method().allows_body() {
        return None;
    }
    spec.body().map(|body| match body {
        RequestBody::Json(value) => WireBody::Json(value.to_string()),
        RequestBody::Form {
            content_type,
            bytes,
        } => WireBody::Form {
            content_type: content_type.clone(),
            bytes: bytes.clone(),
        },
    })
}

/// Classifies a response. No side effects: session teardown happens in
/// `RequestPipeline::execute`.
pub fn decode_response(response: HttpResponse, kind: ResponseKind) -> Result<Decoded, ApiError> {
    if !response.is_success() {
        return Err(http_error(&response).into());
    }
    match kind {
        ResponseKind::Blob => Ok(Decoded::Blob(response.body)),
        ResponseKind::Text => String::from_utf8(response.body)
            .map(Decoded::Text)
            .map_err(|e| ApiError::from(NetworkError::decode(format!("response is not UTF-8: {e}")))),
        ResponseKind::Json if !response.declares_json() => {
            Ok(Decoded::Text(response.body_text_lossy()))
        }
        ResponseKind::Json => serde_json::from_slice(&response.body)
            .map(Decoded::Json)
            .map_err(|e| ApiError::from(NetworkError::decode(format!("invalid JSON: {e}")))),
    }
}

fn http_error(response: &HttpResponse) -> HttpError {
    let message = serde_json::from_slice::<Value>(&response.body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| GENERIC_HTTP_MESSAGE.to_string());
    HttpError {
        status: response.status,
        message,
        body: response.body_text_lossy(),
    }
}

pub struct RequestPipeline<T> {
    base_url: String,
    transport: T,
    store: Arc<dyn TokenStore>,
    listeners: Vec<Arc<dyn SessionListener>>,
}

impl<T: Transport> RequestPipeline<T> {
    pub fn new(base_url: &str, transport: T, store: Arc<dyn TokenStore>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            store,
            listeners: Vec::new(),
        }
    }

    /// Registers a listener for session teardown.
    pub fn subscribe(&mut self, listener: Arc<dyn SessionListener>) {
        self.listeners.push(listener);
    }

    pub fn with_listener(mut self, listener: Arc<dyn SessionListener>) -> Self {
        self.subscribe(listener);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn resolve_url(&self, spec: &RequestSpec) -> String {
        resolve_url(&self.base_url, spec)
    }

    /// Builds the wire request using the store's current token.
    pub fn resolve(&self, spec: &RequestSpec) -> HttpRequest {
        let token = if spec.requires_auth() {
            self.store.token()
        } else {
            None
        };
        HttpRequest {
            method: spec.method(),
            url: self.resolve_url(spec),
            headers: build_headers(spec, token.as_deref()),
            body: serialize_body(spec),
        }
    }

    pub fn execute(&self, spec: &RequestSpec) -> Result<Decoded, ApiError> {
        let request = self.resolve(spec);
        tracing::debug!(method = %request.method, url = %request.url, "dispatching request");

        let response = match self.transport.send(&request) {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(method = %request.method, url = %request.url, error = %err, "transport failure");
                return Err(NetworkError::unreachable(err.to_string()).into());
            }
        };

        let status = response.status;
        if matches!(status, 401 | 403) {
            self.invalidate(SessionInvalidated::Rejected { status });
        }

        let result = decode_response(response, spec.response_kind());
        match &result {
            Ok(_) => tracing::debug!(method = %request.method, url = %request.url, status, "request succeeded"),
            Err(err) => tracing::warn!(method = %request.method, url = %request.url, status, error = %err, "request failed"),
        }
        result
    }

    /// Executes and deserializes a JSON response into `R`. A body of the
    /// wrong shape is a decode failure.
    pub fn execute_json<R: DeserializeOwned>(&self, spec: &RequestSpec) -> Result<R, ApiError> {
        match self.execute(spec)? {
            Decoded::Json(value) => serde_json::from_value(value)
                .map_err(|e| ApiError::from(NetworkError::decode(format!("unexpected response shape: {e}")))),
            Decoded::Text(_) | Decoded::Blob(_) => {
                Err(NetworkError::decode("expected a JSON response").into())
            }
        }
    }

    /// Verifies the stored token locally. A missing, malformed or expired
    /// token tears the session down and returns `false`.
    pub fn check_session(&self) -> bool {
        self.check_session_at(unix_now())
    }

    pub fn check_session_at(&self, now_secs: u64) -> bool {
        match self.store.token() {
            None => {
                self.invalidate(SessionInvalidated::MissingToken);
                false
            }
            Some(token) if token_expired(&token, now_secs) => {
                self.invalidate(SessionInvalidated::ExpiredToken);
                false
            }
            Some(_) => true,
        }
    }

    fn invalidate(&self, event: SessionInvalidated) {
        tracing::warn!(?event, "session invalidated");
        self.store.clear();
        for listener in &self.listeners {
            listener.session_invalidated(event);
        }
    }
}
