//! Error types for the TrackerPro API client.
//!
//! # Design
//! Two kinds reach a caller from `RequestPipeline::execute`: `Network` (no
//! response was obtained, or its body could not be decoded at all) and
//! `Http` (a response arrived with a non-2xx status). UIs render the two
//! differently: "check your connection" versus the server's own message.
//!
//! `InvalidRequest` is raised only while building a `RequestSpec`, before
//! anything is dispatched.

use thiserror::Error;

/// Caller-facing message for a request that never obtained a response.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";

/// Caller-facing message for a response whose body could not be decoded.
pub const DECODE_ERROR_MESSAGE: &str = "Unexpected response from server.";

/// Fallback when an error body carries no `message` field.
pub const GENERIC_HTTP_MESSAGE: &str = "Request failed";

/// Errors returned by the request pipeline and the typed accessors.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("invalid request: {0}")]
    InvalidRequest(#[from] SpecError),
}

impl ApiError {
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }

    /// HTTP status of an `Http` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http(err) => Some(err.status),
            _ => None,
        }
    }

    /// The message a UI should show for this failure.
    pub fn message(&self) -> &str {
        match self {
            ApiError::Network(err) => &err.message,
            ApiError::Http(err) => &err.message,
            ApiError::InvalidRequest(_) => GENERIC_HTTP_MESSAGE,
        }
    }

    /// True for 401/403, after which the session has already been torn down.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}

/// No usable response was obtained.
#[derive(Debug, Clone, Error)]
#[error("{message} ({kind})")]
pub struct NetworkError {
    pub message: String,
    pub kind: NetworkErrorKind,
}

impl NetworkError {
    pub fn unreachable(detail: impl Into<String>) -> Self {
        Self {
            message: NETWORK_ERROR_MESSAGE.to_string(),
            kind: NetworkErrorKind::Unreachable(detail.into()),
        }
    }

    pub fn decode(detail: impl Into<String>) -> Self {
        Self {
            message: DECODE_ERROR_MESSAGE.to_string(),
            kind: NetworkErrorKind::Decode(detail.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkErrorKind {
    /// DNS, connection, TLS or timeout failure at the transport.
    #[error("unreachable: {0}")]
    Unreachable(String),

    /// A 2xx response arrived but its body did not decode.
    #[error("decode failed: {0}")]
    Decode(String),
}

/// The server answered with a non-2xx status.
#[derive(Debug, Clone, Error)]
#[error("HTTP {status}: {message}")]
pub struct HttpError {
    pub status: u16,
    pub message: String,
    /// Raw response body, for caller inspection.
    pub body: String,
}

impl HttpError {
    /// The body parsed as JSON, if it is JSON.
    pub fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.body).ok()
    }
}

/// A `RequestSpec` could not be built.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("endpoint `{endpoint}` has no value for path parameter `:{name}`")]
    MissingPathParam { endpoint: String, name: String },

    #[error("request body could not be serialized: {0}")]
    Body(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_error_shows_connection_message() {
        let err = ApiError::from(NetworkError::unreachable("connection refused"));
        assert!(err.is_network());
        assert_eq!(err.message(), NETWORK_ERROR_MESSAGE);
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn http_error_display_includes_status_and_message() {
        let err = ApiError::from(HttpError {
            status: 409,
            message: "Email already exists".to_string(),
            body: r#"{"message":"Email already exists"}"#.to_string(),
        });
        assert_eq!(err.to_string(), "HTTP 409: Email already exists");
        assert_eq!(err.status(), Some(409));
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn forbidden_counts_as_unauthorized() {
        let err = ApiError::from(HttpError {
            status: 403,
            message: GENERIC_HTTP_MESSAGE.to_string(),
            body: String::new(),
        });
        assert!(err.is_unauthorized());
    }

    #[test]
    fn http_error_json_body() {
        let err = HttpError {
            status: 400,
            message: "bad".to_string(),
            body: r#"{"errors":{"email":"invalid"}}"#.to_string(),
        };
        assert_eq!(err.json().unwrap()["errors"]["email"], "invalid");
    }

    #[test]
    fn missing_path_param_names_the_placeholder() {
        let err = SpecError::MissingPathParam {
            endpoint: "/users/:id".to_string(),
            name: "id".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "endpoint `/users/:id` has no value for path parameter `:id`"
        );
    }
}
