//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The
//! pipeline builds `HttpRequest` values and decodes `HttpResponse` values;
//! a `Transport` implementation performs the actual I/O in between. Keeping
//! the wire shapes as plain owned data lets tests script responses without
//! a socket.

use std::fmt;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Whether a request body may be attached. GET and DELETE never carry one.
    pub fn allows_body(self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request body in its serialized wire form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireBody {
    /// JSON text; sent with the `Content-Type: application/json` header.
    Json(String),

    /// Opaque form payload passed through untouched. No `Content-Type`
    /// header is emitted by the pipeline; the transport applies
    /// `content_type` (e.g. a multipart boundary) when present.
    Form {
        content_type: Option<String>,
        bytes: Vec<u8>,
    },
}

impl WireBody {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            WireBody::Json(text) => text.as_bytes(),
            WireBody::Form { bytes, .. } => bytes,
        }
    }
}

/// A fully resolved HTTP request described as plain data.
///
/// Built by `RequestPipeline::resolve`. The URL never contains unresolved
/// `:name` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<WireBody>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response described as plain data.
///
/// Produced by a `Transport`, then decoded by the pipeline according to the
/// request's `ResponseKind`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Convenience constructor for a JSON body.
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: body.as_bytes().to_vec(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// `false` only when the response declares a content type that is not JSON.
    /// A missing `Content-Type` header is treated as JSON.
    pub fn declares_json(&self) -> bool {
        match self.header("content-type") {
            Some(ct) => ct.to_ascii_lowercase().contains("json"),
            None => true,
        }
    }

    pub fn body_text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_post_put_patch_allow_body() {
        assert!(HttpMethod::Post.allows_body());
        assert!(HttpMethod::Put.allows_body());
        assert!(HttpMethod::Patch.allows_body());
        assert!(!HttpMethod::Get.allows_body());
        assert!(!HttpMethod::Delete.allows_body());
    }

    #[test]
    fn header_lookup_ignores_case() {
        let response = HttpResponse {
            status: 200,
            headers: vec![("Content-Type".to_string(), "text/csv".to_string())],
            body: Vec::new(),
        };
        assert_eq!(response.header("content-type"), Some("text/csv"));
        assert!(!response.declares_json());
    }

    #[test]
    fn missing_content_type_counts_as_json() {
        let response = HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: b"{}".to_vec(),
        };
        assert!(response.declares_json());
    }

    #[test]
    fn json_content_type_with_charset() {
        let response = HttpResponse {
            status: 200,
            headers: vec![(
                "content-type".to_string(),
                "application/json;charset=UTF-8".to_string(),
            )],
            body: Vec::new(),
        };
        assert!(response.declares_json());
    }
}
