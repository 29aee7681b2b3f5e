//! The network seam between the pipeline and an HTTP implementation.
//!
//! # Design
//! A `Transport` takes a fully resolved `HttpRequest` and returns whatever
//! the server answered, 4xx and 5xx included: status interpretation belongs
//! to the pipeline. `Err` means no response was obtained at all.
//!
//! The core has no cancellation or timeout of its own. Callers that need a
//! deadline configure it here, at the transport.

use std::sync::Arc;

use thiserror::Error;

use crate::http::{HttpRequest, HttpResponse};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("request timed out")]
    Timeout,

    #[error("reading response failed: {0}")]
    Body(String),
}

pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request)
    }
}

#[cfg(feature = "ureq")]
pub use self::ureq_transport::UreqTransport;

#[cfg(feature = "ureq")]
mod ureq_transport {
    use std::time::Duration;

    use ureq::RequestBuilder;

    use super::{Transport, TransportError};
    use crate::http::{HttpMethod, HttpRequest, HttpResponse, WireBody};

    /// Blocking transport on a ureq agent.
    ///
    /// The agent is configured not to turn 4xx/5xx into errors, so every
    /// status comes back as data.
    #[derive(Clone)]
    pub struct UreqTransport {
        agent: ureq::Agent,
    }

    impl UreqTransport {
        pub fn new(timeout: Duration) -> Self {
            let agent = ureq::Agent::config_builder()
                .http_status_as_error(false)
                .timeout_global(Some(timeout))
                .build()
                .new_agent();
            Self { agent }
        }
    }

    impl Transport for UreqTransport {
        fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            let url = request.url.as_str();
            let result = match request.method {
                HttpMethod::Get => with_headers(self.agent.get(url), request).call(),
                HttpMethod::Delete => with_headers(self.agent.delete(url), request).call(),
                HttpMethod::Post => send_with_body(with_headers(self.agent.post(url), request), request),
                HttpMethod::Put => send_with_body(with_headers(self.agent.put(url), request), request),
                HttpMethod::Patch => send_with_body(with_headers(self.agent.patch(url), request), request),
            };
            let mut response = result.map_err(map_error)?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect();
            let body = response
                .body_mut()
                .read_to_vec()
                .map_err(|e| TransportError::Body(e.to_string()))?;

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }

    fn with_headers<B>(mut builder: RequestBuilder<B>, request: &HttpRequest) -> RequestBuilder<B> {
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
    }

    fn send_with_body(
        builder: RequestBuilder<ureq::typestate::WithBody>,
        request: &HttpRequest,
    ) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
        match &request.body {
            Some(WireBody::Json(text)) => builder.send(text.as_bytes()),
            Some(WireBody::Form {
                content_type: Some(content_type),
                bytes,
            }) => builder.content_type(content_type.as_str()).send(bytes.as_slice()),
            Some(WireBody::Form { bytes, .. }) => builder.send(bytes.as_slice()),
            None => builder.send_empty(),
        }
    }

    fn map_error(err: ureq::Error) -> TransportError {
        match err {
            ureq::Error::Timeout(_) => TransportError::Timeout,
            other => TransportError::Connection(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;

    struct Fixed(u16);

    impl Transport for Fixed {
        fn send(&self, _request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            Ok(HttpResponse::json(self.0, "{}"))
        }
    }

    fn request() -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: "http://localhost/api/dashboard/stats".to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    #[test]
    fn smart_pointers_forward_to_inner_transport() {
        let arc: Arc<dyn Transport> = Arc::new(Fixed(200));
        assert_eq!(arc.send(&request()).unwrap().status, 200);

        let boxed: Box<dyn Transport> = Box::new(Fixed(204));
        assert_eq!(boxed.send(&request()).unwrap().status, 204);

        let inner = Fixed(418);
        assert_eq!((&inner).send(&request()).unwrap().status, 418);
    }

    #[test]
    fn transport_error_messages() {
        assert_eq!(TransportError::Timeout.to_string(), "request timed out");
        assert_eq!(
            TransportError::Connection("refused".to_string()).to_string(),
            "connection failed: refused"
        );
    }
}
