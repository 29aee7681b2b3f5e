//! Typed accessors over the endpoint tables.
//!
//! # Design
//! `TrackerClient` owns one `RequestPipeline` and hands out short-lived
//! accessor values grouped the way the application's panels use them:
//! `auth()`, `admin()`, `hr()` and `student()`. Each accessor method starts
//! from an `endpoints` row, fills in parameters and body, and runs the request
//! through the pipeline. None of them inspect `success`; the envelope is
//! returned as the server sent it.

pub mod admin;
pub mod hr;
pub mod student;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::endpoints;
use crate::error::ApiError;
use crate::pipeline::RequestPipeline;
use crate::request::RequestSpecBuilder;
use crate::session::TokenStore;
use crate::transport::Transport;
use crate::types::{AuthResponse, LoginRequest, RegisterRequest, UserInfo};

pub use admin::AdminApi;
pub use hr::HrApi;
pub use student::StudentApi;

/// Builds the request and executes it, deserializing a JSON response.
pub(crate) fn fetch<T: Transport, R: DeserializeOwned>(
    pipeline: &RequestPipeline<T>,
    builder: RequestSpecBuilder,
) -> Result<R, ApiError> {
    let spec = builder.build()?;
    pipeline.execute_json(&spec)
}

pub struct TrackerClient<T> {
    pipeline: RequestPipeline<T>,
}

impl<T: Transport> TrackerClient<T> {
    pub fn new(pipeline: RequestPipeline<T>) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &RequestPipeline<T> {
        &self.pipeline
    }

    pub fn auth(&self) -> AuthApi<'_, T> {
        AuthApi {
            pipeline: &self.pipeline,
        }
    }

    pub fn admin(&self) -> AdminApi<'_, T> {
        AdminApi::new(&self.pipeline)
    }

    pub fn hr(&self) -> HrApi<'_, T> {
        HrApi::new(&self.pipeline)
    }

    pub fn student(&self) -> StudentApi<'_, T> {
        StudentApi::new(&self.pipeline)
    }
}

#[cfg(feature = "ureq")]
impl TrackerClient<crate::transport::UreqTransport> {
    /// A client on a ureq agent that logs the login URL when the session
    /// ends.
    pub fn from_config(config: &crate::config::ClientConfig, store: Arc<dyn TokenStore>) -> Self {
        use crate::session::{LogNavigator, RedirectToLogin};

        let transport = crate::transport::UreqTransport::new(config.timeout);
        let navigator = LogNavigator::new(config.login_url());
        let pipeline = RequestPipeline::new(&config.base_url, transport, store)
            .with_listener(Arc::new(RedirectToLogin(navigator)));
        Self::new(pipeline)
    }
}

/// Sign-in, sign-out and token checks.
pub struct AuthApi<'a, T> {
    pipeline: &'a RequestPipeline<T>,
}

impl<'a, T: Transport> AuthApi<'a, T> {
    /// Signs in and, when the response carries a token, stores it together
    /// with the returned user.
    pub fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: AuthResponse = fetch(self.pipeline, endpoints::auth::LOGIN.spec().json(&body))?;
        if let Some(token) = response.token.as_deref().filter(|t| !t.is_empty()) {
            self.store().set(token, response.user.clone());
            tracing::info!(user_id = ?response.user.as_ref().map(|u| u.id), "signed in");
        }
        Ok(response)
    }

    pub fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        fetch(self.pipeline, endpoints::auth::REGISTER.spec().json(request))
    }

    /// Tells the server, then clears the local session whatever it answered.
    pub fn logout(&self) -> Result<(), ApiError> {
        let result = endpoints::auth::LOGOUT
            .spec()
            .build()
            .map_err(ApiError::from)
            .and_then(|spec| self.pipeline.execute(&spec));
        self.store().clear();
        result.map(|_| ())
    }

    /// `true` only when the server confirms `valid: true`. Any failure,
    /// including an unreachable server, reads as `false`.
    pub fn verify_token(&self) -> bool {
        match fetch::<T, Value>(self.pipeline, endpoints::auth::VERIFY.spec()) {
            Ok(body) => body.get("valid") == Some(&Value::Bool(true)),
            Err(err) => {
                tracing::debug!(error = %err, "token verification failed");
                false
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.store().token().is_some()
    }

    pub fn current_user(&self) -> Option<UserInfo> {
        self.store().user_info()
    }

    fn store(&self) -> &Arc<dyn TokenStore> {
        self.pipeline.store()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use crate::http::{HttpRequest, HttpResponse};
    use crate::pipeline::RequestPipeline;
    use crate::session::MemoryTokenStore;
    use crate::transport::{Transport, TransportError};

    use super::TrackerClient;

    /// Answers with queued responses and records every request.
    #[derive(Default)]
    pub struct Recorder {
        responses: Mutex<VecDeque<HttpResponse>>,
        pub sent: Mutex<Vec<HttpRequest>>,
    }

    impl Recorder {
        pub fn push(&self, status: u16, body: &str) {
            self.responses
                .lock()
                .unwrap()
                .push_back(HttpResponse::json(status, body));
        }

        pub fn push_response(&self, response: HttpResponse) {
            self.responses.lock().unwrap().push_back(response);
        }

        pub fn last(&self) -> HttpRequest {
            self.sent.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl Transport for Recorder {
        fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            self.sent.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| TransportError::Connection("no scripted response".to_string()))
        }
    }

    pub fn client(token: Option<&str>) -> (TrackerClient<Arc<Recorder>>, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let store = Arc::new(match token {
            Some(token) => MemoryTokenStore::with_token(token),
            None => MemoryTokenStore::new(),
        });
        let pipeline = RequestPipeline::new("http://tracker.test/api", recorder.clone(), store);
        (TrackerClient::new(pipeline), recorder)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::fmt::MakeWriter;

    use super::testing::client;
    use crate::http::HttpMethod;
    use crate::types::UserType;

    #[test]
    fn login_stores_token_and_user() {
        let (client, transport) = client(None);
        transport.push(
            200,
            r#"{"success":true,"message":"Login successful","token":"jwt-1",
                "user":{"id":9,"firstName":"Ana","lastName":"R","email":"ana@example.com","userType":"STUDENT"}}"#,
        );

        let response = client.auth().login("ana@example.com", "secret").unwrap();
        assert!(response.success);
        assert!(client.auth().is_authenticated());
        assert_eq!(client.pipeline().store().token().as_deref(), Some("jwt-1"));
        assert_eq!(client.auth().current_user().unwrap().user_type, UserType::Student);

        let sent = transport.last();
        assert_eq!(sent.method, HttpMethod::Post);
        assert_eq!(sent.url, "http://tracker.test/api/auth/login");
        assert!(sent.header("Authorization").is_none());
    }

    /// Collects formatted log lines in memory.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn login_logs_user_id_not_credentials() {
        let (client, transport) = client(None);
        transport.push(
            200,
            r#"{"success":true,"token":"jwt-secret",
                "user":{"id":9,"email":"ana@example.com","userType":"STUDENT"}}"#,
        );

        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(captured.clone())
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            client.auth().login("ana@example.com", "hunter2").unwrap();
        });

        let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("signed in"), "{logs}");
        assert!(logs.contains("user_id=Some(9)"), "{logs}");
        assert!(!logs.contains("ana@example.com"), "{logs}");
        assert!(!logs.contains("hunter2"), "{logs}");
        assert!(!logs.contains("jwt-secret"), "{logs}");
    }

    #[test]
    fn failed_login_leaves_store_empty() {
        let (client, transport) = client(None);
        transport.push(401, r#"{"success":false,"message":"Invalid email or password"}"#);

        let err = client.auth().login("ana@example.com", "wrong").unwrap_err();
        assert_eq!(err.message(), "Invalid email or password");
        assert!(!client.auth().is_authenticated());
    }

    #[test]
    fn login_without_token_does_not_store() {
        let (client, transport) = client(None);
        transport.push(200, r#"{"success":false,"message":"Account disabled"}"#);
        let response = client.auth().login("a@b.c", "x").unwrap();
        assert!(!response.success);
        assert!(!client.auth().is_authenticated());
    }

    #[test]
    fn logout_clears_even_when_server_fails() {
        let (client, transport) = client(Some("tok"));
        transport.push(500, r#"{"message":"boom"}"#);

        let err = client.auth().logout().unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(!client.auth().is_authenticated());
        assert_eq!(transport.last().header("Authorization"), Some("Bearer tok"));
    }

    #[test]
    fn verify_token_reads_valid_flag() {
        let (client, transport) = client(Some("tok"));
        transport.push(200, r#"{"valid":true}"#);
        transport.push(200, r#"{"valid":"yes"}"#);
        assert!(client.auth().verify_token());
        assert!(!client.auth().verify_token());
    }

    #[test]
    fn verify_token_is_false_when_unreachable() {
        let (client, _transport) = client(Some("tok"));
        assert!(!client.auth().verify_token());
    }
}
