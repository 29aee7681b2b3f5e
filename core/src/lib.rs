//! Synchronous API client core for the TrackerPro internship tracker.
//!
//! # Overview
//! Every call to the backend goes through one `RequestPipeline`: a
//! `RequestSpec` names the endpoint template, parameters, body and whether
//! the bearer token is sent; the pipeline resolves it into a plain-data
//! `HttpRequest`, hands that to a `Transport`, and classifies the
//! `HttpResponse` into a decoded value or an `ApiError`.
//!
//! # Design
//! - The network round-trip sits behind the `Transport` trait. `UreqTransport`
//!   (default `ureq` feature) is the blocking implementation; tests script
//!   their own.
//! - The bearer token lives in a `TokenStore`. A 401/403 response clears it
//!   and emits `SessionInvalidated` to each registered `SessionListener`,
//!   after which the error is still returned to the caller.
//! - `endpoints` lists every backend route as a const table; `api` wraps the
//!   rows in typed accessors grouped by panel (`auth`, `admin`, `hr`,
//!   `student`).
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod pipeline;
pub mod request;
pub mod session;
pub mod transport;
pub mod types;

pub use api::TrackerClient;
pub use config::ClientConfig;
pub use error::{ApiError, HttpError, NetworkError, SpecError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use pipeline::{Decoded, RequestPipeline};
pub use request::{RequestSpec, ResponseKind};
pub use session::{
    FileTokenStore, MemoryTokenStore, Navigator, RedirectToLogin, SessionInvalidated,
    SessionListener, TokenStore,
};
pub use transport::{Transport, TransportError};
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
