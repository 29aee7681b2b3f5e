//! In-memory TrackerPro backend for exercising the client end to end.
//!
//! Routes live under `/api`. Everything except login and register needs an
//! `Authorization: Bearer <token>` header carrying a token issued by login
//! or register; a missing or unknown token is a 401 and a token whose role
//! may not use the route is a 403, both with a `{success, message}` body.

mod admin;
mod auth;
mod hr;
pub mod model;
mod student;

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Json, Router,
};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};

pub use model::{Role, Store};

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::seeded()));
    let api = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/verify", get(auth::verify))
        .route("/dashboard/stats", get(admin::dashboard_stats))
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route(
            "/users/{id}",
            get(admin::get_user)
                .put(admin::update_user)
                .delete(admin::delete_user),
        )
        .route("/users/{id}/toggle-status", patch(admin::toggle_user))
        .route("/registrations", get(admin::list_registrations))
        .route("/registrations/export", get(admin::export_registrations))
        .route(
            "/registrations/delete-multiple",
            post(admin::delete_registrations),
        )
        .route(
            "/registrations/{id}",
            get(admin::get_registration).delete(admin::delete_registration),
        )
        .route(
            "/internships",
            get(admin::list_internships).post(admin::create_internship),
        )
        .route("/internships/search", get(admin::search_internships))
        .route(
            "/internships/{id}",
            get(admin::get_internship)
                .put(admin::update_internship)
                .delete(admin::delete_internship),
        )
        .route(
            "/internships/{id}/toggle-status",
            patch(admin::toggle_internship),
        )
        .route("/hr/applications", get(hr::list_applications))
        .route("/hr/applications/bulk-update", put(hr::bulk_update))
        .route("/hr/applications/shortlisted", get(hr::shortlisted))
        .route("/hr/applications/{id}", get(hr::get_application))
        .route("/hr/applications/{id}/status", put(hr::update_status))
        .route("/hr/applications/{id}/notes", put(hr::update_notes))
        .route("/hr/dashboard/stats", get(hr::dashboard_stats))
        .route("/student/internships", get(student::available_internships))
        .route("/student/internships/{id}", get(student::get_internship))
        .route(
            "/student/internships/{id}/check-application",
            get(student::check_application),
        )
        .route(
            "/student/applications",
            get(student::my_applications).post(student::apply),
        )
        .route(
            "/student/applications/{id}",
            get(student::get_application).delete(student::withdraw),
        )
        .route("/student/dashboard/stats", get(student::dashboard_stats))
        .route("/student/notifications", get(student::notifications))
        .route("/student/notifications/read-all", patch(student::mark_all_read))
        .route("/student/notifications/{id}/read", patch(student::mark_read));

    Router::new().nest("/api", api).with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// A handler failure rendered as `{ "success": false, "message": ... }`.
#[derive(Debug)]
pub struct Failure {
    status: StatusCode,
    message: String,
}

impl Failure {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(what: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("{what} not found"))
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        tracing::debug!(status = %self.status, message = %self.message, "request rejected");
        let body = json!({ "success": false, "message": self.message });
        (self.status, Json(body)).into_response()
    }
}

/// The account behind the request's bearer token.
#[derive(Debug, Clone)]
pub struct Caller {
    pub id: u64,
    pub role: Role,
    pub token: String,
}

impl Caller {
    pub fn require(&self, roles: &[Role]) -> Result<(), Failure> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(Failure::new(StatusCode::FORBIDDEN, "Access denied"))
        }
    }
}

impl FromRequestParts<Db> for Caller {
    type Rejection = Failure;

    async fn from_request_parts(parts: &mut Parts, db: &Db) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Failure::unauthorized("Authentication required"))?;

        let store = db.read().await;
        let account = store
            .tokens
            .get(token)
            .and_then(|id| store.accounts.get(id))
            .ok_or_else(|| Failure::unauthorized("Invalid or expired token"))?;
        if !account.is_active {
            return Err(Failure::unauthorized("Account is disabled"));
        }
        Ok(Caller {
            id: account.id,
            role: account.role,
            token: token.to_string(),
        })
    }
}
