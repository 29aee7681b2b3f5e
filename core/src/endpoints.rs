//! Endpoint tables for every TrackerPro resource.
//!
//! Each constant names one backend operation: its template, method, how
//! the response is decoded and whether the bearer token is sent. The typed
//! accessors in `api` start every request from one of these rows.

use crate::http::HttpMethod;
use crate::request::{RequestSpec, RequestSpecBuilder, ResponseKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub method: HttpMethod,
    pub template: &'static str,
    pub response: ResponseKind,
    pub requires_auth: bool,
}

impl Endpoint {
    pub const fn new(method: HttpMethod, template: &'static str) -> Self {
        Self {
            method,
            template,
            response: ResponseKind::Json,
            requires_auth: true,
        }
    }

    /// Sent without a bearer token.
    pub const fn public(self) -> Self {
        Self {
            requires_auth: false,
            ..self
        }
    }

    /// Decoded as raw bytes.
    pub const fn blob(self) -> Self {
        Self {
            response: ResponseKind::Blob,
            ..self
        }
    }

    /// A builder preloaded from this row.
    pub fn spec(&self) -> RequestSpecBuilder {
        RequestSpec::builder(self.method, self.template)
            .requires_auth(self.requires_auth)
            .response_kind(self.response)
    }
}

const fn get(template: &'static str) -> Endpoint {
    Endpoint::new(HttpMethod::Get, template)
}

const fn post(template: &'static str) -> Endpoint {
    Endpoint::new(HttpMethod::Post, template)
}

const fn put(template: &'static str) -> Endpoint {
    Endpoint::new(HttpMethod::Put, template)
}

const fn patch(template: &'static str) -> Endpoint {
    Endpoint::new(HttpMethod::Patch, template)
}

const fn delete(template: &'static str) -> Endpoint {
    Endpoint::new(HttpMethod::Delete, template)
}

pub mod auth {
    use super::*;

    pub const LOGIN: Endpoint = post("/auth/login").public();
    pub const REGISTER: Endpoint = post("/auth/register").public();
    pub const LOGOUT: Endpoint = post("/auth/logout");
    pub const VERIFY: Endpoint = get("/auth/verify");
}

pub mod users {
    use super::*;

    pub const LIST: Endpoint = get("/users");
    pub const GET: Endpoint = get("/users/:id");
    pub const CREATE: Endpoint = post("/users");
    pub const UPDATE: Endpoint = put("/users/:id");
    pub const DELETE: Endpoint = delete("/users/:id");
    pub const TOGGLE_STATUS: Endpoint = patch("/users/:id/toggle-status");
}

pub mod registrations {
    use super::*;

    pub const LIST: Endpoint = get("/registrations");
    pub const GET: Endpoint = get("/registrations/:id");
    pub const DELETE: Endpoint = delete("/registrations/:id");
    pub const DELETE_MULTIPLE: Endpoint = post("/registrations/delete-multiple");
    pub const EXPORT: Endpoint = get("/registrations/export").blob();
}

pub mod internships {
    use super::*;

    pub const LIST: Endpoint = get("/internships");
    pub const GET: Endpoint = get("/internships/:id");
    pub const CREATE: Endpoint = post("/internships");
    pub const UPDATE: Endpoint = put("/internships/:id");
    pub const DELETE: Endpoint = delete("/internships/:id");
    pub const TOGGLE_STATUS: Endpoint = patch("/internships/:id/toggle-status");
    pub const SEARCH: Endpoint = get("/internships/search");
}

pub mod dashboard {
    use super::*;

    pub const STATS: Endpoint = get("/dashboard/stats");
}

pub mod complaints {
    use super::*;

    pub const LIST: Endpoint = get("/complaints");
    pub const GET: Endpoint = get("/complaints/:id");
    pub const CREATE: Endpoint = post("/complaints");
    pub const UPDATE: Endpoint = put("/complaints/:id");
}

pub mod hr {
    use super::*;

    pub const APPLICATIONS: Endpoint = get("/hr/applications");
    pub const APPLICATION: Endpoint = get("/hr/applications/:id");
    pub const APPLICATION_STATUS: Endpoint = put("/hr/applications/:id/status");
    pub const APPLICATION_NOTES: Endpoint = put("/hr/applications/:id/notes");
    pub const BULK_UPDATE: Endpoint = put("/hr/applications/bulk-update");
    pub const SHORTLISTED: Endpoint = get("/hr/applications/shortlisted");
    pub const DASHBOARD_STATS: Endpoint = get("/hr/dashboard/stats");
    pub const INTERVIEWS: Endpoint = get("/hr/interviews");
    pub const SCHEDULE_INTERVIEW: Endpoint = post("/hr/interviews");
    pub const UPDATE_INTERVIEW: Endpoint = put("/hr/interviews/:id");
    pub const HIRED: Endpoint = get("/hr/hired");
    pub const CREATE_HIRED: Endpoint = post("/hr/hired");
    pub const UPDATE_HIRED: Endpoint = put("/hr/hired/:id");
}

pub mod student {
    use super::*;

    pub const PROFILE: Endpoint = get("/student/profile");
    pub const UPDATE_PROFILE: Endpoint = put("/student/profile");
    pub const INTERNSHIPS: Endpoint = get("/student/internships");
    pub const INTERNSHIP: Endpoint = get("/student/internships/:id");
    pub const CHECK_APPLICATION: Endpoint = get("/student/internships/:id/check-application");
    pub const APPLY: Endpoint = post("/student/applications");
    pub const APPLICATIONS: Endpoint = get("/student/applications");
    pub const APPLICATION: Endpoint = get("/student/applications/:id");
    pub const WITHDRAW: Endpoint = delete("/student/applications/:id");
    pub const DASHBOARD_STATS: Endpoint = get("/student/dashboard/stats");
    pub const NOTIFICATIONS: Endpoint = get("/student/notifications");
    pub const MARK_READ: Endpoint = patch("/student/notifications/:id/read");
    pub const MARK_ALL_READ: Endpoint = patch("/student/notifications/read-all");
}

/// Every row, for table-wide checks.
pub fn all() -> Vec<Endpoint> {
    vec![
        auth::LOGIN,
        auth::REGISTER,
        auth::LOGOUT,
        auth::VERIFY,
        users::LIST,
        users::GET,
        users::CREATE,
        users::UPDATE,
        users::DELETE,
        users::TOGGLE_STATUS,
        registrations::LIST,
        registrations::GET,
        registrations::DELETE,
        registrations::DELETE_MULTIPLE,
        registrations::EXPORT,
        internships::LIST,
        internships::GET,
        internships::CREATE,
        internships::UPDATE,
        internships::DELETE,
        internships::TOGGLE_STATUS,
        internships::SEARCH,
        dashboard::STATS,
        complaints::LIST,
        complaints::GET,
        complaints::CREATE,
        complaints::UPDATE,
        hr::APPLICATIONS,
        hr::APPLICATION,
        hr::APPLICATION_STATUS,
        hr::APPLICATION_NOTES,
        hr::BULK_UPDATE,
        hr::SHORTLISTED,
        hr::DASHBOARD_STATS,
        hr::INTERVIEWS,
        hr::SCHEDULE_INTERVIEW,
        hr::UPDATE_INTERVIEW,
        hr::HIRED,
        hr::CREATE_HIRED,
        hr::UPDATE_HIRED,
        student::PROFILE,
        student::UPDATE_PROFILE,
        student::INTERNSHIPS,
        student::INTERNSHIP,
        student::CHECK_APPLICATION,
        student::APPLY,
        student::APPLICATIONS,
        student::APPLICATION,
        student::WITHDRAW,
        student::DASHBOARD_STATS,
        student::NOTIFICATIONS,
        student::MARK_READ,
        student::MARK_ALL_READ,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::resolve_url;
    use crate::request::{parse_template, Segment};
    use std::collections::HashSet;

    #[test]
    fn method_and_template_pairs_are_unique() {
        let rows = all();
        let unique: HashSet<_> = rows.iter().map(|e| (e.method, e.template)).collect();
        assert_eq!(unique.len(), rows.len());
    }

    #[test]
    fn only_login_and_register_are_public() {
        let public: Vec<_> = all()
            .into_iter()
            .filter(|e| !e.requires_auth)
            .map(|e| e.template)
            .collect();
        assert_eq!(public, vec!["/auth/login", "/auth/register"]);
    }

    #[test]
    fn export_is_the_only_blob() {
        let blobs: Vec<_> = all()
            .into_iter()
            .filter(|e| e.response == ResponseKind::Blob)
            .collect();
        assert_eq!(blobs, vec![registrations::EXPORT]);
    }

    #[test]
    fn only_id_placeholders_are_used() {
        for endpoint in all() {
            for segment in parse_template(endpoint.template) {
                if let Segment::Placeholder(name) = segment {
                    assert_eq!(name, "id", "{}", endpoint.template);
                }
            }
        }
    }

    #[test]
    fn every_row_resolves_with_an_id() {
        for endpoint in all() {
            let spec = endpoint.spec().path_param("id", 5).build().unwrap();
            let url = resolve_url("http://h/api", &spec);
            assert!(!url.contains(":id"), "{url}");
            assert_eq!(spec.method(), endpoint.method);
            assert_eq!(spec.requires_auth(), endpoint.requires_auth);
        }
    }

    #[test]
    fn templated_rows_fail_without_an_id() {
        assert!(users::GET.spec().build().is_err());
        assert!(users::LIST.spec().build().is_ok());
    }
}
