//! Admin panel accessors: accounts, student registrations, internship
//! postings, dashboard counters and complaints.

use serde::Serialize;
use serde_json::json;

use crate::endpoints::{complaints, dashboard, internships, registrations, users};
use crate::error::ApiError;
use crate::pipeline::RequestPipeline;
use crate::transport::Transport;
use crate::types::{
    ApiResponse, CareerPost, CareerPostRequest, CreateUserRequest, DashboardStats, HrFacultyUser,
    InternshipFilter, MessageResponse, Student,
};

use super::fetch;

pub struct AdminApi<'a, T> {
    pipeline: &'a RequestPipeline<T>,
}

impl<'a, T: Transport> AdminApi<'a, T> {
    pub(crate) fn new(pipeline: &'a RequestPipeline<T>) -> Self {
        Self { pipeline }
    }

    pub fn users(&self) -> Users<'a, T> {
        Users {
            pipeline: self.pipeline,
        }
    }

    pub fn registrations(&self) -> Registrations<'a, T> {
        Registrations {
            pipeline: self.pipeline,
        }
    }

    pub fn internships(&self) -> Internships<'a, T> {
        Internships {
            pipeline: self.pipeline,
        }
    }

    pub fn dashboard(&self) -> Dashboard<'a, T> {
        Dashboard {
            pipeline: self.pipeline,
        }
    }

    pub fn complaints(&self) -> Complaints<'a, T> {
        Complaints {
            pipeline: self.pipeline,
        }
    }
}

/// HR and Faculty accounts.
pub struct Users<'a, T> {
    pipeline: &'a RequestPipeline<T>,
}

impl<T: Transport> Users<'_, T> {
    /// `role` of `None` or `"all"` lists every account.
    pub fn list(&self, role: Option<&str>) -> Result<ApiResponse<Vec<HrFacultyUser>>, ApiError> {
        let role = role.filter(|r| !r.eq_ignore_ascii_case("all"));
        fetch(self.pipeline, users::LIST.spec().query_opt("role", role))
    }

    pub fn get(&self, id: u64) -> Result<ApiResponse<HrFacultyUser>, ApiError> {
        fetch(self.pipeline, users::GET.spec().path_param("id", id))
    }

    pub fn create(&self, user: &CreateUserRequest) -> Result<ApiResponse<HrFacultyUser>, ApiError> {
        fetch(self.pipeline, users::CREATE.spec().json(user))
    }

    pub fn update(
        &self,
        id: u64,
        user: &CreateUserRequest,
    ) -> Result<ApiResponse<HrFacultyUser>, ApiError> {
        fetch(self.pipeline, users::UPDATE.spec().path_param("id", id).json(user))
    }

    pub fn delete(&self, id: u64) -> Result<MessageResponse, ApiError> {
        fetch(self.pipeline, users::DELETE.spec().path_param("id", id))
    }

    pub fn toggle_status(&self, id: u64, is_enabled: bool) -> Result<MessageResponse, ApiError> {
        fetch(
            self.pipeline,
            users::TOGGLE_STATUS
                .spec()
                .path_param("id", id)
                .json(&json!({ "isEnabled": is_enabled })),
        )
    }
}

/// Student registrations.
pub struct Registrations<'a, T> {
    pipeline: &'a RequestPipeline<T>,
}

impl<T: Transport> Registrations<'_, T> {
    pub fn list(&self, search: Option<&str>) -> Result<ApiResponse<Vec<Student>>, ApiError> {
        fetch(
            self.pipeline,
            registrations::LIST.spec().query_opt("search", search),
        )
    }

    pub fn get(&self, id: u64) -> Result<ApiResponse<Student>, ApiError> {
        fetch(self.pipeline, registrations::GET.spec().path_param("id", id))
    }

    pub fn delete(&self, id: u64) -> Result<MessageResponse, ApiError> {
        fetch(
            self.pipeline,
            registrations::DELETE.spec().path_param("id", id),
        )
    }

    pub fn delete_multiple(&self, ids: &[u64]) -> Result<MessageResponse, ApiError> {
        fetch(
            self.pipeline,
            registrations::DELETE_MULTIPLE
                .spec()
                .json(&json!({ "ids": ids })),
        )
    }

    /// The registration list as CSV bytes.
    pub fn export_csv(&self) -> Result<Vec<u8>, ApiError> {
        let spec = registrations::EXPORT.spec().build()?;
        Ok(self.pipeline.execute(&spec)?.into_bytes())
    }
}

/// Internship postings.
pub struct Internships<'a, T> {
    pipeline: &'a RequestPipeline<T>,
}

impl<T: Transport> Internships<'_, T> {
    pub fn list(&self, filter: &InternshipFilter) -> Result<ApiResponse<Vec<CareerPost>>, ApiError> {
        fetch(self.pipeline, internships::LIST.spec().query_object(filter))
    }

    pub fn get(&self, id: u64) -> Result<ApiResponse<CareerPost>, ApiError> {
        fetch(self.pipeline, internships::GET.spec().path_param("id", id))
    }

    pub fn create(&self, post: &CareerPostRequest) -> Result<ApiResponse<CareerPost>, ApiError> {
        fetch(self.pipeline, internships::CREATE.spec().json(post))
    }

    pub fn update(
        &self,
        id: u64,
        post: &CareerPostRequest,
    ) -> Result<ApiResponse<CareerPost>, ApiError> {
        fetch(
            self.pipeline,
            internships::UPDATE.spec().path_param("id", id).json(post),
        )
    }

    pub fn delete(&self, id: u64) -> Result<MessageResponse, ApiError> {
        fetch(self.pipeline, internships::DELETE.spec().path_param("id", id))
    }

    pub fn toggle_status(&self, id: u64, status: &str) -> Result<MessageResponse, ApiError> {
        fetch(
            self.pipeline,
            internships::TOGGLE_STATUS
                .spec()
                .path_param("id", id)
                .json(&json!({ "status": status })),
        )
    }

    pub fn search(&self, term: &str) -> Result<ApiResponse<Vec<CareerPost>>, ApiError> {
        fetch(self.pipeline, internships::SEARCH.spec().query("term", term))
    }
}

pub struct Dashboard<'a, T> {
    pipeline: &'a RequestPipeline<T>,
}

impl<T: Transport> Dashboard<'_, T> {
    pub fn stats(&self) -> Result<DashboardStats, ApiError> {
        fetch(self.pipeline, dashboard::STATS.spec())
    }
}

/// Complaints carry free-form payloads; callers pass their own shapes.
pub struct Complaints<'a, T> {
    pipeline: &'a RequestPipeline<T>,
}

impl<T: Transport> Complaints<'_, T> {
    pub fn list<F: Serialize + ?Sized>(&self, filters: &F) -> Result<MessageResponse, ApiError> {
        fetch(self.pipeline, complaints::LIST.spec().query_object(filters))
    }

    pub fn get(&self, id: u64) -> Result<MessageResponse, ApiError> {
        fetch(self.pipeline, complaints::GET.spec().path_param("id", id))
    }

    pub fn create<B: Serialize + ?Sized>(&self, complaint: &B) -> Result<MessageResponse, ApiError> {
        fetch(self.pipeline, complaints::CREATE.spec().json(complaint))
    }

    pub fn update<B: Serialize + ?Sized>(
        &self,
        id: u64,
        complaint: &B,
    ) -> Result<MessageResponse, ApiError> {
        fetch(
            self.pipeline,
            complaints::UPDATE.spec().path_param("id", id).json(complaint),
        )
    }
}
