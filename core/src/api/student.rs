//! Student panel accessors.

use serde::Serialize;

use crate::endpoints::student;
use crate::error::ApiError;
use crate::pipeline::RequestPipeline;
use crate::transport::Transport;
use crate::types::{
    ApiResponse, Application, ApplicationCheck, ApplicationRequest, ApplicationStatus,
    CareerPost, MessageResponse, Notification, StudentDashboardStats, StudentProfileRequest,
};

use super::fetch;

pub struct StudentApi<'a, T> {
    pipeline: &'a RequestPipeline<T>,
}

impl<'a, T: Transport> StudentApi<'a, T> {
    pub(crate) fn new(pipeline: &'a RequestPipeline<T>) -> Self {
        Self { pipeline }
    }

    pub fn profile(&self) -> Profile<'a, T> {
        Profile {
            pipeline: self.pipeline,
        }
    }

    pub fn internships(&self) -> Internships<'a, T> {
        Internships {
            pipeline: self.pipeline,
        }
    }

    pub fn applications(&self) -> Applications<'a, T> {
        Applications {
            pipeline: self.pipeline,
        }
    }

    pub fn dashboard(&self) -> Dashboard<'a, T> {
        Dashboard {
            pipeline: self.pipeline,
        }
    }

    pub fn notifications(&self) -> Notifications<'a, T> {
        Notifications {
            pipeline: self.pipeline,
        }
    }
}

pub struct Profile<'a, T> {
    pipeline: &'a RequestPipeline<T>,
}

impl<T: Transport> Profile<'_, T> {
    pub fn get(&self) -> Result<MessageResponse, ApiError> {
        fetch(self.pipeline, student::PROFILE.spec())
    }

    pub fn update(&self, profile: &StudentProfileRequest) -> Result<MessageResponse, ApiError> {
        fetch(self.pipeline, student::UPDATE_PROFILE.spec().json(profile))
    }
}

pub struct Internships<'a, T> {
    pipeline: &'a RequestPipeline<T>,
}

impl<T: Transport> Internships<'_, T> {
    /// Open postings. `filters` is flattened into the query string.
    pub fn available<F: Serialize + ?Sized>(
        &self,
        filters: &F,
    ) -> Result<ApiResponse<Vec<CareerPost>>, ApiError> {
        fetch(self.pipeline, student::INTERNSHIPS.spec().query_object(filters))
    }

    pub fn get(&self, id: u64) -> Result<ApiResponse<CareerPost>, ApiError> {
        fetch(self.pipeline, student::INTERNSHIP.spec().path_param("id", id))
    }

    pub fn check_applied(&self, id: u64) -> Result<ApplicationCheck, ApiError> {
        fetch(
            self.pipeline,
            student::CHECK_APPLICATION.spec().path_param("id", id),
        )
    }
}

pub struct Applications<'a, T> {
    pipeline: &'a RequestPipeline<T>,
}

impl<T: Transport> Applications<'_, T> {
    pub fn apply(&self, request: &ApplicationRequest) -> Result<ApiResponse<Application>, ApiError> {
        fetch(self.pipeline, student::APPLY.spec().json(request))
    }

    pub fn mine(
        &self,
        status: Option<ApplicationStatus>,
    ) -> Result<ApiResponse<Vec<Application>>, ApiError> {
        fetch(
            self.pipeline,
            student::APPLICATIONS
                .spec()
                .query_opt("status", status.map(ApplicationStatus::as_str)),
        )
    }

    pub fn get(&self, id: u64) -> Result<ApiResponse<Application>, ApiError> {
        fetch(self.pipeline, student::APPLICATION.spec().path_param("id", id))
    }

    pub fn withdraw(&self, id: u64) -> Result<MessageResponse, ApiError> {
        fetch(self.pipeline, student::WITHDRAW.spec().path_param("id", id))
    }
}

pub struct Dashboard<'a, T> {
    pipeline: &'a RequestPipeline<T>,
}

impl<T: Transport> Dashboard<'_, T> {
    pub fn stats(&self) -> Result<ApiResponse<StudentDashboardStats>, ApiError> {
        fetch(self.pipeline, student::DASHBOARD_STATS.spec())
    }
}

pub struct Notifications<'a, T> {
    pipeline: &'a RequestPipeline<T>,
}

impl<T: Transport> Notifications<'_, T> {
    /// `unreadOnly` is always sent, `false` included.
    pub fn list(&self, unread_only: bool) -> Result<ApiResponse<Vec<Notification>>, ApiError> {
        fetch(
            self.pipeline,
            student::NOTIFICATIONS.spec().query("unreadOnly", unread_only),
        )
    }

    pub fn mark_read(&self, id: u64) -> Result<MessageResponse, ApiError> {
        fetch(self.pipeline, student::MARK_READ.spec().path_param("id", id))
    }

    pub fn mark_all_read(&self) -> Result<MessageResponse, ApiError> {
        fetch(self.pipeline, student::MARK_ALL_READ.spec())
    }
}
