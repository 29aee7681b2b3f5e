//! HR panel accessors: application review, dashboard, interviews and hires.

use serde::Serialize;
use serde_json::json;

use crate::endpoints::hr;
use crate::error::ApiError;
use crate::pipeline::RequestPipeline;
use crate::transport::Transport;
use crate::types::{
    ApiResponse, ApplicationFilter, ApplicationStatus, BulkUpdateRequest, HrApplication,
    HrDashboardStats, MessageResponse, UpdateStatusRequest,
};

use super::fetch;

pub struct HrApi<'a, T> {
    pipeline: &'a RequestPipeline<T>,
}

impl<'a, T: Transport> HrApi<'a, T> {
    pub(crate) fn new(pipeline: &'a RequestPipeline<T>) -> Self {
        Self { pipeline }
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

    pub fn interviews(&self) -> Interviews<'a, T> {
        Interviews {
            pipeline: self.pipeline,
        }
    }

    pub fn hired(&self) -> Hired<'a, T> {
        Hired {
            pipeline: self.pipeline,
        }
    }
}

pub struct Applications<'a, T> {
    pipeline: &'a RequestPipeline<T>,
}

impl<T: Transport> Applications<'_, T> {
    pub fn list(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<ApiResponse<Vec<HrApplication>>, ApiError> {
        fetch(self.pipeline, hr::APPLICATIONS.spec().query_object(filter))
    }

    pub fn get(&self, id: u64) -> Result<ApiResponse<HrApplication>, ApiError> {
        fetch(self.pipeline, hr::APPLICATION.spec().path_param("id", id))
    }

    /// `notes` of `None` sends `hrNotes: null`, leaving stored notes as-is.
    pub fn update_status(
        &self,
        id: u64,
        status: ApplicationStatus,
        notes: Option<&str>,
    ) -> Result<ApiResponse<HrApplication>, ApiError> {
        let body = UpdateStatusRequest {
            status,
            hr_notes: notes,
        };
        fetch(
            self.pipeline,
            hr::APPLICATION_STATUS
                .spec()
                .path_param("id", id)
                .json(&body),
        )
    }

    pub fn update_notes(&self, id: u64, notes: &str) -> Result<MessageResponse, ApiError> {
        fetch(
            self.pipeline,
            hr::APPLICATION_NOTES
                .spec()
                .path_param("id", id)
                .json(&json!({ "hrNotes": notes })),
        )
    }

    pub fn bulk_update(
        &self,
        ids: &[u64],
        status: ApplicationStatus,
    ) -> Result<MessageResponse, ApiError> {
        let body = BulkUpdateRequest {
            application_ids: ids,
            status,
        };
        fetch(self.pipeline, hr::BULK_UPDATE.spec().json(&body))
    }

    /// Shortlisted candidates, optionally narrowed by internship type.
    pub fn shortlisted(
        &self,
        internship_type: Option<&str>,
    ) -> Result<ApiResponse<Vec<HrApplication>>, ApiError> {
        fetch(
            self.pipeline,
            hr::SHORTLISTED.spec().query_opt("type", internship_type),
        )
    }
}

pub struct Dashboard<'a, T> {
    pipeline: &'a RequestPipeline<T>,
}

impl<T: Transport> Dashboard<'_, T> {
    pub fn stats(&self) -> Result<ApiResponse<HrDashboardStats>, ApiError> {
        fetch(self.pipeline, hr::DASHBOARD_STATS.spec())
    }
}

pub struct Interviews<'a, T> {
    pipeline: &'a RequestPipeline<T>,
}

impl<T: Transport> Interviews<'_, T> {
    pub fn schedule<B: Serialize + ?Sized>(&self, interview: &B) -> Result<MessageResponse, ApiError> {
        fetch(self.pipeline, hr::SCHEDULE_INTERVIEW.spec().json(interview))
    }

    /// `status` is `upcoming`, `past` or `None` for all.
    pub fn list(&self, status: Option<&str>) -> Result<MessageResponse, ApiError> {
        fetch(
            self.pipeline,
            hr::INTERVIEWS.spec().query_opt("status", status),
        )
    }

    pub fn update<B: Serialize + ?Sized>(
        &self,
        id: u64,
        interview: &B,
    ) -> Result<MessageResponse, ApiError> {
        fetch(
            self.pipeline,
            hr::UPDATE_INTERVIEW.spec().path_param("id", id).json(interview),
        )
    }
}

pub struct Hired<'a, T> {
    pipeline: &'a RequestPipeline<T>,
}

impl<T: Transport> Hired<'_, T> {
    pub fn create<B: Serialize + ?Sized>(&self, hire: &B) -> Result<MessageResponse, ApiError> {
        fetch(self.pipeline, hr::CREATE_HIRED.spec().json(hire))
    }

    pub fn list<F: Serialize + ?Sized>(&self, filters: &F) -> Result<MessageResponse, ApiError> {
        fetch(self.pipeline, hr::HIRED.spec().query_object(filters))
    }

    pub fn update<B: Serialize + ?Sized>(&self, id: u64, hire: &B) -> Result<MessageResponse, ApiError> {
        fetch(
            self.pipeline,
            hr::UPDATE_HIRED.spec().path_param("id", id).json(hire),
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::api::testing::client;
    use crate::http::{HttpMethod, WireBody};
    use crate::types::{ApplicationFilter, ApplicationStatus};
    use serde_json::json;

    #[test]
    fn list_applications_skips_unset_filters() {
        let (client, transport) = client(Some("t"));
        transport.push(200, r#"{"success":true,"data":[],"total":0}"#);
        let filter = ApplicationFilter {
            status: Some(ApplicationStatus::UnderReview),
            internship_id: Some(3),
            ..Default::default()
        };
        client.hr().applications().list(&filter).unwrap();
        assert_eq!(
            transport.last().url,
            "http://tracker.test/api/hr/applications?internshipId=3&status=Under+Review"
        );
    }

    #[test]
    fn update_status_sends_status_and_notes() {
        let (client, transport) = client(Some("t"));
        transport.push(
            200,
            r#"{"success":true,"data":{"id":17,"status":"Shortlisted","hrNotes":"strong"}}"#,
        );
        let response = client
            .hr()
            .applications()
            .update_status(17, ApplicationStatus::Shortlisted, Some("strong"))
            .unwrap();
        assert_eq!(response.data.unwrap().status, ApplicationStatus::Shortlisted);

        let sent = transport.last();
        assert_eq!(sent.method, HttpMethod::Put);
        assert_eq!(sent.url, "http://tracker.test/api/hr/applications/17/status");
        let body: serde_json::Value =
            serde_json::from_slice(sent.body.as_ref().unwrap().as_bytes()).unwrap();
        assert_eq!(body, json!({ "status": "Shortlisted", "hrNotes": "strong" }));
    }

    #[test]
    fn bulk_update_uses_put() {
        let (client, transport) = client(Some("t"));
        transport.push(200, r#"{"success":true,"message":"2 applications updated"}"#);
        client
            .hr()
            .applications()
            .bulk_update(&[4, 5], ApplicationStatus::Rejected)
            .unwrap();
        let sent = transport.last();
        assert_eq!(sent.method, HttpMethod::Put);
        assert_eq!(
            sent.body,
            Some(WireBody::Json(
                r#"{"applicationIds":[4,5],"status":"Rejected"}"#.to_string()
            ))
        );
    }

    #[test]
    fn dashboard_stats_in_envelope() {
        let (client, transport) = client(Some("t"));
        transport.push(
            200,
            r#"{"success":true,"data":{"totalApplications":9,"pending":3,"byInternship":[
                {"internshipId":1,"internshipTitle":"Web","internshipCode":"W1","applicationCount":9}]}}"#,
        );
        let stats = client.hr().dashboard().stats().unwrap().data.unwrap();
        assert_eq!(stats.total_applications, 9);
        assert_eq!(stats.by_internship[0].internship_code, "W1");
    }

    #[test]
    fn interviews_filter_by_status() {
        let (client, transport) = client(Some("t"));
        transport.push(200, r#"{"success":true,"data":[]}"#);
        client.hr().interviews().list(Some("upcoming")).unwrap();
        assert_eq!(
            transport.last().url,
            "http://tracker.test/api/hr/interviews?status=upcoming"
        );
    }
}
