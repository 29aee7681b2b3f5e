//! Domain DTOs for the TrackerPro API.
//!
//! # Design
//! Field names follow the backend's camelCase JSON. Response types default
//! every field so a partially populated payload still decodes; request
//! types skip `None` fields so the server only sees what the caller set.
//! The mock-server crate defines its own copies; integration tests catch
//! schema drift between the two.

use serde::{Deserialize, Serialize};

/// The backend's common response wrapper. The pipeline never interprets
/// `success`; callers decide what a `false` means for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

/// An envelope with no payload of interest.
pub type MessageResponse = ApiResponse<serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserType {
    Student,
    Hr,
    Faculty,
    Admin,
}

/// The signed-in user, as returned by login and kept alongside the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: u64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    pub user_type: UserType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_no: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<UserInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub email: String,
    pub password: String,
    pub mobile_no: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Payload for creating or updating an HR/Faculty account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub email: String,
    /// Omitted on update to keep the current password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub mobile_no: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// `HR` or `FACULTY`.
    pub user_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HrFacultyUser {
    pub id: u64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub mobile_no: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A registered student, as listed under `/registrations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: u64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub mobile_no: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerPostRequest {
    pub code: String,
    pub title: String,
    /// Months.
    pub duration: u32,
    pub work_mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prerequisites: Option<String>,
    pub description: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerPost {
    pub id: u64,
    pub code: String,
    pub title: String,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub work_mode: Option<String>,
    #[serde(default)]
    pub prerequisites: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub status: String,
    #[serde(default)]
    pub applications_count: Option<u32>,
}

/// Query filters for the admin internship list.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternshipFilter {
    pub status: Option<String>,
    pub work_mode: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Pending,
    #[serde(rename = "Under Review")]
    UnderReview,
    Shortlisted,
    Interview,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::UnderReview => "Under Review",
            ApplicationStatus::Shortlisted => "Shortlisted",
            ApplicationStatus::Interview => "Interview",
            ApplicationStatus::Accepted => "Accepted",
            ApplicationStatus::Rejected => "Rejected",
        }
    }
}

/// Query filters for the HR application list.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationFilter {
    pub search: Option<String>,
    pub status: Option<ApplicationStatus>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub internship_id: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRequest {
    pub career_post_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_stipend: Option<String>,
}

/// A student's own application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: u64,
    pub career_post_id: u64,
    #[serde(default)]
    pub internship_title: Option<String>,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub applied_date: Option<String>,
    #[serde(default)]
    pub hr_notes: Option<String>,
}

/// Answer to "has the signed-in student applied to this posting?".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationCheck {
    pub success: bool,
    pub has_applied: bool,
}

/// An application as seen by HR, with applicant and posting summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HrApplication {
    pub id: u64,
    #[serde(default)]
    pub applicant_id: Option<String>,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub applied_date: Option<String>,
    #[serde(default)]
    pub hr_notes: Option<String>,
    #[serde(default)]
    pub student: Option<serde_json::Value>,
    #[serde(default)]
    pub internship: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest<'a> {
    pub status: ApplicationStatus,
    pub hr_notes: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdateRequest<'a> {
    pub application_ids: &'a [u64],
    pub status: ApplicationStatus,
}

/// Admin dashboard counters. The endpoint returns them unwrapped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    pub success: bool,
    pub total_students: u64,
    #[serde(rename = "totalFacultyHR")]
    pub total_faculty_hr: u64,
    pub published_posts: u64,
    pub new_students_this_week: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HrDashboardStats {
    pub total_applications: u64,
    pub pending: u64,
    pub under_review: u64,
    pub shortlisted: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub by_internship: Vec<InternshipApplicationCount>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InternshipApplicationCount {
    pub internship_id: u64,
    pub internship_title: String,
    pub internship_code: String,
    pub application_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentDashboardStats {
    pub total_applications: u64,
    pub pending_applications: u64,
    pub under_review_applications: u64,
    pub shortlisted_applications: u64,
    pub accepted_applications: u64,
    pub rejected_applications: u64,
    pub profile_completion_percentage: u32,
    pub available_internships: u64,
    pub unread_notifications: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: u64,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub notification_type: Option<String>,
    #[serde(default)]
    pub related_entity_id: Option<u64>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}
