use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::model::{Application, Role, Status};
use crate::{Caller, Db, Failure};

const STUDENT: &[Role] = &[Role::Student];

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternshipQuery {
    pub work_mode: Option<String>,
    pub search: Option<String>,
}

#[derive(Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyInput {
    pub career_post_id: u64,
    #[serde(default)]
    pub cover_letter: Option<String>,
}

pub async fn available_internships(
    caller: Caller,
    State(db): State<Db>,
    Query(query): Query<InternshipQuery>,
) -> Result<Json<Value>, Failure> {
    caller.require(STUDENT)?;
    let store = db.read().await;
    let work_mode = query.work_mode.as_deref().filter(|m| !m.is_empty());
    let search = query.search.as_deref().filter(|s| !s.is_empty());
    let posts: Vec<Value> = store
        .postings
        .values()
        .filter(|p| p.is_open())
        .filter(|p| work_mode.is_none_or(|m| p.work_mode.eq_ignore_ascii_case(m)))
        .filter(|p| search.is_none_or(|s| p.matches(s)))
        .map(|p| store.posting_view(p))
        .collect();
    Ok(Json(json!({ "success": true, "total": posts.len(), "data": posts })))
}

pub async fn get_internship(
    caller: Caller,
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, Failure> {
    caller.require(STUDENT)?;
    let store = db.read().await;
    let post = store
        .postings
        .get(&id)
        .filter(|p| p.is_open())
        .ok_or_else(|| Failure::not_found("Internship"))?;
    Ok(Json(json!({ "success": true, "data": store.posting_view(post) })))
}

pub async fn check_application(
    caller: Caller,
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, Failure> {
    caller.require(STUDENT)?;
    let store = db.read().await;
    let has_applied = store
        .applications
        .values()
        .any(|a| a.student_id == caller.id && a.posting_id == id);
    Ok(Json(json!({ "success": true, "hasApplied": has_applied })))
}

/// Business-rule refusals are 400s that still carry `success: false`.
pub async fn apply(
    caller: Caller,
    State(db): State<Db>,
    Json(input): Json<ApplyInput>,
) -> Result<(StatusCode, Json<Value>), Failure> {
    caller.require(STUDENT)?;
    let mut store = db.write().await;
    if !store
        .postings
        .get(&input.career_post_id)
        .is_some_and(|p| p.is_open())
    {
        return Err(Failure::bad_request("Internship is not open for applications"));
    }
    if store
        .applications
        .values()
        .any(|a| a.student_id == caller.id && a.posting_id == input.career_post_id)
    {
        return Err(Failure::bad_request("You have already applied for this internship"));
    }
    let id = store.next_id();
    let application = Application {
        id,
        student_id: caller.id,
        posting_id: input.career_post_id,
        status: Status::Pending,
        hr_notes: None,
        cover_letter: input.cover_letter,
    };
    let view = store.student_application_view(&application);
    store.applications.insert(id, application);
    tracing::info!(id, student = caller.id, "application submitted");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "message": "Application submitted successfully", "data": view })),
    ))
}

pub async fn my_applications(
    caller: Caller,
    State(db): State<Db>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Value>, Failure> {
    caller.require(STUDENT)?;
    let store = db.read().await;
    let status = query.status.as_deref().filter(|s| !s.is_empty());
    let data: Vec<Value> = store
        .applications
        .values()
        .filter(|a| a.student_id == caller.id)
        .filter(|a| status.is_none_or(|s| a.status.as_str().eq_ignore_ascii_case(s)))
        .map(|a| store.student_application_view(a))
        .collect();
    Ok(Json(json!({ "success": true, "total": data.len(), "data": data })))
}

pub async fn get_application(
    caller: Caller,
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, Failure> {
    caller.require(STUDENT)?;
    let store = db.read().await;
    let application = store
        .applications
        .get(&id)
        .filter(|a| a.student_id == caller.id)
        .ok_or_else(|| Failure::not_found("Application"))?;
    Ok(Json(json!({ "success": true, "data": store.student_application_view(application) })))
}

pub async fn withdraw(
    caller: Caller,
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, Failure> {
    caller.require(STUDENT)?;
    let mut store = db.write().await;
    let status = store
        .applications
        .get(&id)
        .filter(|a| a.student_id == caller.id)
        .map(|a| a.status)
        .ok_or_else(|| Failure::not_found("Application"))?;
    if matches!(status, Status::Accepted | Status::Rejected) {
        return Err(Failure::bad_request(format!(
            "Cannot withdraw an application that is {}",
            status.as_str()
        )));
    }
    store.applications.remove(&id);
    Ok(Json(json!({ "success": true, "message": "Application withdrawn successfully" })))
}

pub async fn dashboard_stats(caller: Caller, State(db): State<Db>) -> Result<Json<Value>, Failure> {
    caller.require(STUDENT)?;
    let store = db.read().await;
    let mine: Vec<&Application> = store
        .applications
        .values()
        .filter(|a| a.student_id == caller.id)
        .collect();
    let count = |status: Status| mine.iter().filter(|a| a.status == status).count();
    let completion = store.accounts.get(&caller.id).map_or(0, |a| {
        let filled = [
            !a.first_name.is_empty(),
            a.last_name.as_deref().is_some_and(|v| !v.is_empty()),
            !a.email.is_empty(),
            a.mobile_no.as_deref().is_some_and(|v| !v.is_empty()),
            a.location.as_deref().is_some_and(|v| !v.is_empty()),
        ];
        filled.iter().filter(|f| **f).count() * 20
    });
    Ok(Json(json!({
        "success": true,
        "data": {
            "totalApplications": mine.len(),
            "pendingApplications": count(Status::Pending),
            "underReviewApplications": count(Status::UnderReview),
            "shortlistedApplications": count(Status::Shortlisted),
            "acceptedApplications": count(Status::Accepted),
            "rejectedApplications": count(Status::Rejected),
            "profileCompletionPercentage": completion,
            "availableInternships": store.postings.values().filter(|p| p.is_open()).count(),
            "unreadNotifications": store
                .notifications
                .values()
                .filter(|n| n.student_id == caller.id && !n.is_read)
                .count(),
        },
    })))
}

pub async fn notifications(
    caller: Caller,
    State(db): State<Db>,
    Query(query): Query<NotificationQuery>,
) -> Result<Json<Value>, Failure> {
    caller.require(STUDENT)?;
    let store = db.read().await;
    let data: Vec<Value> = store
        .notifications
        .values()
        .rev()
        .filter(|n| n.student_id == caller.id)
        .filter(|n| !query.unread_only || !n.is_read)
        .map(|n| json!(n))
        .collect();
    Ok(Json(json!({ "success": true, "total": data.len(), "data": data })))
}

pub async fn mark_read(
    caller: Caller,
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, Failure> {
    caller.require(STUDENT)?;
    let mut store = db.write().await;
    let notification = store
        .notifications
        .get_mut(&id)
        .filter(|n| n.student_id == caller.id)
        .ok_or_else(|| Failure::not_found("Notification"))?;
    notification.is_read = true;
    Ok(Json(json!({ "success": true, "message": "Notification marked as read" })))
}

pub async fn mark_all_read(caller: Caller, State(db): State<Db>) -> Result<Json<Value>, Failure> {
    caller.require(STUDENT)?;
    let mut store = db.write().await;
    let mut marked = 0;
    for notification in store.notifications.values_mut() {
        if notification.student_id == caller.id && !notification.is_read {
            notification.is_read = true;
            marked += 1;
        }
    }
    Ok(Json(json!({
        "success": true,
        "message": format!("{marked} notification(s) marked as read"),
    })))
}
