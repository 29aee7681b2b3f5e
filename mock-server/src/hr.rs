use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::model::{Role, Status, Store};
use crate::{Caller, Db, Failure};

const STAFF: &[Role] = &[Role::Hr, Role::Admin];

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub internship_id: Option<u64>,
}

#[derive(Deserialize)]
pub struct TypeQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub status: Status,
    #[serde(default)]
    pub hr_notes: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesInput {
    pub hr_notes: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkInput {
    pub application_ids: Vec<u64>,
    pub status: Status,
}

/// Sets the status and tells the applicant.
fn apply_status(store: &mut Store, id: u64, status: Status) -> Option<()> {
    let application = store.applications.get_mut(&id)?;
    application.status = status;
    let (student_id, posting_id) = (application.student_id, application.posting_id);
    let title = store
        .postings
        .get(&posting_id)
        .map(|p| p.title.clone())
        .unwrap_or_default();
    store.notify(
        student_id,
        "Application Update",
        format!("Your application for {title} is now {}", status.as_str()),
        "APPLICATION_STATUS",
        Some(id),
    );
    Some(())
}

pub async fn list_applications(
    caller: Caller,
    State(db): State<Db>,
    Query(query): Query<ApplicationQuery>,
) -> Result<Json<Value>, Failure> {
    caller.require(STAFF)?;
    let store = db.read().await;
    let search = query.search.as_deref().filter(|s| !s.is_empty()).map(str::to_lowercase);
    let status = query.status.as_deref().filter(|s| !s.is_empty());
    let data: Vec<Value> = store
        .applications
        .values()
        .filter(|a| status.is_none_or(|s| a.status.as_str().eq_ignore_ascii_case(s)))
        .filter(|a| query.internship_id.is_none_or(|id| a.posting_id == id))
        .filter(|a| {
            search.as_deref().is_none_or(|needle| {
                store.accounts.get(&a.student_id).is_some_and(|s| {
                    s.full_name().to_lowercase().contains(needle)
                        || s.email.to_lowercase().contains(needle)
                })
            })
        })
        .map(|a| store.hr_application_view(a))
        .collect();
    Ok(Json(json!({
        "success": true,
        "message": "Applications retrieved successfully",
        "total": data.len(),
        "data": data,
    })))
}

pub async fn get_application(
    caller: Caller,
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, Failure> {
    caller.require(STAFF)?;
    let store = db.read().await;
    let application = store
        .applications
        .get(&id)
        .ok_or_else(|| Failure::not_found("Application"))?;
    Ok(Json(json!({ "success": true, "data": store.hr_application_view(application) })))
}

pub async fn update_status(
    caller: Caller,
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<StatusUpdate>,
) -> Result<Json<Value>, Failure> {
    caller.require(STAFF)?;
    let mut store = db.write().await;
    apply_status(&mut store, id, input.status).ok_or_else(|| Failure::not_found("Application"))?;
    if let Some(notes) = input.hr_notes {
        if let Some(application) = store.applications.get_mut(&id) {
            application.hr_notes = Some(notes);
        }
    }
    tracing::info!(id, status = input.status.as_str(), "application status updated");
    let view = store.applications.get(&id).map(|a| store.hr_application_view(a));
    Ok(Json(json!({
        "success": true,
        "message": "Application status updated successfully",
        "data": view,
    })))
}

pub async fn update_notes(
    caller: Caller,
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<NotesInput>,
) -> Result<Json<Value>, Failure> {
    caller.require(STAFF)?;
    let mut store = db.write().await;
    let application = store
        .applications
        .get_mut(&id)
        .ok_or_else(|| Failure::not_found("Application"))?;
    application.hr_notes = Some(input.hr_notes);
    let view = store.applications.get(&id).map(|a| store.hr_application_view(a));
    Ok(Json(json!({ "success": true, "message": "Notes updated successfully", "data": view })))
}

pub async fn bulk_update(
    caller: Caller,
    State(db): State<Db>,
    Json(input): Json<BulkInput>,
) -> Result<Json<Value>, Failure> {
    caller.require(STAFF)?;
    if input.application_ids.is_empty() {
        return Err(Failure::bad_request("No application IDs provided"));
    }
    let mut store = db.write().await;
    let updated = input
        .application_ids
        .iter()
        .filter_map(|&id| apply_status(&mut store, id, input.status))
        .count();
    Ok(Json(json!({
        "success": true,
        "message": format!("{updated} application(s) updated successfully"),
        "updatedCount": updated,
    })))
}

/// Shortlisted applications, optionally narrowed to one work mode.
pub async fn shortlisted(
    caller: Caller,
    State(db): State<Db>,
    Query(query): Query<TypeQuery>,
) -> Result<Json<Value>, Failure> {
    caller.require(STAFF)?;
    let store = db.read().await;
    let kind = query.kind.as_deref().filter(|k| !k.is_empty());
    let data: Vec<Value> = store
        .applications
        .values()
        .filter(|a| a.status == Status::Shortlisted)
        .filter(|a| {
            kind.is_none_or(|k| {
                store
                    .postings
                    .get(&a.posting_id)
                    .is_some_and(|p| p.work_mode.eq_ignore_ascii_case(k))
            })
        })
        .map(|a| store.hr_application_view(a))
        .collect();
    Ok(Json(json!({ "success": true, "total": data.len(), "data": data })))
}

pub async fn dashboard_stats(caller: Caller, State(db): State<Db>) -> Result<Json<Value>, Failure> {
    caller.require(STAFF)?;
    let store = db.read().await;
    let by_internship: Vec<Value> = store
        .postings
        .values()
        .map(|p| {
            json!({
                "internshipId": p.id,
                "internshipTitle": p.title,
                "internshipCode": p.code,
                "applicationCount": store.applications.values().filter(|a| a.posting_id == p.id).count(),
            })
        })
        .collect();
    Ok(Json(json!({
        "success": true,
        "data": {
            "totalApplications": store.applications.len(),
            "pending": store.count_with_status(Status::Pending),
            "underReview": store.count_with_status(Status::UnderReview),
            "shortlisted": store.count_with_status(Status::Shortlisted),
            "accepted": store.count_with_status(Status::Accepted),
            "rejected": store.count_with_status(Status::Rejected),
            "byInternship": by_internship,
        },
    })))
}
