use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::model::{Account, Posting, Role};
use crate::{Caller, Db, Failure};

const ADMIN: &[Role] = &[Role::Admin];

#[derive(Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

#[derive(Deserialize)]
pub struct RoleQuery {
    pub role: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternshipQuery {
    pub status: Option<String>,
    pub work_mode: Option<String>,
    pub search: Option<String>,
}

#[derive(Deserialize)]
pub struct TermQuery {
    pub term: Option<String>,
}

#[derive(Deserialize)]
pub struct IdsInput {
    pub ids: Vec<u64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleUserInput {
    pub is_enabled: bool,
}

#[derive(Deserialize)]
pub struct StatusInput {
    pub status: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub password: Option<String>,
    pub mobile_no: String,
    #[serde(default)]
    pub location: Option<String>,
    pub user_type: String,
}

impl UserInput {
    fn staff_role(&self) -> Result<Role, Failure> {
        match Role::parse(&self.user_type) {
            Some(role @ (Role::Hr | Role::Faculty)) => Ok(role),
            _ => Err(Failure::bad_request("userType must be HR or FACULTY")),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

pub async fn dashboard_stats(caller: Caller, State(db): State<Db>) -> Result<Json<Value>, Failure> {
    caller.require(ADMIN)?;
    let store = db.read().await;
    let students = store.students(None);
    Ok(Json(json!({
        "success": true,
        "totalStudents": students.len(),
        "totalFacultyHR": store.accounts_with_role(&[Role::Hr, Role::Faculty]).count(),
        "publishedPosts": store.postings.values().filter(|p| p.is_open()).count(),
        "newStudentsThisWeek": students.iter().filter(|s| s.self_registered).count(),
    })))
}

pub async fn list_users(
    caller: Caller,
    State(db): State<Db>,
    Query(query): Query<RoleQuery>,
) -> Result<Json<Value>, Failure> {
    caller.require(ADMIN)?;
    let roles = match non_empty(&query.role) {
        None => vec![Role::Hr, Role::Faculty],
        Some(raw) => vec![Role::parse(raw).ok_or_else(|| Failure::bad_request("Unknown role"))?],
    };
    let store = db.read().await;
    let users: Vec<Value> = store.accounts_with_role(&roles).map(Account::staff_view).collect();
    Ok(Json(json!({ "success": true, "total": users.len(), "data": users })))
}

pub async fn get_user(
    caller: Caller,
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, Failure> {
    caller.require(ADMIN)?;
    let store = db.read().await;
    let user = store
        .accounts
        .get(&id)
        .filter(|a| matches!(a.role, Role::Hr | Role::Faculty))
        .ok_or_else(|| Failure::not_found("User"))?;
    Ok(Json(json!({ "success": true, "data": user.staff_view() })))
}

pub async fn create_user(
    caller: Caller,
    State(db): State<Db>,
    Json(input): Json<UserInput>,
) -> Result<(StatusCode, Json<Value>), Failure> {
    caller.require(ADMIN)?;
    let role = input.staff_role()?;
    let password = input
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| Failure::bad_request("Password is required"))?;
    let mut store = db.write().await;
    if store.account_by_email(&input.email).is_some() {
        return Err(Failure::new(StatusCode::CONFLICT, "User with this email already exists"));
    }
    let id = store.next_id();
    let account = Account {
        id,
        first_name: input.first_name,
        last_name: input.last_name,
        email: input.email,
        password,
        mobile_no: Some(input.mobile_no),
        location: input.location,
        role,
        is_active: true,
        self_registered: false,
    };
    let view = account.staff_view();
    store.accounts.insert(id, account);
    tracing::info!(id, role = role.as_str(), "staff account created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "message": "User created successfully", "data": view })),
    ))
}

pub async fn update_user(
    caller: Caller,
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<UserInput>,
) -> Result<Json<Value>, Failure> {
    caller.require(ADMIN)?;
    let role = input.staff_role()?;
    let mut store = db.write().await;
    let account = store
        .accounts
        .get_mut(&id)
        .filter(|a| matches!(a.role, Role::Hr | Role::Faculty))
        .ok_or_else(|| Failure::not_found("User"))?;
    account.first_name = input.first_name;
    account.last_name = input.last_name;
    account.email = input.email;
    account.mobile_no = Some(input.mobile_no);
    account.location = input.location;
    account.role = role;
    if let Some(password) = input.password.filter(|p| !p.is_empty()) {
        account.password = password;
    }
    Ok(Json(json!({
        "success": true,
        "message": "User updated successfully",
        "data": account.staff_view(),
    })))
}

pub async fn delete_user(
    caller: Caller,
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, Failure> {
    caller.require(ADMIN)?;
    let mut store = db.write().await;
    if !store
        .accounts
        .get(&id)
        .is_some_and(|a| matches!(a.role, Role::Hr | Role::Faculty))
    {
        return Err(Failure::not_found("User"));
    }
    store.remove_account(id);
    Ok(Json(json!({ "success": true, "message": "User deleted successfully" })))
}

/// Disabling an account also revokes its tokens.
pub async fn toggle_user(
    caller: Caller,
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<ToggleUserInput>,
) -> Result<Json<Value>, Failure> {
    caller.require(ADMIN)?;
    let mut store = db.write().await;
    let account = store
        .accounts
        .get_mut(&id)
        .filter(|a| a.role != Role::Admin)
        .ok_or_else(|| Failure::not_found("User"))?;
    account.is_active = input.is_enabled;
    let view = account.staff_view();
    if !input.is_enabled {
        store.tokens.retain(|_, owner| *owner != id);
    }
    Ok(Json(json!({
        "success": true,
        "message": "User status updated successfully",
        "data": view,
    })))
}

pub async fn list_registrations(
    caller: Caller,
    State(db): State<Db>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Value>, Failure> {
    caller.require(ADMIN)?;
    let store = db.read().await;
    let students: Vec<Value> = store
        .students(non_empty(&query.search))
        .into_iter()
        .map(Account::student_view)
        .collect();
    Ok(Json(json!({ "success": true, "total": students.len(), "data": students })))
}

pub async fn get_registration(
    caller: Caller,
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, Failure> {
    caller.require(ADMIN)?;
    let store = db.read().await;
    let student = store
        .accounts
        .get(&id)
        .filter(|a| a.role == Role::Student)
        .ok_or_else(|| Failure::not_found("Student"))?;
    Ok(Json(json!({ "success": true, "data": student.student_view() })))
}

pub async fn delete_registration(
    caller: Caller,
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, Failure> {
    caller.require(ADMIN)?;
    let mut store = db.write().await;
    if !store.accounts.get(&id).is_some_and(|a| a.role == Role::Student) {
        return Err(Failure::not_found("Student"));
    }
    store.remove_account(id);
    Ok(Json(json!({ "success": true, "message": "Registration deleted successfully" })))
}

pub async fn delete_registrations(
    caller: Caller,
    State(db): State<Db>,
    Json(input): Json<IdsInput>,
) -> Result<Json<Value>, Failure> {
    caller.require(ADMIN)?;
    let mut store = db.write().await;
    let mut deleted = 0;
    for id in input.ids {
        if store.accounts.get(&id).is_some_and(|a| a.role == Role::Student) {
            store.remove_account(id);
            deleted += 1;
        }
    }
    Ok(Json(json!({
        "success": true,
        "message": format!("{deleted} registration(s) deleted successfully"),
    })))
}

/// Every student as `text/csv`.
pub async fn export_registrations(
    caller: Caller,
    State(db): State<Db>,
) -> Result<impl IntoResponse, Failure> {
    caller.require(ADMIN)?;
    let store = db.read().await;
    let mut csv = String::from("id,name,email,mobileNo\n");
    for student in store.students(None) {
        csv.push_str(&format!(
            "{},{},{},{}\n",
            student.id,
            student.full_name(),
            student.email,
            student.mobile_no.as_deref().unwrap_or_default(),
        ));
    }
    Ok(([(header::CONTENT_TYPE, "text/csv")], csv))
}

pub async fn list_internships(
    caller: Caller,
    State(db): State<Db>,
    Query(query): Query<InternshipQuery>,
) -> Result<Json<Value>, Failure> {
    caller.require(ADMIN)?;
    let store = db.read().await;
    let posts: Vec<Value> = store
        .postings
        .values()
        .filter(|p| non_empty(&query.status).is_none_or(|s| p.status.eq_ignore_ascii_case(s)))
        .filter(|p| non_empty(&query.work_mode).is_none_or(|m| p.work_mode.eq_ignore_ascii_case(m)))
        .filter(|p| non_empty(&query.search).is_none_or(|s| p.matches(s)))
        .map(|p| store.posting_view(p))
        .collect();
    Ok(Json(json!({ "success": true, "total": posts.len(), "data": posts })))
}

pub async fn search_internships(
    caller: Caller,
    State(db): State<Db>,
    Query(query): Query<TermQuery>,
) -> Result<Json<Value>, Failure> {
    caller.require(ADMIN)?;
    let term = non_empty(&query.term).unwrap_or_default();
    let store = db.read().await;
    let posts: Vec<Value> = store
        .postings
        .values()
        .filter(|p| p.matches(term))
        .map(|p| store.posting_view(p))
        .collect();
    Ok(Json(json!({ "success": true, "total": posts.len(), "data": posts })))
}

pub async fn get_internship(
    caller: Caller,
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, Failure> {
    caller.require(ADMIN)?;
    let store = db.read().await;
    let post = store.postings.get(&id).ok_or_else(|| Failure::not_found("Internship"))?;
    Ok(Json(json!({ "success": true, "data": store.posting_view(post) })))
}

pub async fn create_internship(
    caller: Caller,
    State(db): State<Db>,
    Json(input): Json<Posting>,
) -> Result<(StatusCode, Json<Value>), Failure> {
    caller.require(ADMIN)?;
    let mut store = db.write().await;
    if store.postings.values().any(|p| p.code.eq_ignore_ascii_case(&input.code)) {
        return Err(Failure::new(StatusCode::CONFLICT, "Internship code already exists"));
    }
    let id = store.insert_posting(input);
    let view = store
        .postings
        .get(&id)
        .map(|p| store.posting_view(p))
        .unwrap_or_default();
    tracing::info!(id, "internship created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "message": "Internship created successfully", "data": view })),
    ))
}

pub async fn update_internship(
    caller: Caller,
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(mut input): Json<Posting>,
) -> Result<Json<Value>, Failure> {
    caller.require(ADMIN)?;
    let mut store = db.write().await;
    let post = store.postings.get_mut(&id).ok_or_else(|| Failure::not_found("Internship"))?;
    input.id = id;
    *post = input;
    let view = store.postings.get(&id).map(|p| store.posting_view(p));
    Ok(Json(json!({
        "success": true,
        "message": "Internship updated successfully",
        "data": view,
    })))
}

pub async fn delete_internship(
    caller: Caller,
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, Failure> {
    caller.require(ADMIN)?;
    let mut store = db.write().await;
    store.postings.remove(&id).ok_or_else(|| Failure::not_found("Internship"))?;
    store.applications.retain(|_, a| a.posting_id != id);
    Ok(Json(json!({ "success": true, "message": "Internship deleted successfully" })))
}

pub async fn toggle_internship(
    caller: Caller,
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<StatusInput>,
) -> Result<Json<Value>, Failure> {
    caller.require(ADMIN)?;
    let mut store = db.write().await;
    let post = store.postings.get_mut(&id).ok_or_else(|| Failure::not_found("Internship"))?;
    post.status = input.status;
    let view = store.postings.get(&id).map(|p| store.posting_view(p));
    Ok(Json(json!({
        "success": true,
        "message": "Internship status updated successfully",
        "data": view,
    })))
}
