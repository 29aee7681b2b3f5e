use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::model::{Account, Role};
use crate::{Caller, Db, Failure};

#[derive(Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub mobile_no: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

pub async fn login(
    State(db): State<Db>,
    Json(input): Json<LoginInput>,
) -> Result<Json<Value>, Failure> {
    let mut store = db.write().await;
    let account = store
        .account_by_email(&input.email)
        .filter(|a| a.password == input.password)
        .cloned()
        .ok_or_else(|| Failure::unauthorized("Invalid email or password"))?;
    if !account.is_active {
        return Err(Failure::unauthorized("Account is disabled"));
    }
    let token = store.issue_token(account.id);
    tracing::info!(id = account.id, role = account.role.as_str(), "login");
    Ok(Json(json!({
        "success": true,
        "message": "Login successful",
        "token": token,
        "user": account.user_info(),
    })))
}

/// Creates a student account and signs it in.
pub async fn register(
    State(db): State<Db>,
    Json(input): Json<RegisterInput>,
) -> Result<(StatusCode, Json<Value>), Failure> {
    if input.email.trim().is_empty() || input.password.is_empty() {
        return Err(Failure::bad_request("Email and password are required"));
    }
    let mut store = db.write().await;
    if store.account_by_email(&input.email).is_some() {
        return Err(Failure::new(
            StatusCode::CONFLICT,
            "User with this email already exists",
        ));
    }
    let id = store.next_id();
    let account = Account {
        id,
        first_name: input.first_name,
        last_name: input.last_name,
        email: input.email,
        password: input.password,
        mobile_no: input.mobile_no,
        location: input.location,
        role: Role::Student,
        is_active: true,
        self_registered: true,
    };
    let user = account.user_info();
    store.accounts.insert(id, account);
    let token = store.issue_token(id);
    tracing::info!(id, "student registered");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Registration successful",
            "token": token,
            "user": user,
        })),
    ))
}

pub async fn logout(caller: Caller, State(db): State<Db>) -> Json<Value> {
    db.write().await.tokens.remove(&caller.token);
    Json(json!({ "success": true, "message": "Logged out successfully" }))
}

pub async fn verify(caller: Caller, State(db): State<Db>) -> Json<Value> {
    let store = db.read().await;
    let user = store.accounts.get(&caller.id).map(Account::user_info);
    Json(json!({ "valid": true, "user": user }))
}
