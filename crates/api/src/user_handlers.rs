use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthClaims;
use crate::AppState;
use auth::{Account, Role, UserView};

/// Body of the role and account assignment routes
#[derive(Debug, Deserialize)]
pub struct ValueRequest {
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub message: &'static str,
}

/// GET /users/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    AuthClaims(claims): AuthClaims,
) -> Result<Json<UserView>, ApiError> {
    let user = state.auth_service.find_user(claims.id).await?;
    Ok(Json(user.view()))
}

/// GET /users/{id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserView>, ApiError> {
    let user = state.auth_service.find_user(id).await?;
    Ok(Json(user.view()))
}

/// PATCH /users/role/{id}
pub async fn assign_role(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ValueRequest>,
) -> Result<Json<UserView>, ApiError> {
    let role: Role = payload.value.parse()?;
    let user = state.auth_service.assign_role(id, role).await?;
    Ok(Json(user.view()))
}

/// PATCH /users/account/{id}
pub async fn assign_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ValueRequest>,
) -> Result<Json<UserView>, ApiError> {
    let account: Account = payload.value.parse()?;
    let user = state.auth_service.assign_account(id, account).await?;
    Ok(Json(user.view()))
}

/// GET /premium/ping
pub async fn premium_ping() -> Json<PingResponse> {
    Json(PingResponse { message: "pong" })
}
