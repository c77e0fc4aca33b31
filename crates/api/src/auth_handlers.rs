use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ApiError;
use crate::AppState;
use auth::{AuthSession, Credentials, Registration, TokenPair, UserView};

pub const REFRESH_COOKIE: &str = "refreshToken";

/// 30 days
const REFRESH_COOKIE_MAX_AGE: i64 = 30 * 24 * 60 * 60;

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct NewPasswordRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub user: UserView,
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            user: session.user.view(),
            tokens: session.tokens,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

pub fn refresh_cookie(refresh_token: &str) -> String {
    format!("{REFRESH_COOKIE}={refresh_token}; HttpOnly; Path=/; Max-Age={REFRESH_COOKIE_MAX_AGE}")
}

pub fn clear_refresh_cookie() -> String {
    format!("{REFRESH_COOKIE}=; HttpOnly; Path=/; Max-Age=0")
}

/// Refresh token from the `Cookie` header(s), if any
pub fn refresh_token_from(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == REFRESH_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

fn session_response(status: StatusCode, session: AuthSession) -> impl IntoResponse {
    let cookie = refresh_cookie(&session.tokens.refresh_token);
    (status, [(header::SET_COOKIE, cookie)], Json(AuthResponse::from(session)))
}

/// POST /auth/registration
pub async fn registration(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Registration>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.auth_service.register(payload).await?;
    Ok(session_response(StatusCode::CREATED, session))
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Credentials>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.auth_service.login(payload).await?;
    Ok(session_response(StatusCode::OK, session))
}

/// POST /auth/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = refresh_token_from(&headers) {
        state.auth_service.logout(&token).await?;
    }

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, clear_refresh_cookie())],
        Json(SuccessResponse { success: true }),
    ))
}

/// POST /auth/refresh
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = refresh_token_from(&headers);
    let session = state.auth_service.refresh(token.as_deref()).await?;
    Ok(session_response(StatusCode::OK, session))
}

/// PATCH /auth/activate/{token}
pub async fn activate(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<UserView>, ApiError> {
    let user = state.auth_service.activate(&token).await?;
    Ok(Json(user.view()))
}

/// POST /auth/password/forgot
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.auth_service.request_password_reset(&payload.email).await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// PATCH /auth/password/forgot/{token}
pub async fn set_new_password(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    Json(payload): Json<NewPasswordRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state
        .auth_service
        .set_new_password(&token, &payload.password)
        .await?;
    Ok(Json(SuccessResponse { success: true }))
}
