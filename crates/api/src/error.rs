use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use auth::{AuthError, ErrorKind};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn unauthorized() -> Self {
        Self {
            error: "unauthorized",
            message: None,
        }
    }
}

/// Handler error; renders an [`AuthError`] as a JSON response
#[derive(Debug)]
pub struct ApiError(pub AuthError);

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let (status, code) = match kind {
            ErrorKind::AlreadyExists => (StatusCode::BAD_REQUEST, "already_exists"),
            ErrorKind::Validation => (StatusCode::BAD_REQUEST, "validation"),
            ErrorKind::InvalidCredentials => (StatusCode::BAD_REQUEST, "invalid_credentials"),
            ErrorKind::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ErrorKind::TokenInvalid => (StatusCode::UNAUTHORIZED, "token_invalid"),
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, "not_found"),
            ErrorKind::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };

        let message = if kind == ErrorKind::Internal {
            tracing::error!(error = %self.0, "request failed");
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };

        let body = ErrorResponse {
            error: code,
            message: Some(message),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auth::StoreError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AuthError::AlreadyExists("a@x.com".into()), StatusCode::BAD_REQUEST),
            (AuthError::InvalidCredentials, StatusCode::BAD_REQUEST),
            (AuthError::Validation("email".into()), StatusCode::BAD_REQUEST),
            (AuthError::Unauthorized, StatusCode::UNAUTHORIZED),
            (AuthError::TokenInvalid, StatusCode::UNAUTHORIZED),
            (AuthError::NotFound("User".into()), StatusCode::NOT_FOUND),
            (
                AuthError::Store(StoreError::Unavailable("down".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError(err).into_response().status(), status);
        }
    }
}
