use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::ErrorResponse;
use crate::AppState;
use auth::{Access, Requirement, SessionClaims};

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(ErrorResponse::unauthorized())).into_response()
}

type GuardFuture = Pin<Box<dyn Future<Output = Result<Response, Response>> + Send>>;

/// Middleware gating a route group behind a [`Requirement`].
///
/// Verified access claims are stored in the request extensions for
/// [`AuthClaims`].
pub fn require(
    requirement: Requirement,
) -> impl Fn(State<Arc<AppState>>, Request, Next) -> GuardFuture + Clone {
    move |State(state): State<Arc<AppState>>, mut request: Request, next: Next| {
        let requirement = requirement.clone();
        Box::pin(async move {
            let authorization = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok());

            match state.guard.authorize(&requirement, authorization) {
                Ok(Access::Granted(claims)) => {
                    request.extensions_mut().insert(claims);
                }
                Ok(Access::Public) => {}
                Err(_) => return Err(unauthorized()),
            }

            Ok(next.run(request).await)
        })
    }
}

/// Extractor for the verified access claims.
/// Use this in handlers behind [`require`].
#[derive(Debug, Clone)]
pub struct AuthClaims(pub SessionClaims);

impl<S> axum::extract::FromRequestParts<S> for AuthClaims
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionClaims>()
            .cloned()
            .map(AuthClaims)
            .ok_or_else(unauthorized)
    }
}
