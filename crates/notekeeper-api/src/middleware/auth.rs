//! Bearer-token authentication middleware.
//!
//! Adapts [`AuthGate::evaluate`](notekeeper_core::AuthGate::evaluate) to axum:
//! public paths pass through untouched, authenticated requests carry an
//! [`AuthenticatedUser`] extension, and rejections short-circuit with a 400 or
//! 401 error body.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use notekeeper_core::{GateDecision, Identity};

use crate::{ApiError, AppState};

/// Identity verified by [`require_auth`] for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))
    }
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let decision = state
        .gate
        .evaluate(request.uri().path(), authorization, Utc::now());

    match decision {
        GateDecision::Public => {}
        GateDecision::Authenticated(identity) => {
            request.extensions_mut().insert(AuthenticatedUser(identity));
        }
        GateDecision::Rejected(rejection) => return Err(rejection.into()),
    }

    Ok(next.run(request).await)
}
