// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session guard middleware for Axum.
//!
//! Applied as a `route_layer` over the protected router:
//!
//! ```rust,ignore
//! let protected = Router::new()
//!     .route("/api/device/status", get(device_status))
//!     .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_session));
//! ```
//!
//! On success the [`AuthenticatedUser`] is inserted into the request
//! extensions for the [`Auth`](super::Auth) extractor. Every rejection
//! returns the same 401 body; the cause is logged at debug level only.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::{AuthError, AuthenticatedUser, TokenIssuer};
use crate::state::AppState;

/// Extract the bearer token from the `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_str = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(AuthError::InvalidAuthHeader)?;

    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }
    Ok(token)
}

/// Verify the request's bearer token and build the bound identity.
pub fn verify_headers(headers: &HeaderMap, tokens: &TokenIssuer) -> Result<AuthenticatedUser, AuthError> {
    let token = bearer_token(headers)?;
    let claims = tokens.parse(token)?;
    Ok(AuthenticatedUser::from_claims(claims))
}

/// Authentication middleware function.
pub async fn require_session(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    match verify_headers(request.headers(), &state.tokens) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            debug!(code = e.error_code(), reason = %e, path = %request.uri().path(), "session rejected");
            e.into_response()
        }
    }
}
