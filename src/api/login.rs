// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Operator login.
//!
//! `POST /api/login` exchanges sealed envelopes in both directions. The
//! unsealed `POST /api/login/plain` is only mounted when the deployment
//! opts in.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, info};

use crate::{
    auth::{authenticate, AuthError},
    envelope::{EnvelopeBody, SealedJson},
    error::ApiError,
    models::{LoginRequest, LoginResponse, SealedError},
    state::AppState,
};

/// Verify credentials off the async runtime and issue a token.
async fn issue_session(state: &AppState, request: LoginRequest) -> Result<LoginResponse, AuthError> {
    let store = state.store.clone();
    let verifier = state.verifier.clone();
    let LoginRequest { username, password } = request;

    let credential = tokio::task::spawn_blocking(move || {
        authenticate(store.as_ref(), verifier.as_ref(), &username, &password)
    })
    .await
    .map_err(|e| AuthError::TokenIssue(format!("login task failed: {e}")))??;

    let token = state.tokens.issue(&credential.username)?;
    info!(username = %credential.username, "operator logged in");

    Ok(LoginResponse {
        token,
        username: credential.username,
        role: credential.role,
    })
}

fn seal(state: &AppState, status: StatusCode, value: &impl serde::Serialize) -> Response {
    match EnvelopeBody::seal(&state.cipher, value) {
        Ok(body) => (status, Json(body)).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/login",
    request_body(content = EnvelopeBody, description = "Sealed LoginRequest"),
    tag = "Auth",
    responses(
        (status = 200, description = "Sealed LoginResponse", body = EnvelopeBody),
        (status = 400, description = "Missing or malformed envelope"),
        (status = 401, description = "Undecryptable envelope or invalid credentials"),
        (status = 500, description = "Credential store unavailable or token signing failed")
    )
)]
pub async fn login(State(state): State<AppState>, SealedJson(request): SealedJson<LoginRequest>) -> Response {
    match issue_session(&state, request).await {
        Ok(response) => seal(&state, StatusCode::OK, &response),
        Err(AuthError::InvalidCredentials) if state.login.seal_errors => {
            let body = SealedError {
                error: AuthError::InvalidCredentials.public_message().to_string(),
            };
            seal(&state, StatusCode::UNAUTHORIZED, &body)
        }
        Err(e) => {
            if let AuthError::TokenIssue(ref reason) = e {
                error!(reason = %reason, "session token issue failed");
            }
            e.into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/login/plain",
    request_body = LoginRequest,
    tag = "Auth",
    responses(
        (status = 200, body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Credential store unavailable or token signing failed")
    )
)]
pub async fn login_plain(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    Ok(Json(issue_session(&state, request).await?))
}
