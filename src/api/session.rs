// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::Json;

use crate::auth::{Auth, AuthenticatedUser};

/// The identity bound to the presented session token.
#[utoipa::path(
    get,
    path = "/api/session",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, body = AuthenticatedUser),
        (status = 401, description = "Invalid or missing session token")
    )
)]
pub async fn current_session(Auth(user): Auth) -> Json<AuthenticatedUser> {
    Json(user)
}

#[cfg(test)]
mod tests {
    use crate::test_support::TestGateway;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn returns_bound_identity() {
        let gw = TestGateway::new();
        let token = gw.token();

        let (status, body) = gw.get("/api/session", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "admin");
        assert!(body["expires_at"].is_string());
    }

    #[tokio::test]
    async fn rejects_without_token() {
        let gw = TestGateway::new();
        let (status, body) = gw.get("/api/session", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "invalid or missing session token");
    }
}
