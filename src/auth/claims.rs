// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session claims and authenticated user representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Claims signed into every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub username: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Absolute expiry (unix seconds)
    pub exp: i64,
}

/// Operator identity bound to a request by the session guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub username: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AuthenticatedUser {
    /// Build from verified claims. Out-of-range timestamps clamp to the epoch.
    pub fn from_claims(claims: SessionClaims) -> Self {
        let at = |secs: i64| DateTime::<Utc>::from_timestamp(secs, 0).unwrap_or_default();
        Self {
            issued_at: at(claims.iat),
            expires_at: at(claims.exp),
            username: claims.username,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_claims_converts_timestamps() {
        let user = AuthenticatedUser::from_claims(SessionClaims {
            username: "admin".into(),
            iat: 1_700_000_000,
            exp: 1_700_086_400,
        });
        assert_eq!(user.username, "admin");
        assert_eq!(user.issued_at.timestamp(), 1_700_000_000);
        assert_eq!((user.expires_at - user.issued_at).num_hours(), 24);
    }
}
