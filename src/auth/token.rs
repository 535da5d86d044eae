// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token issuing and verification (HS256 JWT).
//!
//! Expiry is checked here rather than by `jsonwebtoken` so the boundary is
//! exact: a token is accepted at `exp` and rejected one second later.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::claims::SessionClaims;
use super::AuthError;

/// Default session lifetime.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn issue(&self, username: &str) -> Result<String, AuthError> {
        self.issue_at(username, Utc::now())
    }

    pub fn issue_at(&self, username: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AuthError::TokenIssue("token expiry out of range".to_string()))?;
        let claims = SessionClaims {
            username: username.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::TokenIssue(e.to_string()))
    }

    pub fn parse(&self, token: &str) -> Result<SessionClaims, AuthError> {
        self.parse_at(token, Utc::now())
    }

    pub fn parse_at(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;

        let claims = decode::<SessionClaims>(token, &self.decoding, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::MalformedToken,
            })?
            .claims;

        if now.timestamp() > claims.exp {
            return Err(AuthError::TokenExpired);
        }

        Ok(claims)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret-for-session-tokens";

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn issued_token_round_trips_claims() {
        let issuer = TokenIssuer::new(SECRET);
        let now = at(1_700_000_000);
        let token = issuer.issue_at("admin", now).unwrap();

        let claims = issuer.parse_at(&token, now).unwrap();
        assert_eq!(claims.username, "admin");
        assert_eq!(claims.iat, 1_700_000_000);
        assert_eq!(claims.exp, 1_700_000_000 + 24 * 3600);
    }

    #[test]
    fn tokens_are_hs256_signed() {
        let issuer = TokenIssuer::new(SECRET);
        let token = issuer.issue("admin").unwrap();

        let header = jsonwebtoken::decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::HS256);
        assert_eq!(issuer.parse(&token).unwrap().username, "admin");
    }

    #[test]
    fn unrepresentable_expiry_is_an_issue_error() {
        let issuer = TokenIssuer::new(SECRET).with_ttl(Duration::MAX);
        assert!(matches!(issuer.issue("admin"), Err(AuthError::TokenIssue(_))));
    }

    #[test]
    fn expiry_boundary_is_exact() {
        let issuer = TokenIssuer::new(SECRET);
        let issued = at(1_700_000_000);
        let token = issuer.issue_at("admin", issued).unwrap();
        let exp = issued + Duration::hours(24);

        assert!(issuer.parse_at(&token, exp).is_ok());
        assert!(matches!(
            issuer.parse_at(&token, exp + Duration::seconds(1)),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn custom_ttl_applies() {
        let issuer = TokenIssuer::new(SECRET).with_ttl(Duration::hours(1));
        let issued = at(1_700_000_000);
        let token = issuer.issue_at("admin", issued).unwrap();
        let claims = issuer.parse_at(&token, issued).unwrap();
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let forged = TokenIssuer::new(b"another-secret").issue("admin").unwrap();
        let result = TokenIssuer::new(SECRET).parse(&forged);
        assert!(matches!(result, Err(AuthError::InvalidSignature)));
    }

    #[test]
    fn garbage_is_malformed() {
        let issuer = TokenIssuer::new(SECRET);
        assert!(matches!(issuer.parse("not-a-token"), Err(AuthError::MalformedToken)));
        assert!(matches!(issuer.parse(""), Err(AuthError::MalformedToken)));
    }

    #[test]
    fn tampered_claims_fail_verification() {
        let issuer = TokenIssuer::new(SECRET);
        let token = issuer.issue("admin").unwrap();
        let other = issuer.issue("someone-else").unwrap();

        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let spliced = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        assert!(matches!(issuer.parse(&spliced), Err(AuthError::InvalidSignature)));
    }
}
