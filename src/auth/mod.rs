// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Operator login and session tokens for the doorlock gateway.
//!
//! ## Auth Flow
//!
//! 1. The dashboard sends `{username, password}` inside a sealed envelope
//!    to `POST /api/login`
//! 2. The gateway:
//!    - verifies the password against the stored Argon2id hash
//!    - issues an HS256 session token (24h lifetime by default)
//!    - returns `{token, username, role}` inside a sealed envelope
//! 3. Protected routes require `Authorization: Bearer <token>`; the
//!    `require_session` middleware binds the identity to the request
//!
//! ## Security
//!
//! - Unknown user, inactive user and wrong password are indistinguishable
//! - Session rejections share one response body
//! - Expiry is exact, with no clock skew leeway

pub mod claims;
pub mod error;
pub mod extractor;
pub mod login;
pub mod middleware;
pub mod password;
pub mod token;

pub use claims::{AuthenticatedUser, SessionClaims};
pub use error::{AuthError, SESSION_REJECTED};
pub use extractor::Auth;
pub use login::authenticate;
pub use middleware::require_session;
pub use password::{Argon2Verifier, CredentialVerifier, PasswordError};
pub use token::TokenIssuer;
