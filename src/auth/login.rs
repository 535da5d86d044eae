// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Operator credential check.

use tracing::{debug, error};

use super::{AuthError, CredentialVerifier};
use crate::storage::{Credential, GatewayStore};

/// Resolve an operator by username and verify the password.
///
/// Every rejection is [`AuthError::InvalidCredentials`] so callers cannot
/// tell an unknown user from a wrong password. A failing store is
/// [`AuthError::CredentialStore`].
pub fn authenticate(
    store: &dyn GatewayStore,
    verifier: &dyn CredentialVerifier,
    username: &str,
    password: &str,
) -> Result<Credential, AuthError> {
    if username.is_empty() || password.is_empty() {
        return Err(AuthError::InvalidCredentials);
    }

    let credential = match store.find_credential(username) {
        Ok(Some(credential)) => credential,
        Ok(None) => {
            debug!(username = %username, "login for unknown user");
            return Err(AuthError::InvalidCredentials);
        }
        Err(e) => {
            error!(error = %e, "credential lookup failed");
            return Err(AuthError::CredentialStore(e.to_string()));
        }
    };

    if !credential.is_active {
        debug!(username = %username, "login for inactive user");
        return Err(AuthError::InvalidCredentials);
    }

    if !verifier.verify(password, &credential.password_hash) {
        debug!(username = %username, "password mismatch");
        return Err(AuthError::InvalidCredentials);
    }

    Ok(credential)
}
