// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Password and PIN hashing.
//!
//! Stored secrets are Argon2id PHC strings with a random per-secret salt.
//! The PHC string carries its own parameters, so hashes produced with
//! different cost settings still verify with any [`Argon2Verifier`].

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use tracing::warn;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("invalid argon2 parameters: {0}")]
    Params(String),

    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Checks a candidate secret against a stored hash.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, candidate: &str, stored_hash: &str) -> bool;
}

/// Argon2id verifier and hasher.
#[derive(Debug, Clone)]
pub struct Argon2Verifier {
    params: Params,
}

impl Default for Argon2Verifier {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl Argon2Verifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use explicit cost parameters (memory KiB, iterations, lanes).
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, PasswordError> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| PasswordError::Params(e.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a secret into a PHC string with a fresh random salt.
    pub fn hash(&self, secret: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::Hash(e.to_string()))
    }
}

impl CredentialVerifier for Argon2Verifier {
    fn verify(&self, candidate: &str, stored_hash: &str) -> bool {
        let parsed = match PasswordHash::new(stored_hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "stored credential hash is not a valid PHC string");
                return false;
            }
        };

        self.argon2()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok()
    }
}
