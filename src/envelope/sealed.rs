// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sealed JSON bodies for sensitive endpoints.
//!
//! Use the `SealedJson` extractor in handlers whose request body arrives as
//! an encrypted envelope:
//!
//! ```rust,ignore
//! async fn login(State(state): State<AppState>, SealedJson(req): SealedJson<LoginRequest>) {
//!     // req is the decrypted, deserialized inner payload
//! }
//! ```

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use super::{CipherError, EnvelopeCipher};
use crate::error::ApiError;
use crate::state::AppState;

/// Encrypted request/response body.
///
/// Clients may send the ciphertext under either `payload` or `data`;
/// responses always use `payload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EnvelopeBody {
    /// base64(nonce || ciphertext || tag)
    #[serde(alias = "data")]
    pub payload: String,
}

impl EnvelopeBody {
    /// Seal `value` into an envelope body.
    pub fn seal<T: Serialize>(cipher: &EnvelopeCipher, value: &T) -> Result<Self, CipherError> {
        Ok(Self {
            payload: cipher.seal_json(value)?,
        })
    }
}

/// Extractor that decrypts an [`EnvelopeBody`] and deserializes the inner JSON.
pub struct SealedJson<T>(pub T);

impl<T> FromRequest<AppState> for SealedJson<T>
where
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let Json(envelope) = Json::<EnvelopeBody>::from_request(req, state)
            .await
            .map_err(|rejection| {
                debug!(error = %rejection, "rejected envelope body");
                ApiError::bad_request("bad request (missing payload)")
            })?;

        let plaintext = state.cipher.decrypt(&envelope.payload).map_err(|e| {
            debug!(error = %e, "envelope decryption failed");
            ApiError::unauthorized("failed to decrypt payload")
        })?;

        let inner = serde_json::from_slice(&plaintext)
            .map_err(|_| ApiError::bad_request("invalid payload structure"))?;

        Ok(SealedJson(inner))
    }
}
