// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! AES-GCM envelope cipher.
//!
//! ## Wire Format
//!
//! ```text
//! base64( nonce (12 bytes) || ciphertext || tag (16 bytes) )
//! ```
//!
//! The key length selects the algorithm: 16 bytes → AES-128-GCM,
//! 32 bytes → AES-256-GCM. Every encryption draws a fresh nonce from the
//! operating system CSPRNG.

use base64ct::{Base64, Encoding};
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_128_GCM, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{de::DeserializeOwned, Serialize};

/// Envelope cipher errors.
///
/// Decryption failures are deliberately collapsed into a single variant:
/// callers cannot tell a truncated blob from a forged tag or a wrong key.
#[derive(Debug, thiserror::Error)]
pub enum CipherError {
    #[error("envelope key must be 16 or 32 bytes, got {0}")]
    InvalidKey(usize),

    #[error("random source unavailable")]
    Randomness,

    #[error("encryption failed")]
    Encrypt,

    #[error("decryption failed")]
    Decrypt,

    #[error("payload serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Process-wide AEAD cipher for sensitive request/response bodies.
pub struct EnvelopeCipher {
    key: LessSafeKey,
    rng: SystemRandom,
}

impl EnvelopeCipher {
    /// Build a cipher from raw key bytes.
    pub fn new(key: &[u8]) -> Result<Self, CipherError> {
        let algorithm = match key.len() {
            16 => &AES_128_GCM,
            32 => &AES_256_GCM,
            other => return Err(CipherError::InvalidKey(other)),
        };

        let unbound = UnboundKey::new(algorithm, key).map_err(|_| CipherError::InvalidKey(key.len()))?;

        Ok(Self {
            key: LessSafeKey::new(unbound),
            rng: SystemRandom::new(),
        })
    }

    /// Encrypt `plaintext` and return `base64(nonce || ciphertext || tag)`.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<String, CipherError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| CipherError::Randomness)?;

        let mut in_out = plaintext.to_vec();
        self.key
            .seal_in_place_append_tag(
                Nonce::assume_unique_for_key(nonce_bytes),
                Aad::empty(),
                &mut in_out,
            )
            .map_err(|_| CipherError::Encrypt)?;

        let mut blob = Vec::with_capacity(NONCE_LEN + in_out.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&in_out);

        Ok(Base64::encode_string(&blob))
    }

    /// Decrypt a blob produced by [`EnvelopeCipher::encrypt`].
    pub fn decrypt(&self, encoded: &str) -> Result<Vec<u8>, CipherError> {
        let blob = Base64::decode_vec(encoded.trim()).map_err(|_| CipherError::Decrypt)?;

        if blob.len() < NONCE_LEN {
            return Err(CipherError::Decrypt);
        }

        let (nonce_bytes, sealed) = blob.split_at(NONCE_LEN);
        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes).map_err(|_| CipherError::Decrypt)?;

        let mut in_out = sealed.to_vec();
        let plaintext = self
            .key
            .open_in_place(nonce, Aad::empty(), &mut in_out)
            .map_err(|_| CipherError::Decrypt)?;

        Ok(plaintext.to_vec())
    }

    /// Serialize `value` as JSON and encrypt it.
    pub fn seal_json<T: Serialize>(&self, value: &T) -> Result<String, CipherError> {
        let plaintext = serde_json::to_vec(value)?;
        self.encrypt(&plaintext)
    }

    /// Decrypt and deserialize a JSON payload.
    pub fn open_json<T: DeserializeOwned>(&self, encoded: &str) -> Result<T, CipherError> {
        let plaintext = self.decrypt(encoded)?;
        Ok(serde_json::from_slice(&plaintext)?)
    }
}

impl std::fmt::Debug for EnvelopeCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvelopeCipher")
            .field("algorithm", self.key.algorithm())
            .finish_non_exhaustive()
    }
}
