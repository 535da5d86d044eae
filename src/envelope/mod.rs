// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Envelope Encryption
//!
//! Sensitive endpoints exchange their whole body as one AEAD blob:
//!
//! ```text
//! {"payload": "<base64(nonce || ciphertext || tag)>"}
//! ```
//!
//! The inner plaintext is ordinary JSON for the wrapped operation.
//! Non-sensitive endpoints exchange plain JSON.

pub mod cipher;
pub mod sealed;

pub use cipher::{CipherError, EnvelopeCipher};
pub use sealed::{EnvelopeBody, SealedJson};
