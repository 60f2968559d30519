//! AES-256-GCM sealing/opening with a caller-supplied nonce.
//!
//! Unlike a general-purpose AEAD wrapper, the nonce is never generated or
//! prepended here: every container format derives or stores its own nonces,
//! so this primitive stays a thin, stateless wrapper around the cipher.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};

use crate::config::{KEY_LEN, NONCE_LEN};
use crate::error::{CoreError, Result};

pub struct Aead256Gcm {
    cipher: Aes256Gcm,
}

impl Aead256Gcm {
    pub fn new(key: &[u8; KEY_LEN]) -> Self {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
        Self { cipher }
    }

    /// Seals `plaintext` under `nonce`, returning ciphertext-with-tag. Empty
    /// associated data, as the on-disk contract requires.
    pub fn seal(&self, nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
        self.cipher
            .encrypt(Nonce::from_slice(nonce), plaintext)
            .map_err(|_| CoreError::DecryptionFailed)
    }

    /// Opens `ciphertext` (with trailing tag) under `nonce`. Any failure,
    /// whether wrong key or tampered bytes, surfaces uniformly.
    pub fn open(&self, nonce: &[u8; NONCE_LEN], ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CoreError::DecryptionFailed)
    }
}
