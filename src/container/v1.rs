//! V1 container: single-shot AES-256-GCM over the whole plaintext.
//!
//! Retained only for compatibility with previously written archives and
//! manifests; new archives use V2 (see [`super::v2`]).

use crate::config::{KEY_LEN, MAGIC, NONCE_LEN, SALT_LEN, VERSION_V1, V1_HEADER_LEN};
use crate::crypto::aead::Aead256Gcm;
use crate::crypto::derive::{derive_key, random_bytes};
use crate::error::{CoreError, Result};

/// Encrypts `plaintext` under `password`, producing a full V1 container:
/// magic ‖ version ‖ salt ‖ nonce ‖ ciphertext-with-tag.
pub fn encrypt(plaintext: &[u8], password: &str) -> Result<Vec<u8>> {
    let salt: [u8; SALT_LEN] = random_bytes();
    let key = derive_key(password.as_bytes(), &salt)?;
    encrypt_with_key(plaintext, &key, &salt)
}

/// Encrypts `plaintext` under an already-derived `key`, storing `salt` in
/// the header verbatim. Lets callers that amortize Argon2id across many
/// files (see [`crate::bulk`]) skip re-deriving the key per file.
pub fn encrypt_with_key(
    plaintext: &[u8],
    key: &[u8; KEY_LEN],
    salt: &[u8; SALT_LEN],
) -> Result<Vec<u8>> {
    let nonce: [u8; NONCE_LEN] = random_bytes();
    let ciphertext = Aead256Gcm::new(key).seal(&nonce, plaintext)?;

    let mut out = Vec::with_capacity(V1_HEADER_LEN + ciphertext.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&VERSION_V1.to_le_bytes());
    out.extend_from_slice(salt);
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypts a V1 container. Undersized input or a mismatched magic surfaces
/// as `InvalidMagic`; a version field other than 1 surfaces as
/// `InvalidVersion`; any authentication failure (wrong password or tampered
/// bytes) surfaces uniformly as `DecryptionFailed`.
pub fn decrypt(container: &[u8], password: &str) -> Result<Vec<u8>> {
    if container.len() < V1_HEADER_LEN || &container[0..4] != MAGIC {
        return Err(CoreError::InvalidMagic);
    }

    let version = u32::from_le_bytes(container[4..8].try_into().unwrap());
    if version != VERSION_V1 {
        return Err(CoreError::InvalidVersion(version));
    }

    let salt: [u8; SALT_LEN] = container[8..8 + SALT_LEN].try_into().unwrap();
    let nonce_start = 8 + SALT_LEN;
    let nonce: [u8; NONCE_LEN] =
        container[nonce_start..nonce_start + NONCE_LEN].try_into().unwrap();
    let ciphertext = &container[V1_HEADER_LEN..];

    let key: [u8; KEY_LEN] = derive_key(password.as_bytes(), &salt)?;
    Aead256Gcm::new(&key).open(&nonce, ciphertext)
}

/// Decrypts a V1 container using an already-derived `key`, skipping the
/// Argon2id re-derivation. For callers (like [`crate::bulk::BulkEncryptor`])
/// that already hold the key matching the container's salt.
pub fn open_with_key(container: &[u8], key: &[u8; KEY_LEN]) -> Result<Vec<u8>> {
    if container.len() < V1_HEADER_LEN || &container[0..4] != MAGIC {
        return Err(CoreError::InvalidMagic);
    }

    let version = u32::from_le_bytes(container[4..8].try_into().unwrap());
    if version != VERSION_V1 {
        return Err(CoreError::InvalidVersion(version));
    }

    let nonce_start = 8 + SALT_LEN;
    let nonce: [u8; NONCE_LEN] =
        container[nonce_start..nonce_start + NONCE_LEN].try_into().unwrap();
    let ciphertext = &container[V1_HEADER_LEN..];

    Aead256Gcm::new(key).open(&nonce, ciphertext)
}
