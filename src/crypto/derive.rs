//! Argon2id key derivation and CSPRNG byte generation.

use argon2::{Argon2, Params, Version};
use rand::Rng;

use crate::config::{ARGON_MEMORY, ARGON_THREADS, ARGON_TIME, KEY_LEN, SALT_LEN};
use crate::error::{CoreError, Result};

/// Derives a 32-byte key from a password and a 32-byte salt using Argon2id
/// with the fixed on-disk-contract parameters (t=3, m=64 MiB, p=4).
pub fn derive_key(password: &[u8], salt: &[u8; SALT_LEN]) -> Result<[u8; KEY_LEN]> {
    if password.is_empty() {
        return Err(CoreError::InvalidParameter("password cannot be empty"));
    }

    let params = Params::new(ARGON_MEMORY, ARGON_TIME, ARGON_THREADS, Some(KEY_LEN))
        .map_err(|_| CoreError::InvalidParameter("invalid Argon2 parameters"))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

    let mut key = [0u8; KEY_LEN];
    argon2
        .hash_password_into(password, salt, &mut key)
        .map_err(|_| CoreError::InvalidParameter("key derivation failed"))?;

    Ok(key)
}

/// Generates N cryptographically secure random bytes.
pub fn random_bytes<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    rand::rng().fill(&mut bytes);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_key_is_deterministic() {
        let salt = [7u8; SALT_LEN];
        let a = derive_key(b"hunter2", &salt).unwrap();
        let b = derive_key(b"hunter2", &salt).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn derive_key_differs_by_salt() {
        let a = derive_key(b"hunter2", &[1u8; SALT_LEN]).unwrap();
        let b = derive_key(b"hunter2", &[2u8; SALT_LEN]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn derive_key_rejects_empty_password() {
        assert!(derive_key(b"", &[0u8; SALT_LEN]).is_err());
    }

    #[test]
    fn random_bytes_are_not_constant() {
        let a: [u8; 32] = random_bytes();
        let b: [u8; 32] = random_bytes();
        assert_ne!(a, b);
    }
}
