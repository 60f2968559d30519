//! Cryptographic primitives: Argon2id key derivation and AES-256-GCM AEAD.

pub mod aead;
pub mod derive;

pub use aead::Aead256Gcm;
pub use derive::{derive_key, random_bytes};
