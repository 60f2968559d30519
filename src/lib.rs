//! Password-based authenticated encryption for archive storage.
//!
//! Two coexisting container formats: a legacy single-shot [`container::v1`]
//! and a chunked streaming [`container::v2`] supporting constant-memory
//! encryption, streaming decryption, and random-access decryption of
//! individual chunks. [`reader::RandomAccessReader`] presents a V2 blob as a
//! byte-addressable source backed by an LRU [`cache`] of decrypted chunks.
//! [`bulk::BulkEncryptor`] amortizes Argon2id across many files via a
//! parallel worker pool, and [`archive`]/[`manifest`] describe the on-disk
//! archive layout that binds plaintext paths to encrypted blobs.

pub mod archive;
pub mod bulk;
pub mod cache;
pub mod cancel;
pub mod cli;
pub mod config;
pub mod container;
pub mod crypto;
pub mod error;
pub mod file;
pub mod manifest;
pub mod progress;
pub mod reader;
pub mod secret;

pub use cancel::{AtomicCancel, Cancellation, NoCancel};
pub use container::decrypt_unified;
pub use error::{CoreError, Result};
pub use reader::{RandomAccessReader, ReadAt, ReadOutcome};

/// Encrypts `plaintext` under `password` as a single-shot V1 container.
pub fn encrypt_bytes(plaintext: &[u8], password: &str) -> Result<Vec<u8>> {
    container::v1::encrypt(plaintext, password)
}

/// Decrypts a V1 or V2 container, dispatching on its version field.
pub fn decrypt_bytes(container_bytes: &[u8], password: &str) -> Result<Vec<u8>> {
    container::decrypt_unified(container_bytes, password)
}

/// Stream-encrypts `reader` into `writer` as a V2 container.
pub fn encrypt_stream<R: std::io::Read, W: std::io::Write>(
    reader: R,
    writer: W,
    password: &str,
    chunk_size: Option<u32>,
    cancel: &dyn Cancellation,
) -> Result<()> {
    container::v2::encrypt_stream(reader, writer, password, chunk_size, cancel)
}

/// Stream-decrypts a V2 container from `reader` into `writer`.
pub fn decrypt_stream<R: std::io::Read, W: std::io::Write>(
    reader: R,
    password: &str,
    writer: W,
    cancel: &dyn Cancellation,
) -> Result<()> {
    container::v2::decrypt_stream(reader, password, writer, cancel)
}
