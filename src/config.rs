//! Cryptographic and container constants.
//!
//! This module is the single source of truth for the on-disk contract: header
//! sizes, magic bytes, and Argon2id parameters here may never vary across
//! containers of a given format version without breaking every file already
//! written with this crate.

/// Magic bytes identifying a vaultstream container (V1 or V2).
pub const MAGIC: &[u8; 4] = b"XGCR";

/// Current legacy single-shot container format version.
pub const VERSION_V1: u32 = 1;

/// Current chunked streaming container format version.
pub const VERSION_V2: u32 = 2;

/// Argon2id time cost (number of passes).
pub const ARGON_TIME: u32 = 3;

/// Argon2id memory cost in KiB (64 MiB).
pub const ARGON_MEMORY: u32 = 64 * 1024;

/// Argon2id parallelism factor.
pub const ARGON_THREADS: u32 = 4;

/// Length of the derived key in bytes.
pub const KEY_LEN: usize = 32;

/// Length of the random salt used for key derivation in bytes.
pub const SALT_LEN: usize = 32;

/// Length of the AES-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Length of the AES-GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Size of the V1 header: magic(4) + version(4) + salt(32) + nonce(12).
pub const V1_HEADER_LEN: usize = 4 + 4 + SALT_LEN + NONCE_LEN;

/// Size of the V2 header: magic(4) + version(4) + salt(32) + base-nonce(12) + chunk-size(4).
pub const V2_HEADER_LEN: usize = 4 + 4 + SALT_LEN + NONCE_LEN + 4;

/// Default maximum plaintext size of a V2 chunk (1 MiB).
pub const DEFAULT_CHUNK_SIZE: u32 = 1024 * 1024;

/// Four zero bytes terminating a V2 chunk stream.
pub const END_SENTINEL: [u8; 4] = [0; 4];

/// Default viewer-side chunk cache capacity, in chunks.
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

/// Default worker count for the bulk encryptor's parallel pool.
pub const DEFAULT_WORKER_COUNT: usize = 4;

/// Archive data file name (holds the encrypted top-level dataset JSON).
pub const ARCHIVE_DATA_FILE: &str = "data.enc";

/// Archive manifest file name.
pub const ARCHIVE_MANIFEST_FILE: &str = "manifest.enc";

/// Archive directory holding opaque-named encrypted blobs.
pub const ARCHIVE_BLOB_DIR: &str = "encrypted";

/// Size of the buffered writer used by streaming file helpers (4 MiB).
pub const FILE_WRITE_BUFFER_SIZE: usize = 4 * 1024 * 1024;
