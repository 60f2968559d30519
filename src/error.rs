//! Error taxonomy.
//!
//! Framing, authentication, I/O, cancellation, and parameter errors are kept
//! as distinct variants so callers can match on identity instead of message
//! text. Authentication failures never reveal which chunk or which of
//! magic/version/tag caused them.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid magic bytes")]
    InvalidMagic,

    #[error("unsupported container version: {0}")]
    InvalidVersion(u32),

    #[error("decryption failed")]
    DecryptionFailed,

    #[error("operation cancelled")]
    Cancelled,

    #[error("chunk length {got} exceeds header chunk size {max}")]
    ChunkTooLarge { got: u32, max: u32 },

    #[error("chunk length mismatch: expected {expected}, got {got}")]
    LengthMismatch { expected: u32, got: u32 },

    #[error("truncated container: {0}")]
    Truncated(&'static str),

    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
