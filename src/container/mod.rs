//! Container codecs: legacy single-shot V1 and chunked streaming V2.
//!
//! Callers that only need "decrypt whatever this is" should use
//! [`decrypt_unified`], which validates the magic, dispatches on the version
//! field, and never requires the caller to know which format produced the
//! bytes.

pub mod v1;
pub mod v2;

use crate::cancel::NoCancel;
use crate::config::{MAGIC, VERSION_V1, VERSION_V2};
use crate::error::{CoreError, Result};

/// Decrypts a V1 or V2 container, dispatching on its version field.
///
/// Any input shorter than the smallest possible header, or one whose first
/// four bytes are not the magic, is rejected as `InvalidMagic` per the
/// on-disk contract (an undersized input never reaches the version check).
pub fn decrypt_unified(container: &[u8], password: &str) -> Result<Vec<u8>> {
    if container.len() < 8 || &container[0..4] != MAGIC {
        return Err(CoreError::InvalidMagic);
    }

    let version = u32::from_le_bytes(container[4..8].try_into().unwrap());
    match version {
        VERSION_V1 => v1::decrypt(container, password),
        VERSION_V2 => {
            let mut out = Vec::new();
            v2::decrypt_stream(container, password, &mut out, &NoCancel)?;
            Ok(out)
        }
        other => Err(CoreError::InvalidVersion(other)),
    }
}
