//! V2 container: chunked streaming AEAD with per-chunk nonce derivation and
//! random-access decryption of a single chunk.

use std::io::{Read, Seek, SeekFrom, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

pub use crate::cancel::{Cancellation, NoCancel};
use crate::config::{
    DEFAULT_CHUNK_SIZE, KEY_LEN, MAGIC, NONCE_LEN, SALT_LEN, TAG_LEN, VERSION_V2, V2_HEADER_LEN,
};
use crate::crypto::aead::Aead256Gcm;
use crate::crypto::derive::{derive_key, random_bytes};
use crate::error::{CoreError, Result};

/// Parsed V2 header: magic/version validated, fields extracted.
#[derive(Clone, Copy)]
pub struct V2Header {
    pub salt: [u8; SALT_LEN],
    pub base_nonce: [u8; NONCE_LEN],
    pub chunk_size: u32,
}

impl V2Header {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < V2_HEADER_LEN || &bytes[0..4] != MAGIC {
            return Err(CoreError::InvalidMagic);
        }
        let version = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
        if version != VERSION_V2 {
            return Err(CoreError::InvalidVersion(version));
        }

        let salt: [u8; SALT_LEN] = bytes[8..8 + SALT_LEN].try_into().unwrap();
        let nonce_start = 8 + SALT_LEN;
        let base_nonce: [u8; NONCE_LEN] =
            bytes[nonce_start..nonce_start + NONCE_LEN].try_into().unwrap();
        let size_start = nonce_start + NONCE_LEN;
        let chunk_size = u32::from_le_bytes(bytes[size_start..size_start + 4].try_into().unwrap());
        if chunk_size == 0 {
            return Err(CoreError::InvalidParameter("chunk size must be nonzero"));
        }

        Ok(Self { salt, base_nonce, chunk_size })
    }

    fn write(&self) -> [u8; V2_HEADER_LEN] {
        let mut out = [0u8; V2_HEADER_LEN];
        out[0..4].copy_from_slice(MAGIC);
        out[4..8].copy_from_slice(&VERSION_V2.to_le_bytes());
        out[8..8 + SALT_LEN].copy_from_slice(&self.salt);
        let nonce_start = 8 + SALT_LEN;
        out[nonce_start..nonce_start + NONCE_LEN].copy_from_slice(&self.base_nonce);
        let size_start = nonce_start + NONCE_LEN;
        out[size_start..size_start + 4].copy_from_slice(&self.chunk_size.to_le_bytes());
        out
    }
}

/// Derives the per-chunk nonce: the base nonce's first 8 bytes XORed with the
/// little-endian chunk index; the last 4 bytes are carried unchanged.
pub fn chunk_nonce(base_nonce: &[u8; NONCE_LEN], index: u64) -> [u8; NONCE_LEN] {
    let mut nonce = *base_nonce;
    let prefix = u64::from_le_bytes(base_nonce[0..8].try_into().unwrap()) ^ index;
    nonce[0..8].copy_from_slice(&prefix.to_le_bytes());
    nonce
}

/// Streams `reader` through V2 encryption into `writer`, writing the header
/// first, then one sealed chunk per `chunk_size`-or-fewer bytes read, then
/// the four-byte end sentinel. Cancellation is checked once per chunk.
pub fn encrypt_stream<R: Read, W: Write>(
    reader: R,
    writer: W,
    password: &str,
    chunk_size: Option<u32>,
    cancel: &dyn Cancellation,
) -> Result<()> {
    let salt: [u8; SALT_LEN] = random_bytes();
    let key = derive_key(password.as_bytes(), &salt)?;
    encrypt_stream_with_key(reader, writer, &key, &salt, chunk_size, cancel)
}

/// Streams `reader` through V2 encryption using an already-derived `key`,
/// storing `salt` in the header verbatim. Lets callers that amortize
/// Argon2id across many files (see [`crate::bulk`]) skip re-deriving the
/// key per file.
pub fn encrypt_stream_with_key<R: Read, W: Write>(
    mut reader: R,
    mut writer: W,
    key: &[u8; KEY_LEN],
    salt: &[u8; SALT_LEN],
    chunk_size: Option<u32>,
    cancel: &dyn Cancellation,
) -> Result<()> {
    let chunk_size = chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE);
    if chunk_size == 0 {
        return Err(CoreError::InvalidParameter("chunk size must be nonzero"));
    }

    let base_nonce: [u8; NONCE_LEN] = random_bytes();
    let aead = Aead256Gcm::new(key);

    let header = V2Header { salt: *salt, base_nonce, chunk_size };
    writer.write_all(&header.write())?;

    let mut buf = vec![0u8; chunk_size as usize];
    let mut index: u64 = 0;
    loop {
        if cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }

        let n = read_up_to(&mut reader, &mut buf)?;
        if n == 0 {
            break;
        }

        let nonce = chunk_nonce(&base_nonce, index);
        let ciphertext = aead.seal(&nonce, &buf[..n])?;
        writer.write_u32::<LittleEndian>(n as u32)?;
        writer.write_all(&ciphertext)?;
        index += 1;
    }

    writer.write_all(&crate::config::END_SENTINEL)?;
    writer.flush()?;
    Ok(())
}

/// Fills `buf` by repeated reads until it is full or the source is
/// exhausted, returning the number of bytes actually filled.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

/// Streams a V2 container from `reader` through decryption into `writer`.
/// Authentication failures abort the stream uniformly; framing violations
/// (truncated length/ciphertext, over-sized chunk) surface as distinct
/// errors. Cancellation is checked once per chunk.
pub fn decrypt_stream<R: Read, W: Write>(
    mut reader: R,
    password: &str,
    mut writer: W,
    cancel: &dyn Cancellation,
) -> Result<()> {
    let mut header_bytes = [0u8; V2_HEADER_LEN];
    reader
        .read_exact(&mut header_bytes)
        .map_err(|_| CoreError::Truncated("container shorter than the V2 header"))?;
    let header = V2Header::parse(&header_bytes)?;

    let key = derive_key(password.as_bytes(), &header.salt)?;
    let aead = Aead256Gcm::new(&key);

    let mut index: u64 = 0;
    loop {
        if cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }

        let length = match reader.read_u32::<LittleEndian>() {
            Ok(length) => length,
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Err(CoreError::Truncated("expected chunk length or end sentinel"));
            }
            Err(e) => return Err(e.into()),
        };
        if length == 0 {
            break;
        }
        if length > header.chunk_size {
            return Err(CoreError::ChunkTooLarge { got: length, max: header.chunk_size });
        }

        let mut ciphertext = vec![0u8; length as usize + TAG_LEN];
        reader
            .read_exact(&mut ciphertext)
            .map_err(|_| CoreError::Truncated("truncated chunk ciphertext"))?;

        let nonce = chunk_nonce(&header.base_nonce, index);
        let plaintext = aead.open(&nonce, &ciphertext)?;
        writer.write_all(&plaintext)?;
        index += 1;
    }

    writer.flush()?;
    Ok(())
}

/// Random-access decrypt of chunk `index` in a seekable V2 container.
///
/// `expected_len`, when `Some` and nonzero, must match the plaintext length
/// recorded at the chunk's offset (drawn from manifest-recorded
/// `original_size`/`chunk_count` by the caller for the last chunk). `None`
/// or `Some(0)` both mean "accept whatever length the framing reports, up to
/// `chunk_size`" — zero is never treated as an assertion that the chunk is
/// empty, since a zero length read from the stream itself always means the
/// end sentinel was hit.
pub fn decrypt_chunk<S: Read + Seek>(
    source: &mut S,
    key: &[u8; KEY_LEN],
    header: &V2Header,
    index: i64,
    expected_len: Option<u32>,
) -> Result<Vec<u8>> {
    if index < 0 {
        return Err(CoreError::InvalidParameter("chunk index must not be negative"));
    }
    let index = index as u64;

    let stride = 4u64 + header.chunk_size as u64 + TAG_LEN as u64;
    let offset = V2_HEADER_LEN as u64 + index * stride;
    source.seek(SeekFrom::Start(offset))?;

    let length = source.read_u32::<LittleEndian>().map_err(|_| CoreError::DecryptionFailed)?;
    if length == 0 {
        return Err(CoreError::DecryptionFailed);
    }
    if length > header.chunk_size {
        return Err(CoreError::ChunkTooLarge { got: length, max: header.chunk_size });
    }
    if let Some(expected) = expected_len
        && expected != 0
        && expected != length
    {
        return Err(CoreError::LengthMismatch { expected, got: length });
    }

    let mut ciphertext = vec![0u8; length as usize + TAG_LEN];
    source
        .read_exact(&mut ciphertext)
        .map_err(|_| CoreError::Truncated("truncated chunk ciphertext"))?;

    let nonce = chunk_nonce(&header.base_nonce, index);
    Aead256Gcm::new(key).open(&nonce, &ciphertext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn chunk_nonce_is_collision_free_within_container() {
        let base = [5u8; NONCE_LEN];
        let n0 = chunk_nonce(&base, 0);
        let n1 = chunk_nonce(&base, 1);
        assert_ne!(n0, n1);
        assert_eq!(n0[8..12], base[8..12]);
        assert_eq!(n1[8..12], base[8..12]);
    }

    #[test]
    fn large_buffer_round_trips_with_two_chunks() {
        let plaintext: Vec<u8> = (0..1_572_864usize).map(|i| (i % 256) as u8).collect();
        let mut container = Vec::new();
        encrypt_stream(&plaintext[..], &mut container, "large-data-test!", None, &NoCancel)
            .unwrap();

        let mut out = Vec::new();
        decrypt_stream(&container[..], "large-data-test!", &mut out, &NoCancel).unwrap();
        assert_eq!(out, plaintext);

        let header = V2Header::parse(&container).unwrap();
        let chunk_count = (plaintext.len() as u64).div_ceil(header.chunk_size as u64);
        assert_eq!(chunk_count, 2);
        let last_len = plaintext.len() as u64 - (chunk_count - 1) * header.chunk_size as u64;
        assert_eq!(last_len, 524_288);
    }

    #[test]
    fn random_access_matches_streaming_per_chunk() {
        let plaintext: Vec<u8> = (0..(1_048_576 + 123)).map(|i| (i % 256) as u8).collect();
        let mut container = Vec::new();
        encrypt_stream(&plaintext[..], &mut container, "chunk-test!", None, &NoCancel).unwrap();

        let header = V2Header::parse(&container).unwrap();
        let key = derive_key(b"chunk-test!", &header.salt).unwrap();
        let mut cursor = Cursor::new(&container);

        let chunk0 = decrypt_chunk(&mut cursor, &key, &header, 0, Some(1_048_576)).unwrap();
        assert_eq!(chunk0, &plaintext[0..1_048_576]);

        let chunk1 = decrypt_chunk(&mut cursor, &key, &header, 1, Some(123)).unwrap();
        assert_eq!(chunk1, &plaintext[1_048_576..]);

        assert!(matches!(
            decrypt_chunk(&mut cursor, &key, &header, 2, None),
            Err(CoreError::DecryptionFailed)
        ));
        assert!(matches!(
            decrypt_chunk(&mut cursor, &key, &header, -1, None),
            Err(CoreError::InvalidParameter(_))
        ));
    }

    #[test]
    fn truncated_container_is_framing_error() {
        let mut container = Vec::new();
        encrypt_stream(&b"test data"[..], &mut container, "pw", None, &NoCancel).unwrap();
        container.truncate(container.len() - 10);

        let mut out = Vec::new();
        assert!(matches!(
            decrypt_stream(&container[..], "pw", &mut out, &NoCancel),
            Err(CoreError::Truncated(_))
        ));
    }

    #[test]
    fn corrupted_chunk_length_is_framing_error() {
        let mut container = Vec::new();
        encrypt_stream(&b"short"[..], &mut container, "pw", None, &NoCancel).unwrap();

        let header = V2Header::parse(&container).unwrap();
        let bad_len = header.chunk_size + 1;
        container[V2_HEADER_LEN..V2_HEADER_LEN + 4].copy_from_slice(&bad_len.to_le_bytes());

        let mut out = Vec::new();
        assert!(matches!(
            decrypt_stream(&container[..], "pw", &mut out, &NoCancel),
            Err(CoreError::ChunkTooLarge { .. })
        ));
    }
}
