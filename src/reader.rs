//! Random-access reader over a V2 container: translates `read_at(offset,
//! len)` into chunk fetches, consulting and populating a shared LRU cache of
//! decrypted chunks.

use std::io::{self, Read, Seek, SeekFrom};
use std::sync::Mutex;

use byteorder::{LittleEndian, ByteOrder};

use crate::cache::SharedChunkCache;
use crate::config::{KEY_LEN, TAG_LEN, V2_HEADER_LEN};
use crate::container::v2::{V2Header, chunk_nonce};
use crate::crypto::aead::Aead256Gcm;
use crate::crypto::derive::derive_key;
use crate::error::{CoreError, Result};

/// A source that supports reading at an arbitrary byte offset without
/// disturbing any other logical reader's position.
pub trait ReadAt: Send + Sync {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;
}

/// Adapts any `Read + Seek` source into [`ReadAt`] by serializing access
/// behind a mutex, for sources with no native positioned-read support.
pub struct SerializedReadAt<S> {
    inner: Mutex<S>,
}

impl<S> SerializedReadAt<S> {
    pub fn new(source: S) -> Self {
        Self { inner: Mutex::new(source) }
    }
}

impl<S: Read + Seek + Send> ReadAt for SerializedReadAt<S> {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let mut guard = self.inner.lock().unwrap();
        guard.seek(SeekFrom::Start(offset))?;
        guard.read(buf)
    }
}

fn read_at_exact<S: ReadAt>(source: &S, offset: u64, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = source.read_at(offset + filled as u64, &mut buf[filled..])?;
        if n == 0 {
            return Err(CoreError::Truncated("unexpected end of source"));
        }
        filled += n;
    }
    Ok(())
}

/// Outcome of a single [`RandomAccessReader::read_at`] call.
pub struct ReadOutcome {
    pub bytes_read: usize,
    pub eof: bool,
}

/// Presents a V2-encrypted blob as a byte-addressable plaintext source.
///
/// Stateless apart from the recorded chunk count; safe to hold long-lived
/// and call from many concurrent consumers as long as `S`'s `read_at` is
/// safe to call concurrently (true of [`SerializedReadAt`] by construction).
pub struct RandomAccessReader<S: ReadAt> {
    source: S,
    key: [u8; KEY_LEN],
    header: V2Header,
    blob_id: String,
    original_size: u64,
    chunk_count: u64,
    cache: SharedChunkCache,
}

impl<S: ReadAt> RandomAccessReader<S> {
    /// Opens a reader given the blob's parsed V2 header and its
    /// manifest-recorded plaintext size and chunk count.
    pub fn open(
        source: S,
        password: &str,
        header: V2Header,
        blob_id: impl Into<String>,
        original_size: u64,
        chunk_count: u64,
        cache: SharedChunkCache,
    ) -> Result<Self> {
        let key = derive_key(password.as_bytes(), &header.salt)?;
        Ok(Self { source, key, header, blob_id: blob_id.into(), original_size, chunk_count, cache })
    }

    /// Expected plaintext length of `index`: the full chunk size for every
    /// chunk but the last, whose length is `original_size - (chunk_count-1)
    /// * chunk_size`.
    fn expected_len_for(&self, index: u64) -> u32 {
        if index + 1 == self.chunk_count {
            (self.original_size - index * u64::from(self.header.chunk_size)) as u32
        } else {
            self.header.chunk_size
        }
    }

    fn fetch_chunk(&self, index: u64) -> Result<Vec<u8>> {
        let cache_key = (self.blob_id.clone(), index);
        if let Some(cached) = self.cache.get(&cache_key) {
            return Ok(cached);
        }

        let expected_len = self.expected_len_for(index);
        let stride = 4u64 + u64::from(self.header.chunk_size) + TAG_LEN as u64;
        let offset = V2_HEADER_LEN as u64 + index * stride;

        let mut len_bytes = [0u8; 4];
        read_at_exact(&self.source, offset, &mut len_bytes)?;
        let length = LittleEndian::read_u32(&len_bytes);
        if length == 0 {
            return Err(CoreError::DecryptionFailed);
        }
        if length > self.header.chunk_size {
            return Err(CoreError::ChunkTooLarge { got: length, max: self.header.chunk_size });
        }
        if expected_len != 0 && length != expected_len {
            return Err(CoreError::LengthMismatch { expected: expected_len, got: length });
        }

        let mut ciphertext = vec![0u8; length as usize + TAG_LEN];
        read_at_exact(&self.source, offset + 4, &mut ciphertext)?;

        let nonce = chunk_nonce(&self.header.base_nonce, index);
        let plaintext = Aead256Gcm::new(&self.key).open(&nonce, &ciphertext)?;
        self.cache.insert(cache_key, plaintext.clone());
        Ok(plaintext)
    }

    /// Reads up to `buf.len()` plaintext bytes starting at `offset`. Short
    /// reads at end-of-plaintext return the bytes available with `eof` set;
    /// a read entirely past end-of-plaintext returns zero bytes with `eof`
    /// set immediately.
    pub fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<ReadOutcome> {
        if offset >= self.original_size || buf.is_empty() {
            return Ok(ReadOutcome { bytes_read: 0, eof: offset >= self.original_size });
        }

        let chunk_size = u64::from(self.header.chunk_size);
        let end = (offset + buf.len() as u64).min(self.original_size);
        let start_chunk = offset / chunk_size;
        let end_chunk = (end - 1) / chunk_size;

        let mut written = 0usize;
        for index in start_chunk..=end_chunk {
            let chunk = self.fetch_chunk(index)?;
            let chunk_start = index * chunk_size;
            let lo = (offset.max(chunk_start) - chunk_start) as usize;
            let hi = (end.min(chunk_start + chunk.len() as u64) - chunk_start) as usize;
            let slice = &chunk[lo..hi];
            buf[written..written + slice.len()].copy_from_slice(slice);
            written += slice.len();
        }

        Ok(ReadOutcome { bytes_read: written, eof: end >= self.original_size })
    }
}
