//! Streaming file-based encrypt/decrypt with fsync and cleanup-on-error.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::cancel::Cancellation;
use crate::config::{FILE_WRITE_BUFFER_SIZE, MAGIC};
use crate::container::v2;
use crate::error::Result;

fn open_source(path: &Path) -> Result<BufReader<File>> {
    Ok(BufReader::new(File::open(path)?))
}

fn create_destination(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().write(true).create(true).truncate(true).open(path)?;
    Ok(BufWriter::with_capacity(FILE_WRITE_BUFFER_SIZE, file))
}

/// Streams `source` through V2 encryption into `destination`. Any error
/// deletes `destination` to avoid leaving a torn output behind.
pub fn encrypt_file(
    source: &Path,
    destination: &Path,
    password: &str,
    chunk_size: Option<u32>,
    cancel: &dyn Cancellation,
) -> Result<()> {
    let reader = open_source(source)?;
    let mut writer = create_destination(destination)?;

    let result = v2::encrypt_stream(reader, &mut writer, password, chunk_size, cancel)
        .and_then(|()| writer.flush().map_err(Into::into))
        .and_then(|()| writer.get_ref().sync_all().map_err(Into::into));

    if result.is_err() {
        let _ = fs::remove_file(destination);
    }
    result
}

/// Streams `source` through V2 decryption into `destination`. Any error
/// deletes `destination` to avoid leaving a torn output behind.
pub fn decrypt_file(
    source: &Path,
    destination: &Path,
    password: &str,
    cancel: &dyn Cancellation,
) -> Result<()> {
    let reader = open_source(source)?;
    let mut writer = create_destination(destination)?;

    let result = v2::decrypt_stream(reader, password, &mut writer, cancel)
        .and_then(|()| writer.flush().map_err(Into::into))
        .and_then(|()| writer.get_ref().sync_all().map_err(Into::into));

    if result.is_err() {
        let _ = fs::remove_file(destination);
    }
    result
}

/// True iff `path`'s first four bytes equal the container magic `XGCR`.
pub fn is_encrypted(path: &Path) -> Result<bool> {
    let mut file = File::open(path)?;
    let mut buf = [0u8; 4];
    match file.read_exact(&mut buf) {
        Ok(()) => Ok(&buf == MAGIC),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e.into()),
    }
}
