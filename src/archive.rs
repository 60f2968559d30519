//! Archive directory layout: `data.enc`, `manifest.enc`, and an `encrypted/`
//! directory of opaque-named blobs.

use std::fs;
use std::path::PathBuf;

use crate::config::{ARCHIVE_BLOB_DIR, ARCHIVE_DATA_FILE, ARCHIVE_MANIFEST_FILE, KEY_LEN, V2_HEADER_LEN};
use crate::container::v1;
use crate::container::v2::V2Header;
use crate::crypto::derive::derive_key;
use crate::error::{CoreError, Result};
use crate::manifest::Manifest;

pub struct ArchiveLayout {
    root: PathBuf,
}

impl ArchiveLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn data_path(&self) -> PathBuf {
        self.root.join(ARCHIVE_DATA_FILE)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(ARCHIVE_MANIFEST_FILE)
    }

    pub fn blob_dir(&self) -> PathBuf {
        self.root.join(ARCHIVE_BLOB_DIR)
    }

    pub fn blob_path(&self, enc_name: &str) -> PathBuf {
        self.blob_dir().join(enc_name)
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(self.blob_dir())?;
        Ok(())
    }

    /// Reads and decrypts `manifest.enc` (always a V1 container, as its
    /// payload is small metadata rather than bulk data) and parses its JSON.
    pub fn read_manifest(&self, password: &str) -> Result<Manifest> {
        let container = fs::read(self.manifest_path())?;
        let json = v1::decrypt(&container, password)?;
        Manifest::parse(&json)
    }

    pub fn write_manifest(&self, manifest: &Manifest, password: &str) -> Result<()> {
        let json = manifest.to_json()?;
        let container = v1::encrypt(&json, password)?;
        fs::write(self.manifest_path(), container)?;
        Ok(())
    }

    /// Derives the archive key once by reading the V2 header of any blob
    /// named in `manifest` to obtain its salt, then running Argon2id on
    /// `password`.
    pub fn derive_key_from_any_blob(&self, manifest: &Manifest, password: &str) -> Result<[u8; KEY_LEN]> {
        let enc_name = match manifest {
            Manifest::V2(m) => m.entries.values().next().map(|e| e.enc_name.clone()),
            Manifest::V1(m) => m.values().next().cloned(),
        }
        .ok_or(CoreError::InvalidParameter("archive manifest has no entries"))?;

        let mut header_bytes = vec![0u8; V2_HEADER_LEN];
        let full = fs::read(self.blob_path(&enc_name))?;
        if full.len() < V2_HEADER_LEN {
            return Err(CoreError::InvalidMagic);
        }
        header_bytes.copy_from_slice(&full[..V2_HEADER_LEN]);

        let header = V2Header::parse(&header_bytes)?;
        derive_key(password.as_bytes(), &header.salt)
    }
}
