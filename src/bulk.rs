//! Bulk encryptor: caches an Argon2id-derived key and salt, plus a parallel
//! worker pool that encrypts many files under the shared key.

use std::collections::HashMap;
use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use flume::bounded;

use crate::cancel::Cancellation;
use crate::config::{DEFAULT_WORKER_COUNT, KEY_LEN, SALT_LEN};
use crate::container::v1;
use crate::container::v2;
use crate::crypto::derive::{derive_key, random_bytes};
use crate::error::Result;
use crate::secret::SecretBytes;

/// One unit of work for [`BulkEncryptor::run_parallel_v1`].
#[derive(Clone)]
pub struct Job {
    pub source_path: PathBuf,
    pub destination_path: PathBuf,
    pub plaintext_relative_path: String,
    pub encrypted_blob_name: String,
}

/// The union of successful manifest entries and collected per-file errors.
pub struct BulkResult {
    pub manifest: HashMap<String, String>,
    pub errors: Vec<(String, String)>,
}

pub type ProgressCallback = dyn Fn(usize, usize, &str) + Send + Sync;

/// Reuses one Argon2id-derived key and salt across many files, since key
/// derivation otherwise dominates per-file throughput.
pub struct BulkEncryptor {
    key: SecretBytes,
    salt: [u8; SALT_LEN],
}

impl BulkEncryptor {
    /// Derives a fresh salt and key from `password`.
    pub fn new(password: &str) -> Result<Self> {
        let salt: [u8; SALT_LEN] = random_bytes();
        Self::with_salt(password, salt)
    }

    /// Derives the key from `password` and an existing `salt`, for
    /// decryption contexts that already know the archive's salt.
    pub fn with_salt(password: &str, salt: [u8; SALT_LEN]) -> Result<Self> {
        let key = derive_key(password.as_bytes(), &salt)?;
        Ok(Self { key: SecretBytes::from_slice(&key), salt })
    }

    pub fn salt(&self) -> [u8; SALT_LEN] {
        self.salt
    }

    fn key_bytes(&self) -> [u8; KEY_LEN] {
        self.key.expose_secret().as_slice().try_into().expect("derived key is always KEY_LEN bytes")
    }

    pub fn encrypt_v1(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        v1::encrypt_with_key(plaintext, &self.key_bytes(), &self.salt)
    }

    pub fn decrypt_v1(&self, container: &[u8]) -> Result<Vec<u8>> {
        v1::open_with_key(container, &self.key_bytes())
    }

    pub fn encrypt_v2_stream<R: Read, W: Write>(
        &self,
        reader: R,
        writer: W,
        chunk_size: Option<u32>,
        cancel: &dyn Cancellation,
    ) -> Result<()> {
        v2::encrypt_stream_with_key(reader, writer, &self.key_bytes(), &self.salt, chunk_size, cancel)
    }

    /// Runs `jobs` across a fixed pool of worker threads (default 4 when
    /// `worker_count` is `None` or `0`). Each worker reads its source,
    /// V1-encrypts under the shared key, writes its destination, and
    /// records `plaintext_relative_path → encrypted_blob_name` into a shared
    /// manifest map. Per-file errors are collected and never abort sibling
    /// jobs. `progress`, if supplied, is invoked once per completed job with
    /// `(completed, total, plaintext_relative_path)`.
    pub fn run_parallel_v1(
        &self,
        jobs: Vec<Job>,
        worker_count: Option<usize>,
        progress: Option<Arc<ProgressCallback>>,
    ) -> BulkResult {
        let worker_count = worker_count.filter(|n| *n > 0).unwrap_or(DEFAULT_WORKER_COUNT);
        let total = jobs.len();

        let (tx, rx) = bounded::<Job>(worker_count * 2);
        let manifest = Arc::new(Mutex::new(HashMap::new()));
        let errors = Arc::new(Mutex::new(Vec::new()));
        let completed = Arc::new(AtomicUsize::new(0));
        let key = self.key_bytes();
        let salt = self.salt;

        let handles: Vec<_> = (0..worker_count)
            .map(|_| {
                let rx = rx.clone();
                let manifest = Arc::clone(&manifest);
                let errors = Arc::clone(&errors);
                let completed = Arc::clone(&completed);
                let progress = progress.clone();
                thread::spawn(move || {
                    for job in rx.iter() {
                        match run_one_v1(&job, &key, &salt) {
                            Ok(()) => {
                                manifest.lock().unwrap().insert(
                                    job.plaintext_relative_path.clone(),
                                    job.encrypted_blob_name.clone(),
                                );
                            }
                            Err(e) => {
                                errors
                                    .lock()
                                    .unwrap()
                                    .push((job.plaintext_relative_path.clone(), e.to_string()));
                            }
                        }
                        let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                        if let Some(cb) = &progress {
                            cb(done, total, &job.plaintext_relative_path);
                        }
                    }
                })
            })
            .collect();

        for job in jobs {
            let _ = tx.send(job);
        }
        drop(tx);

        for handle in handles {
            let _ = handle.join();
        }

        let manifest = Arc::try_unwrap(manifest).unwrap().into_inner().unwrap();
        let errors = Arc::try_unwrap(errors).unwrap().into_inner().unwrap();
        BulkResult { manifest, errors }
    }
}

fn run_one_v1(job: &Job, key: &[u8; KEY_LEN], salt: &[u8; SALT_LEN]) -> Result<()> {
    let plaintext = fs::read(&job.source_path)?;
    let container = v1::encrypt_with_key(&plaintext, key, salt)?;
    if let Some(parent) = job.destination_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&job.destination_path, container)?;
    Ok(())
}
