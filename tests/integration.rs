//! End-to-end tests through the public library surface: the on-disk
//! container formats, the archive layout, and the bulk encryptor, all
//! exercised the way a caller outside this crate would use them.

use std::collections::HashMap;
use std::fs;
use std::io::Cursor;
use std::sync::Arc;

use tempfile::tempdir;

use vaultstream::archive::ArchiveLayout;
use vaultstream::bulk::{BulkEncryptor, Job};
use vaultstream::cache::ChunkCache;
use vaultstream::cancel::{AtomicCancel, Cancellation, NoCancel};
use vaultstream::container::v2::V2Header;
use vaultstream::manifest::{Manifest, ManifestEntryV2, ManifestV2};
use vaultstream::reader::{RandomAccessReader, SerializedReadAt};
use vaultstream::{CoreError, decrypt_bytes, decrypt_stream, encrypt_bytes, encrypt_stream};

#[test]
fn v1_round_trip_through_public_surface() {
    let plaintext = b"a small secret note";
    let container = encrypt_bytes(plaintext, "correct horse battery staple").unwrap();
    let recovered = decrypt_bytes(&container, "correct horse battery staple").unwrap();
    assert_eq!(recovered, plaintext);

    assert!(matches!(
        decrypt_bytes(&container, "wrong password"),
        Err(CoreError::DecryptionFailed)
    ));
}

#[test]
fn v2_stream_round_trip_and_unified_dispatch() {
    let plaintext: Vec<u8> = (0..(3 * 1024 * 1024 + 42)).map(|i| (i % 251) as u8).collect();

    let mut container = Vec::new();
    encrypt_stream(&plaintext[..], &mut container, "streaming-pw", None, &NoCancel).unwrap();

    let mut out = Vec::new();
    decrypt_stream(Cursor::new(&container), "streaming-pw", &mut out, &NoCancel).unwrap();
    assert_eq!(out, plaintext);

    // decrypt_bytes dispatches on the version field without the caller
    // needing to know which container format produced the bytes.
    assert_eq!(decrypt_bytes(&container, "streaming-pw").unwrap(), plaintext);
}

#[test]
fn stream_encryption_honors_cancellation() {
    let plaintext = vec![0u8; 5 * 1024 * 1024];
    let cancel = AtomicCancel::new();
    cancel.cancel();
    assert!(cancel.is_cancelled());

    let mut out = Vec::new();
    let result = encrypt_stream(&plaintext[..], &mut out, "pw", None, &cancel);
    assert!(matches!(result, Err(CoreError::Cancelled)));
}

#[test]
fn random_access_reader_over_a_real_v2_container() {
    let plaintext: Vec<u8> = (0..(2 * 1024 * 1024 + 777)).map(|i| (i % 200) as u8).collect();
    let mut container = Vec::new();
    encrypt_stream(&plaintext[..], &mut container, "viewer-pw", None, &NoCancel).unwrap();

    let header = V2Header::parse(&container).unwrap();
    let chunk_count = (plaintext.len() as u64).div_ceil(u64::from(header.chunk_size));
    let cache = Arc::new(ChunkCache::new(16));

    let reader = RandomAccessReader::open(
        SerializedReadAt::new(Cursor::new(container)),
        "viewer-pw",
        header,
        "integration-blob",
        plaintext.len() as u64,
        chunk_count,
        cache,
    )
    .unwrap();

    // Straddles the chunk boundary.
    let mut buf = vec![0u8; 4096];
    let boundary = u64::from(header.chunk_size) - 2048;
    let outcome = reader.read_at(boundary, &mut buf).unwrap();
    assert_eq!(outcome.bytes_read, 4096);
    assert!(!outcome.eof);
    assert_eq!(buf, plaintext[boundary as usize..boundary as usize + 4096]);

    // Runs off the end of the plaintext.
    let mut tail = vec![0u8; 2000];
    let outcome = reader.read_at(plaintext.len() as u64 - 777, &mut tail).unwrap();
    assert_eq!(outcome.bytes_read, 777);
    assert!(outcome.eof);
}

#[test]
fn archive_pack_and_unpack_round_trip_via_bulk_encryptor() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("source");
    fs::create_dir_all(&source).unwrap();
    fs::write(source.join("a.txt"), b"first file contents").unwrap();
    fs::write(source.join("b.txt"), b"second file, a little longer than the first").unwrap();

    let archive_root = dir.path().join("archive");
    let layout = ArchiveLayout::new(&archive_root);
    layout.ensure_dirs().unwrap();

    let encryptor = BulkEncryptor::new("archive-password").unwrap();
    let jobs = vec![
        Job {
            source_path: source.join("a.txt"),
            destination_path: layout.blob_path("00000000.bin"),
            plaintext_relative_path: "a.txt".to_string(),
            encrypted_blob_name: "00000000.bin".to_string(),
        },
        Job {
            source_path: source.join("b.txt"),
            destination_path: layout.blob_path("00000001.bin"),
            plaintext_relative_path: "b.txt".to_string(),
            encrypted_blob_name: "00000001.bin".to_string(),
        },
    ];

    let result = encryptor.run_parallel_v1(jobs, Some(2), None);
    assert!(result.errors.is_empty());

    let mut entries = HashMap::new();
    for (path, enc_name) in &result.manifest {
        let size = fs::metadata(source.join(path)).unwrap().len() as i64;
        entries.insert(
            path.clone(),
            ManifestEntryV2 { enc_name: enc_name.clone(), original_size: size, chunk_count: 1, content_type: "text/plain".to_string() },
        );
    }
    let manifest = Manifest::V2(ManifestV2 { version: 2, chunk_size: vaultstream::config::DEFAULT_CHUNK_SIZE, entries });
    layout.write_manifest(&manifest, "archive-password").unwrap();

    // Independently re-read the manifest and every blob back, as a
    // fresh process opening the archive would.
    let read_back = layout.read_manifest("archive-password").unwrap();
    let Manifest::V2(m) = read_back else { panic!("expected a V2 manifest") };
    assert_eq!(m.entries.len(), 2);

    for (path, entry) in &m.entries {
        let container = fs::read(layout.blob_path(&entry.enc_name)).unwrap();
        let plaintext = encryptor.decrypt_v1(&container).unwrap();
        assert_eq!(plaintext, fs::read(source.join(path)).unwrap());
    }
}
