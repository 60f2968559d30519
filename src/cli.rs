//! CLI commands and argument parsing.
//!
//! A thin demonstration harness over the library's three core surfaces
//! (single-file V2 encrypt/decrypt, directory-to-archive pack/unpack).
//! Unlike an interactive viewer, the password is always a required flag —
//! there is no terminal prompting here.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::archive::ArchiveLayout;
use crate::bulk::{BulkEncryptor, Job};
use crate::cancel::NoCancel;
use crate::error::Result;
use crate::file;
use crate::manifest::{Manifest, ManifestEntryV2, ManifestV2};
use crate::progress::ProgressBar;

#[derive(Parser)]
#[command(name = "vaultstream", version, about = "Password-based authenticated encryption for archive storage.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Stream-encrypt a single file into a V2 container.
    Encrypt {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long)]
        password: String,
        #[arg(long)]
        chunk_size: Option<u32>,
    },

    /// Stream-decrypt a V1 or V2 container back to a plaintext file.
    Decrypt {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long)]
        password: String,
    },

    /// Pack a directory of plaintext files into a manifest-driven archive.
    Pack {
        #[arg(short, long)]
        source: PathBuf,
        #[arg(short, long)]
        archive: PathBuf,
        #[arg(short, long)]
        password: String,
        #[arg(long)]
        workers: Option<usize>,
    },

    /// Unpack an archive back into a directory of plaintext files.
    Unpack {
        #[arg(short, long)]
        archive: PathBuf,
        #[arg(short, long)]
        destination: PathBuf,
        #[arg(short, long)]
        password: String,
    },
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Encrypt { input, output, password, chunk_size } => {
            let output = output.unwrap_or_else(|| append_extension(&input));
            file::encrypt_file(&input, &output, &password, chunk_size, &NoCancel)?;
            println!("encrypted {} -> {}", input.display(), output.display());
            Ok(())
        }
        Commands::Decrypt { input, output, password } => {
            let output = output.unwrap_or_else(|| strip_extension(&input));
            file::decrypt_file(&input, &output, &password, &NoCancel)?;
            println!("decrypted {} -> {}", input.display(), output.display());
            Ok(())
        }
        Commands::Pack { source, archive, password, workers } => run_pack(&source, &archive, &password, workers),
        Commands::Unpack { archive, destination, password } => run_unpack(&archive, &destination, &password),
    }
}

fn append_extension(path: &std::path::Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".vlt");
    PathBuf::from(os)
}

fn strip_extension(path: &std::path::Path) -> PathBuf {
    let stem = path.to_string_lossy();
    stem.strip_suffix(".vlt").map(PathBuf::from).unwrap_or_else(|| path.to_path_buf())
}

fn run_pack(source: &std::path::Path, archive: &std::path::Path, password: &str, workers: Option<usize>) -> Result<()> {
    let layout = ArchiveLayout::new(archive);
    layout.ensure_dirs()?;

    let (plain_files, _already_encrypted) = file::partition_by_encryption(source)?;
    let encryptor = BulkEncryptor::new(password)?;

    let jobs: Vec<Job> = plain_files
        .iter()
        .enumerate()
        .map(|(i, (path, relative))| {
            let enc_name = format!("{i:08x}.bin");
            Job {
                source_path: path.clone(),
                destination_path: layout.blob_path(&enc_name),
                plaintext_relative_path: relative.clone(),
                encrypted_blob_name: enc_name,
            }
        })
        .collect();

    let bar = ProgressBar::new(jobs.len() as u64, "packing");
    let progress = std::sync::Arc::new(move |done: usize, total: usize, path: &str| {
        tracing::debug!(done, total, path, "packed file");
        bar.inc(1);
    });
    let result = encryptor.run_parallel_v1(jobs, workers, Some(progress));

    for (path, error) in &result.errors {
        eprintln!("skipped {path}: {error}");
    }

    let entries = result
        .manifest
        .into_iter()
        .map(|(path, enc_name)| {
            let size = std::fs::metadata(source.join(&path)).map(|m| m.len() as i64).unwrap_or(0);
            (path, ManifestEntryV2 { enc_name, original_size: size, chunk_count: 1, content_type: "application/octet-stream".to_string() })
        })
        .collect();

    let manifest = Manifest::V2(ManifestV2 { version: 2, chunk_size: crate::config::DEFAULT_CHUNK_SIZE, entries });
    layout.write_manifest(&manifest, password)?;

    println!("packed {} into {}", source.display(), archive.display());
    Ok(())
}

fn run_unpack(archive: &std::path::Path, destination: &std::path::Path, password: &str) -> Result<()> {
    let layout = ArchiveLayout::new(archive);
    let manifest = layout.read_manifest(password)?;

    match manifest {
        Manifest::V1(flat) => {
            for (path, enc_name) in flat {
                let container = std::fs::read(layout.blob_path(&enc_name))?;
                let plaintext = crate::container::v1::decrypt(&container, password)?;
                let out_path = destination.join(&path);
                if let Some(parent) = out_path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(out_path, plaintext)?;
            }
        }
        Manifest::V2(m) => {
            for (path, entry) in m.entries {
                let container = std::fs::read(layout.blob_path(&entry.enc_name))?;
                let plaintext = crate::container::decrypt_unified(&container, password)?;
                let out_path = destination.join(&path);
                if let Some(parent) = out_path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(out_path, plaintext)?;
            }
        }
    }

    println!("unpacked {} into {}", archive.display(), destination.display());
    Ok(())
}
