//! Directory walking for the `pack`/`unpack` CLI subcommands.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::Result;
use crate::file::operations::is_encrypted;

/// Lists every regular file under `root`, paired with its path relative to
/// `root`, skipping dotfiles and directories.
pub fn walk_files(root: &Path) -> Result<Vec<(PathBuf, String)>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).into_iter().filter_map(std::result::Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace('\\', "/");
        files.push((entry.path().to_path_buf(), relative));
    }

    files.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(files)
}

/// Splits `walk_files(root)` into plaintext candidates and already-encrypted
/// files, by magic-byte sniffing rather than extension.
pub fn partition_by_encryption(
    root: &Path,
) -> Result<(Vec<(PathBuf, String)>, Vec<(PathBuf, String)>)> {
    let mut plain = Vec::new();
    let mut encrypted = Vec::new();

    for (path, relative) in walk_files(root)? {
        if is_encrypted(&path)? {
            encrypted.push((path, relative));
        } else {
            plain.push((path, relative));
        }
    }

    Ok((plain, encrypted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn walk_files_skips_dotfiles() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("visible.txt"), b"x").unwrap();
        fs::write(dir.path().join(".hidden"), b"x").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/nested.txt"), b"x").unwrap();

        let files = walk_files(dir.path()).unwrap();
        let names: Vec<&str> = files.iter().map(|(_, rel)| rel.as_str()).collect();
        assert!(names.contains(&"visible.txt"));
        assert!(names.contains(&"sub/nested.txt"));
        assert!(!names.iter().any(|n| n.contains("hidden")));
    }
}
