//! Filesystem helpers shared by the vault modules.

use std::io::{self, Write as _};
use std::path::Path;

use tempfile::NamedTempFile;

/// Write `bytes` to `path` atomically.
///
/// The bytes go to a temporary file in the target's directory first, then
/// the temp file is renamed over the target. Readers observe either the
/// old content or the new content, never a partial write; a crash between
/// the write and the rename leaves the target untouched. The temp file is
/// created with owner-only permissions, which the rename preserves.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn writes_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.txt");
        write_atomic(&target, b"hello").unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"hello");
    }

    #[test]
    fn replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.txt");
        fs::write(&target, b"old").unwrap();
        write_atomic(&target, b"new").unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"new");
    }

    #[test]
    fn crash_before_rename_leaves_target_intact() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.txt");
        fs::write(&target, b"precious").unwrap();

        // Simulate a crash between temp-write and rename: the temp file is
        // written but never persisted over the target.
        {
            let mut tmp = NamedTempFile::new_in(dir.path()).unwrap();
            tmp.write_all(b"half-finished").unwrap();
            // dropped here without persist()
        }

        assert_eq!(fs::read(&target).unwrap(), b"precious");
    }
}
