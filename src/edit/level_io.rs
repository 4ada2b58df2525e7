/// Level files on disk.
///
/// One `.rll` file holds one level: the codec output, nothing else.
/// All failures come back as `EditorError::Io` carrying the path.

use std::path::{Path, PathBuf};

use crate::error::{EditorError, Result};

pub const LEVEL_EXTENSION: &str = "rll";

/// Writable per-user directory for the log file and, by default, exports.
///
/// Resolution: (1) the executable's directory if it is writable,
/// (2) `~/.local/share/levelforge`, (3) the current directory.
pub fn data_dir() -> PathBuf {
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            // installed copies under /usr/bin are read-only
            let probe = parent.join(".levelforge_write_probe");
            if std::fs::write(&probe, "").is_ok() {
                let _ = std::fs::remove_file(&probe);
                return parent.to_path_buf();
            }
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(home).join(".local/share/levelforge");
        if std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Append `.ext` when the user typed a path without one.
pub fn with_extension(path: &Path, ext: &str) -> PathBuf {
    if path.extension().is_some() || ext.is_empty() {
        path.to_path_buf()
    } else {
        path.with_extension(ext)
    }
}

/// First `level_NNN.<ext>` in `dir` that does not exist yet.
pub fn next_free_path(dir: &Path, ext: &str) -> PathBuf {
    let mut n = 1u32;
    loop {
        let candidate = dir.join(format!("level_{:03}.{}", n, ext));
        if !candidate.exists() || n == u32::MAX {
            return candidate;
        }
        n += 1;
    }
}

/// Write the whole file in one go; parent directories are created.
pub fn write_level(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| EditorError::io(parent, e))?;
    }
    std::fs::write(path, text).map_err(|e| EditorError::io(path, e))
}

pub fn read_level(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| EditorError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("one.rll");
        write_level(&path, "abc\n").unwrap();
        assert_eq!(read_level(&path).unwrap(), "abc\n");
    }

    #[test]
    fn write_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("levels/world1/start.rll");
        write_level(&path, "x").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn read_missing_is_io_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.rll");
        match read_level(&path) {
            Err(EditorError::Io { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected Io error, got {:?}", other),
        }
    }

    #[test]
    fn write_into_a_file_as_dir_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let res = write_level(&blocker.join("x.rll"), "x");
        assert!(matches!(res, Err(EditorError::Io { .. })));
    }

    #[test]
    fn extension_added_only_when_missing() {
        assert_eq!(with_extension(Path::new("cave"), "rll"), PathBuf::from("cave.rll"));
        assert_eq!(with_extension(Path::new("cave.txt"), "rll"), PathBuf::from("cave.txt"));
        assert_eq!(with_extension(Path::new("cave"), ""), PathBuf::from("cave"));
    }

    #[test]
    fn next_free_skips_taken_names() {
        let dir = TempDir::new().unwrap();
        assert_eq!(next_free_path(dir.path(), "rll"), dir.path().join("level_001.rll"));
        std::fs::write(dir.path().join("level_001.rll"), "").unwrap();
        std::fs::write(dir.path().join("level_002.rll"), "").unwrap();
        assert_eq!(next_free_path(dir.path(), "rll"), dir.path().join("level_003.rll"));
    }
}
