use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Extension appended to archive names that have no recognized one
pub const DEFAULT_EXTENSION: &str = ".npz";

/// Extensions accepted as-is on an archive name
const RECOGNIZED_EXTENSIONS: [&str; 2] = [".npz", ".zip"];

/// Resolve the on-disk name of an archive.
///
/// Names ending in `.npz` or `.zip` are kept; anything else gets `.npz`.
pub fn resolve_archive_name(name: &Path) -> PathBuf {
    let text = name.as_os_str().to_string_lossy();
    if RECOGNIZED_EXTENSIONS.iter().any(|ext| text.ends_with(ext)) {
        name.to_path_buf()
    } else {
        let mut resolved = name.as_os_str().to_os_string();
        resolved.push(DEFAULT_EXTENSION);
        PathBuf::from(resolved)
    }
}

/// Absolute form of `path` for diagnostics; the file need not exist
pub fn absolute_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Buffered local file opened for truncating binary writes
pub struct LocalFileSink {
    file: BufWriter<File>,
}

impl LocalFileSink {
    /// Create (or truncate) the file at `path`, used exactly as given.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to open file: {}", path.display()))?;
        Ok(Self {
            file: BufWriter::new(file),
        })
    }
}

impl Write for LocalFileSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_default_extension() {
        assert_eq!(resolve_archive_name(Path::new("weights")), PathBuf::from("weights.npz"));
        assert_eq!(
            resolve_archive_name(Path::new("run.v2")),
            PathBuf::from("run.v2.npz")
        );
    }

    #[test]
    fn keeps_recognized_extensions() {
        assert_eq!(resolve_archive_name(Path::new("a.npz")), PathBuf::from("a.npz"));
        assert_eq!(resolve_archive_name(Path::new("dir/a.zip")), PathBuf::from("dir/a.zip"));
    }

    #[test]
    fn absolute_path_is_absolute() {
        assert!(absolute_path(Path::new("a.npz")).is_absolute());
        assert_eq!(absolute_path(Path::new("/tmp/a.npz")), PathBuf::from("/tmp/a.npz"));
    }

    #[test]
    fn open_failure_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.npz");
        let err = LocalFileSink::create(&path).err().unwrap();
        assert!(err.to_string().contains("out.npz"));
    }
}
