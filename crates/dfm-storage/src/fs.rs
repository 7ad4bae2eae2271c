//! Filesystem reader rooted at the working folder.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::{ContentReader, LoadedContent, ReadError, ReadErrorKind};

const READER: &str = "Fs";

/// Reads Markdown files below a working folder.
///
/// Paths are working-folder-relative. Absolute paths and paths with `..`
/// components are rejected, and symlinks resolving outside the working
/// folder are refused.
#[derive(Debug, Clone)]
pub struct FsReader {
    root: PathBuf,
}

impl FsReader {
    /// Create a reader for the given working folder.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Working folder this reader is rooted at.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validate that a path stays inside the working folder.
    fn validate_path(path: &Path) -> Result<(), ReadError> {
        let escapes = path.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });

        if escapes || path.as_os_str().is_empty() {
            return Err(ReadError::new(ReadErrorKind::InvalidPath)
                .with_path(path)
                .with_reader(READER));
        }
        Ok(())
    }

    /// Resolve symlinks and check the target did not leave the root.
    fn contained(&self, full_path: &Path) -> Result<PathBuf, ReadError> {
        let canonical = full_path
            .canonicalize()
            .map_err(|e| ReadError::io(e, Some(full_path.to_path_buf())).with_reader(READER))?;
        let root = self
            .root
            .canonicalize()
            .map_err(|e| ReadError::io(e, Some(self.root.clone())).with_reader(READER))?;

        if canonical.starts_with(&root) {
            Ok(canonical)
        } else {
            Err(ReadError::new(ReadErrorKind::InvalidPath)
                .with_path(full_path)
                .with_reader(READER))
        }
    }
}

impl ContentReader for FsReader {
    fn read(
        &self,
        path: &str,
        relative_to: &str,
        is_include: bool,
    ) -> Result<LoadedContent, ReadError> {
        tracing::debug!(path = %path, relative_to = %relative_to, is_include, "Reading file");

        let relative = Path::new(path);
        Self::validate_path(relative)?;
        let full_path = self.contained(&self.root.join(relative))?;

        let content = fs::read_to_string(&full_path)
            .map_err(|e| ReadError::io(e, Some(full_path.clone())).with_reader(READER))?;

        Ok(LoadedContent::new(content, path))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_fs_reader_is_send_sync() {
        assert_send_sync::<FsReader>();
    }

    #[test]
    fn test_read_nested_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(temp_dir.path().join("r/b")).unwrap();
        fs::write(temp_dir.path().join("r/b/token.md"), "# Token").unwrap();

        let reader = FsReader::new(temp_dir.path());
        let loaded = reader.read("r/b/token.md", "r/r.md", true).unwrap();

        assert_eq!(loaded.content, "# Token");
        assert_eq!(loaded.identifier, "r/b/token.md");
    }

    #[test]
    fn test_read_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();

        let reader = FsReader::new(temp_dir.path());
        let err = reader.read("missing.md", "", true).unwrap_err();

        assert_eq!(err.kind, ReadErrorKind::NotFound);
        assert_eq!(err.reader, Some("Fs"));
    }

    #[test]
    fn test_rejects_parent_dir() {
        let temp_dir = tempfile::tempdir().unwrap();

        let reader = FsReader::new(temp_dir.path());
        let err = reader.read("../etc/passwd", "", true).unwrap_err();

        assert_eq!(err.kind, ReadErrorKind::InvalidPath);
    }

    #[test]
    fn test_rejects_absolute_path() {
        let temp_dir = tempfile::tempdir().unwrap();

        let reader = FsReader::new(temp_dir.path());
        let err = reader.read("/etc/passwd", "", true).unwrap_err();

        assert_eq!(err.kind, ReadErrorKind::InvalidPath);
    }

    #[cfg(unix)]
    #[test]
    fn test_rejects_symlink_outside_root() {
        let outside = tempfile::tempdir().unwrap();
        fs::write(outside.path().join("secret.md"), "secret").unwrap();

        let temp_dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(
            outside.path().join("secret.md"),
            temp_dir.path().join("link.md"),
        )
        .unwrap();

        let reader = FsReader::new(temp_dir.path());
        let err = reader.read("link.md", "", true).unwrap_err();

        assert_eq!(err.kind, ReadErrorKind::InvalidPath);
    }
}
