//! Read error with a semantic kind and an optional source.

use std::path::PathBuf;

/// Semantic error categories for content reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ReadErrorKind {
    /// Resource does not exist.
    NotFound,
    /// Permission denied.
    PermissionDenied,
    /// Path escapes the working folder or is otherwise malformed.
    InvalidPath,
    /// Other/unknown error category.
    Other,
}

/// Error returned by a [`ContentReader`](crate::ContentReader).
#[derive(Debug)]
pub struct ReadError {
    /// Semantic error category.
    pub kind: ReadErrorKind,
    /// Path context (if applicable).
    pub path: Option<PathBuf>,
    /// Reader identifier (e.g., "Fs", "Mock").
    pub reader: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ReadError {
    /// Create a new read error.
    #[must_use]
    pub fn new(kind: ReadErrorKind) -> Self {
        Self {
            kind,
            path: None,
            reader: None,
            source: None,
        }
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach reader identifier.
    #[must_use]
    pub fn with_reader(mut self, reader: &'static str) -> Self {
        self.reader = Some(reader);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Create a not found error with path.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::new(ReadErrorKind::NotFound).with_path(path)
    }

    /// Create a read error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: Option<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => ReadErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => ReadErrorKind::PermissionDenied,
            _ => ReadErrorKind::Other,
        };
        let mut error = Self::new(kind).with_source(err);
        if let Some(p) = path {
            error = error.with_path(p);
        }
        error
    }

    /// Whether the error means the content simply does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind == ReadErrorKind::NotFound
    }
}

impl std::fmt::Display for ReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Reader] Kind: source (path: foo/bar.md)"
        if let Some(reader) = self.reader {
            write!(f, "[{reader}] ")?;
        }

        let kind_str = match self.kind {
            ReadErrorKind::NotFound => "Not found",
            ReadErrorKind::PermissionDenied => "Permission denied",
            ReadErrorKind::InvalidPath => "Invalid path",
            ReadErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }

        Ok(())
    }
}

impl std::error::Error for ReadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}
