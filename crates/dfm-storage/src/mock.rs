//! Mock reader implementation for testing.
//!
//! Provides [`MockReader`] for unit testing without filesystem access.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::{ContentReader, LoadedContent, ReadError};

/// A recorded call to [`MockReader::read`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadCall {
    /// Requested path.
    pub path: String,
    /// File containing the directive.
    pub relative_to: String,
    /// Whether the read was for an inclusion.
    pub is_include: bool,
}

/// In-memory reader for testing.
///
/// Stores file contents keyed by working-folder-relative path and records
/// every call so tests can assert on what the resolver asked for.
///
/// # Example
///
/// ```ignore
/// use dfm_storage::{ContentReader, MockReader};
///
/// let reader = MockReader::new()
///     .with_file("r/a.md", "This is **included** token");
///
/// let loaded = reader.read("r/a.md", "r/root.md", true).unwrap();
/// assert_eq!(reader.calls().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockReader {
    files: RwLock<HashMap<String, String>>,
    calls: RwLock<Vec<ReadCall>>,
}

impl MockReader {
    /// Create a new empty mock reader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with the given content.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_file(self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.files
            .write()
            .unwrap()
            .insert(path.into(), content.into());
        self
    }

    /// Replace or add a file after construction.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_file(&self, path: impl Into<String>, content: impl Into<String>) {
        self.files
            .write()
            .unwrap()
            .insert(path.into(), content.into());
    }

    /// All reads performed so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<ReadCall> {
        self.calls.read().unwrap().clone()
    }
}

impl ContentReader for MockReader {
    fn read(
        &self,
        path: &str,
        relative_to: &str,
        is_include: bool,
    ) -> Result<LoadedContent, ReadError> {
        self.calls.write().unwrap().push(ReadCall {
            path: path.to_owned(),
            relative_to: relative_to.to_owned(),
            is_include,
        });

        self.files
            .read()
            .unwrap()
            .get(path)
            .map(|content| LoadedContent::new(content.clone(), path))
            .ok_or_else(|| ReadError::not_found(path).with_reader("Mock"))
    }
}
