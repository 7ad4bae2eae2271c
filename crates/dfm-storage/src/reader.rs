//! The content-read collaborator used by the include resolver.

use crate::ReadError;

/// Content returned by a successful read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedContent {
    /// Raw file content, front matter included.
    pub content: String,
    /// Stable identifier of the loaded file, recorded as a dependency.
    pub identifier: String,
}

impl LoadedContent {
    /// Create loaded content.
    #[must_use]
    pub fn new(content: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            identifier: identifier.into(),
        }
    }
}

/// Source of Markdown content.
///
/// # Paths
///
/// `path` is already resolved by the caller: a normalized,
/// working-folder-relative path with forward slashes (e.g. `"r/b/token.md"`).
/// `relative_to` is the file that contains the directive, given for context
/// only; readers must not re-resolve `path` against it.
///
/// `is_include` is `false` for the top-level page and `true` for every
/// inclusion, so readers can apply different policies to fragments.
pub trait ContentReader: Send + Sync {
    /// Read the content at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError`] if the content does not exist or cannot be read.
    fn read(&self, path: &str, relative_to: &str, is_include: bool)
    -> Result<LoadedContent, ReadError>;
}

impl<F> ContentReader for F
where
    F: Fn(&str, &str, bool) -> Result<LoadedContent, ReadError> + Send + Sync,
{
    fn read(
        &self,
        path: &str,
        relative_to: &str,
        is_include: bool,
    ) -> Result<LoadedContent, ReadError> {
        self(path, relative_to, is_include)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_closure_reader() {
        let reader = |path: &str, _relative_to: &str, _is_include: bool| {
            if path == "a.md" {
                Ok(LoadedContent::new("A", "a.md"))
            } else {
                Err(ReadError::not_found(path))
            }
        };

        assert_eq!(reader.read("a.md", "", true).unwrap().content, "A");
        assert!(reader.read("b.md", "", true).unwrap_err().is_not_found());
    }

    #[test]
    fn test_trait_object() {
        fn assert_reader(_: &dyn ContentReader) {}

        let reader = |path: &str, _: &str, _: bool| Ok::<_, ReadError>(LoadedContent::new("", path));
        assert_reader(&reader);
    }
}
