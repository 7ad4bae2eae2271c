//! Current-file tracking for nested inclusion.

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

/// One frame of the inclusion call stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFrame {
    /// File whose content is being rendered.
    pub file_path: String,
    /// File the top-level render started from.
    pub root_file_path: String,
}

/// Stack of files being expanded during one render.
///
/// Outside a render both [`current_file`](Self::current_file) and
/// [`root_file`](Self::root_file) are `None`. Each render owns its own
/// context, so parallel renders never observe each other.
///
/// ```
/// use dfm_renderer::FileContext;
///
/// let mut context = FileContext::new();
/// {
///     let mut root = context.push_file("root.md");
///     let nested = root.push_file("b/token.md");
///     assert_eq!(nested.current_file(), Some("b/token.md"));
///     assert_eq!(nested.root_file(), Some("root.md"));
/// }
/// assert_eq!(context.current_file(), None);
/// ```
#[derive(Debug, Default)]
pub struct FileContext {
    frames: Vec<FileFrame>,
    /// Active file paths with their nesting count, for O(1) cycle checks.
    active: HashMap<String, usize>,
}

impl FileContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// File currently being rendered.
    #[must_use]
    pub fn current_file(&self) -> Option<&str> {
        self.frames.last().map(|frame| frame.file_path.as_str())
    }

    /// File the render started from.
    #[must_use]
    pub fn root_file(&self) -> Option<&str> {
        self.frames.first().map(|frame| frame.file_path.as_str())
    }

    /// Inclusion depth: 0 while rendering the root file.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len().saturating_sub(1)
    }

    /// Whether `path` is being expanded somewhere in the current chain.
    #[must_use]
    pub fn is_active(&self, path: &str) -> bool {
        self.active.contains_key(path)
    }

    /// All frames, root first.
    #[must_use]
    pub fn frames(&self) -> &[FileFrame] {
        &self.frames
    }

    /// Make `path` the current file until the returned scope is dropped.
    pub fn push_file(&mut self, path: impl Into<String>) -> FileScope<'_> {
        self.enter(path.into());
        FileScope { context: self }
    }

    pub(crate) fn enter(&mut self, path: String) {
        let root_file_path = self
            .frames
            .first()
            .map_or_else(|| path.clone(), |root| root.file_path.clone());
        *self.active.entry(path.clone()).or_default() += 1;
        self.frames.push(FileFrame {
            file_path: path,
            root_file_path,
        });
    }

    pub(crate) fn leave(&mut self) {
        let Some(frame) = self.frames.pop() else {
            return;
        };
        if let Some(count) = self.active.get_mut(&frame.file_path) {
            *count -= 1;
            if *count == 0 {
                self.active.remove(&frame.file_path);
            }
        }
    }
}

/// Guard returned by [`FileContext::push_file`]; pops the frame on drop.
#[derive(Debug)]
pub struct FileScope<'a> {
    context: &'a mut FileContext,
}

impl Deref for FileScope<'_> {
    type Target = FileContext;

    fn deref(&self) -> &FileContext {
        &*self.context
    }
}

impl DerefMut for FileScope<'_> {
    fn deref_mut(&mut self) -> &mut FileContext {
        &mut *self.context
    }
}

impl Drop for FileScope<'_> {
    fn drop(&mut self) {
        self.context.leave();
    }
}
