//! Diagnostics collected while rendering.
//!
//! No directive failure aborts a render. The offending span degrades to
//! literal (or omitted) output and a [`Diagnostic`] is recorded here instead.

use std::fmt;

/// Category of a render diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
#[non_exhaustive]
pub enum DiagnosticKind {
    /// An include names a file that is already being expanded.
    CircularReference,
    /// The reader could not load an included file.
    FileNotFound,
    /// An `image` directive is malformed or a `complex` image has no `image-end`.
    InvalidImage,
    /// Include nesting went past the configured maximum depth.
    DepthExceeded,
    /// A container directive was never closed and was closed implicitly.
    UnclosedDirective,
}

impl DiagnosticKind {
    /// Stable kebab-case name, e.g. `circular-reference`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CircularReference => "circular-reference",
            Self::FileNotFound => "file-not-found",
            Self::InvalidImage => "invalid-image",
            Self::DepthExceeded => "depth-exceeded",
            Self::UnclosedDirective => "unclosed-directive",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Location of a diagnostic inside its source file.
///
/// `line` is 1-indexed; `start`/`end` are byte offsets within that line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceSpan {
    /// Line number (1-indexed).
    pub line: usize,
    /// Byte offset where the span starts.
    pub start: usize,
    /// Byte offset where the span ends (exclusive).
    pub end: usize,
}

impl SourceSpan {
    /// Span covering `start..end` on `line`.
    #[must_use]
    pub fn new(line: usize, start: usize, end: usize) -> Self {
        Self { line, start, end }
    }
}

/// A warning or error produced while rendering one document.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Diagnostic {
    /// Diagnostic category.
    pub kind: DiagnosticKind,
    /// Human-readable message.
    pub message: String,
    /// File the offending directive was written in.
    pub source_file: String,
    /// Location inside `source_file`.
    pub span: SourceSpan,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}: {}",
            self.source_file, self.span.line, self.kind, self.message
        )
    }
}
