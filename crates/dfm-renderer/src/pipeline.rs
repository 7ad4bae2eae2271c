//! Render entry point.

use std::fmt;
use std::sync::Arc;

use dfm_storage::ContentReader;

use crate::directive::{BlockDirective, ColumnDirective, ImageDirective, RowDirective};
use crate::session::RenderSession;
use crate::{DependencySet, Diagnostic};

/// Default limit on nested inclusions.
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 10;

/// Creates a fresh directive handler for one render.
pub type DirectiveFactory = Arc<dyn Fn() -> Box<dyn BlockDirective> + Send + Sync>;

/// Options for [`Renderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RendererOptions {
    /// Maximum number of nested inclusions below the root file.
    ///
    /// Default: 10
    pub max_include_depth: usize,
    /// Enable tables, strikethrough and task lists.
    ///
    /// Default: true
    pub gfm: bool,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
            gfm: true,
        }
    }
}

impl RendererOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }
}

/// Result of rendering one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderOutput {
    /// Rendered HTML.
    pub html: String,
    /// Files loaded through inclusion, transitively.
    pub dependencies: DependencySet,
    /// Problems found while rendering, in document order.
    pub diagnostics: Vec<Diagnostic>,
}

/// Markdown renderer with file inclusion and `:::` block directives.
///
/// The renderer holds configuration only. Every call to
/// [`render`](Self::render) gets its own file context, cycle set,
/// dependency set, ID registry and directive handlers, so one renderer can
/// serve many documents, including from several threads at once.
///
/// # Example
///
/// ```
/// use dfm_renderer::Renderer;
/// use dfm_storage::{LoadedContent, ReadError};
///
/// let reader = |path: &str, _relative_to: &str, _is_include: bool| match path {
///     "docs/part.md" => Ok(LoadedContent::new("Included **text**.", path)),
///     _ => Err(ReadError::not_found(path)),
/// };
///
/// let output = Renderer::new().render("docs/index.md", "[!include[part](part.md)]", &reader);
///
/// assert_eq!(output.html, "<p>Included <strong>text</strong>.</p>\n");
/// assert!(output.dependencies.contains("docs/part.md"));
/// assert!(output.diagnostics.is_empty());
/// ```
#[derive(Clone, Default)]
pub struct Renderer {
    options: RendererOptions,
    factories: Vec<DirectiveFactory>,
}

impl Renderer {
    /// Create a renderer with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_options(mut self, options: RendererOptions) -> Self {
        self.options = options;
        self
    }

    /// Register a block directive.
    ///
    /// `factory` is called once per render. Handlers registered here take
    /// precedence over the built-in `image`, `row` and `column` handlers.
    #[must_use]
    pub fn with_directive<F, D>(mut self, factory: F) -> Self
    where
        F: Fn() -> D + Send + Sync + 'static,
        D: BlockDirective + 'static,
    {
        self.factories
            .push(Arc::new(move || Box::new(factory()) as Box<dyn BlockDirective>));
        self
    }

    #[must_use]
    pub fn options(&self) -> &RendererOptions {
        &self.options
    }

    /// Render `markdown`, the content of `file`.
    ///
    /// `file` is the working-folder-relative path of the document; include
    /// paths and link rewriting are resolved against it. Failures never
    /// abort the render: they are reported in [`RenderOutput::diagnostics`].
    pub fn render(&self, file: &str, markdown: &str, reader: &dyn ContentReader) -> RenderOutput {
        let mut handlers: Vec<Box<dyn BlockDirective>> =
            self.factories.iter().map(|factory| factory()).collect();
        handlers.push(Box::new(ImageDirective::new()));
        handlers.push(Box::new(RowDirective));
        handlers.push(Box::new(ColumnDirective));

        tracing::debug!(file = %file, "Rendering document");
        RenderSession::new(&self.options, reader, handlers).render(file, markdown)
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("options", &self.options)
            .field("directives", &self.factories.len())
            .finish()
    }
}
