//! Page rendering.
//!
//! Provides [`PageRenderer`], which reads a page through a [`ContentReader`],
//! strips its front matter and renders it with [`Renderer`].

use std::sync::Arc;

use dfm_config::Config;
use dfm_renderer::directive::BlockDirective;
use dfm_renderer::{RenderOutput, Renderer, RendererOptions, normalize, strip_front_matter};
use dfm_storage::{CachingReader, ContentReader, LoadedContent, ReadError};
use rayon::prelude::*;

/// Error returned when page rendering fails.
///
/// Problems inside the page (missing includes, cycles, bad images) are not
/// errors: they are collected in [`RenderOutput::diagnostics`].
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Source file not found.
    #[error("Source file not found: {0}")]
    FileNotFound(String),
    /// The reader failed for another reason.
    #[error("Cannot read {path}: {source}")]
    Read {
        /// Page path.
        path: String,
        /// Underlying reader error.
        #[source]
        source: ReadError,
    },
}

/// Configuration for [`PageRenderer`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRendererConfig {
    /// Maximum number of nested inclusions below a page.
    pub max_include_depth: usize,
    /// Enable tables, strikethrough and task lists.
    pub gfm: bool,
    /// Memoize reads by resolved path across renders.
    ///
    /// Cached entries must be dropped with [`PageRenderer::invalidate`]
    /// when the underlying file changes.
    pub cache_enabled: bool,
}

impl Default for PageRendererConfig {
    fn default() -> Self {
        let options = RendererOptions::default();
        Self {
            max_include_depth: options.max_include_depth,
            gfm: options.gfm,
            cache_enabled: false,
        }
    }
}

impl PageRendererConfig {
    /// Build from loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_include_depth: config.markdown_resolved.max_include_depth,
            gfm: config.markdown_resolved.gfm,
            cache_enabled: config.cache.enabled,
        }
    }
}

/// Shares one reader between the cache and its owner.
struct SharedReader(Arc<dyn ContentReader>);

impl ContentReader for SharedReader {
    fn read(
        &self,
        path: &str,
        relative_to: &str,
        is_include: bool,
    ) -> Result<LoadedContent, ReadError> {
        self.0.read(path, relative_to, is_include)
    }
}

/// Renders pages of a documentation set.
///
/// Every page render is isolated: file context, cycle detection,
/// dependencies and diagnostics never carry over from one page to the next.
/// The only state shared between renders is the opt-in content cache.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use dfm_site::{PageRenderer, PageRendererConfig};
/// use dfm_storage::FsReader;
///
/// let reader = Arc::new(FsReader::new("docs"));
/// let renderer = PageRenderer::new(reader, PageRendererConfig::default());
/// let output = renderer.render("guide/intro.md")?;
/// ```
pub struct PageRenderer {
    reader: Arc<dyn ContentReader>,
    cache: Option<Arc<CachingReader<SharedReader>>>,
    renderer: Renderer,
}

impl PageRenderer {
    /// Create a page renderer reading through `reader`.
    #[must_use]
    pub fn new(reader: Arc<dyn ContentReader>, config: PageRendererConfig) -> Self {
        let cache = config
            .cache_enabled
            .then(|| Arc::new(CachingReader::new(SharedReader(Arc::clone(&reader)))));
        let reader: Arc<dyn ContentReader> = match &cache {
            Some(cache) => Arc::clone(cache) as Arc<dyn ContentReader>,
            None => reader,
        };

        let options = RendererOptions::new()
            .with_max_include_depth(config.max_include_depth)
            .with_gfm(config.gfm);

        Self {
            reader,
            cache,
            renderer: Renderer::new().with_options(options),
        }
    }

    /// Register an additional block directive for every page.
    #[must_use]
    pub fn with_directive<F, D>(mut self, factory: F) -> Self
    where
        F: Fn() -> D + Send + Sync + 'static,
        D: BlockDirective + 'static,
    {
        self.renderer = self.renderer.with_directive(factory);
        self
    }

    /// Render one page.
    ///
    /// `path` is relative to the working folder (e.g., "guide/intro.md").
    ///
    /// # Errors
    ///
    /// Returns `RenderError::FileNotFound` if the page doesn't exist.
    /// Returns `RenderError::Read` if the page cannot be read.
    pub fn render(&self, path: &str) -> Result<RenderOutput, RenderError> {
        let path = normalize(path);
        let loaded = self
            .reader
            .read(&path, "", false)
            .map_err(|source| {
                if source.is_not_found() {
                    RenderError::FileNotFound(path.clone())
                } else {
                    RenderError::Read {
                        path: path.clone(),
                        source,
                    }
                }
            })?;

        let body = strip_front_matter(&loaded.content);
        let skipped_lines = loaded.content[..loaded.content.len() - body.len()]
            .matches('\n')
            .count();

        let mut output = self.renderer.render(&path, body, self.reader.as_ref());

        // Report lines of the page itself as they appear in the file
        if skipped_lines > 0 {
            for diagnostic in output
                .diagnostics
                .iter_mut()
                .filter(|d| d.source_file == path)
            {
                diagnostic.span.line += skipped_lines;
            }
        }

        tracing::debug!(
            path = %path,
            dependencies = output.dependencies.len(),
            diagnostics = output.diagnostics.len(),
            "Rendered page"
        );
        Ok(output)
    }

    /// Render several pages in parallel.
    ///
    /// Results are returned in the order of `paths`.
    pub fn render_many<S>(&self, paths: &[S]) -> Vec<Result<RenderOutput, RenderError>>
    where
        S: AsRef<str> + Sync,
    {
        paths
            .par_iter()
            .map(|path| self.render(path.as_ref()))
            .collect()
    }

    /// Drop cached content for `path`. No-op when caching is disabled.
    pub fn invalidate(&self, path: &str) {
        if let Some(cache) = &self.cache {
            cache.invalidate(&normalize(path));
        }
    }

    /// Drop all cached content. No-op when caching is disabled.
    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
        }
    }

    /// Whether reads are cached.
    #[must_use]
    pub fn is_caching(&self) -> bool {
        self.cache.is_some()
    }
}
