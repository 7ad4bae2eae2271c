//! Page rendering for DFM documentation sets.
//!
//! Connects the pieces: [`dfm_config`] supplies the settings, a
//! [`ContentReader`](dfm_storage::ContentReader) supplies the files and
//! [`dfm_renderer`] turns each page into HTML plus its dependencies and
//! diagnostics.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use dfm_config::Config;
//! use dfm_site::{PageRenderer, PageRendererConfig};
//! use dfm_storage::FsReader;
//!
//! let config = Config::load(None)?;
//! let reader = Arc::new(FsReader::new(&config.markdown_resolved.working_folder));
//! let renderer = PageRenderer::new(reader, PageRendererConfig::from_config(&config));
//!
//! for result in renderer.render_many(&["index.md", "guide/intro.md"]) {
//!     let output = result?;
//!     for diagnostic in &output.diagnostics {
//!         tracing::warn!(kind = %diagnostic.kind, "{}", diagnostic.message);
//!     }
//! }
//! ```

mod renderer;

pub use renderer::{PageRenderer, PageRendererConfig, RenderError};
