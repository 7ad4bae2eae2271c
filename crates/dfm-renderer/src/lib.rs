//! Markdown renderer with file inclusion and `:::` block directives.
//!
//! This crate extends a pulldown-cmark HTML renderer with the DocFX-flavoured
//! syntax used across documentation sets:
//!
//! - `[!include[title](path)]` on a line of its own splices another file in
//!   as blocks; inside a paragraph it splices the file in as inline content
//! - `:::image ...:::` renders content, icon and complex images
//! - `:::row:::` and `:::column:::` wrap their bodies in layout containers
//! - custom directives plug in through [`BlockDirective`](directive::BlockDirective)
//!
//! Content spliced in from another directory has its relative link and
//! image targets rewritten so they stay valid from the root document.
//! Failures never abort a render: the offending token renders literally and
//! a [`Diagnostic`] is collected instead.
//!
//! # Architecture
//!
//! - [`Renderer`] holds configuration and directive factories
//! - each render runs in its own session with a [`FileContext`] stack,
//!   dependency set and ID registry, so nothing leaks between documents
//! - all file access goes through a [`dfm_storage::ContentReader`]
//!
//! # Example
//!
//! ```
//! use dfm_renderer::{DiagnosticKind, Renderer};
//! use dfm_storage::{LoadedContent, ReadError};
//!
//! let reader = |path: &str, _relative_to: &str, _is_include: bool| match path {
//!     "docs/shared/note.md" => Ok(LoadedContent::new("![chart](chart.png)", path)),
//!     _ => Err(ReadError::not_found(path)),
//! };
//!
//! let markdown = "[!include[note](shared/note.md)]\n\n[!include[gone](gone.md)]";
//! let output = Renderer::new().render("docs/index.md", markdown, &reader);
//!
//! assert_eq!(
//!     output.html,
//!     "<p><img src=\"~/docs/shared/chart.png\" alt=\"chart\"></p>\n[!include[gone](gone.md)]\n"
//! );
//! assert_eq!(output.dependencies.relative_to("docs/index.md"), ["shared/note.md"]);
//! assert_eq!(output.diagnostics[0].kind, DiagnosticKind::FileNotFound);
//! ```

mod diagnostics;
pub mod directive;
mod fence;
mod html;
mod ids;
mod inclusion;
mod pipeline;
mod rewrite;
mod session;
mod state;
mod util;

pub use diagnostics::{Diagnostic, DiagnosticKind, SourceSpan};
pub use inclusion::{
    DependencySet, FileContext, FileFrame, FileScope, IncludeToken, ResolvedPath,
    WORKING_FOLDER_PREFIX, find_inline_includes, is_external, normalize, parent_dir,
    parse_block_include, strip_front_matter,
};
pub use pipeline::{
    DEFAULT_MAX_INCLUDE_DEPTH, DirectiveFactory, RenderOutput, Renderer, RendererOptions,
};
pub use rewrite::PathRewriter;
pub use util::{escape_html, relative_path, slugify};
