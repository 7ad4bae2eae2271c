//! Pluggable triple-colon block directives.
//!
//! A block directive opens with `:::name attrs:::` on a line of its own and,
//! if the handler takes a body, closes with `:::name-end:::`. The body is
//! rendered as ordinary block content, so directives and includes nest.
//!
//! # Example
//!
//! ```
//! use dfm_renderer::Renderer;
//! use dfm_renderer::directive::{BlockDirective, DirectiveArgs, DirectiveContext, DirectiveOutput};
//! use dfm_storage::{LoadedContent, ReadError};
//!
//! struct NoteDirective;
//!
//! impl BlockDirective for NoteDirective {
//!     fn name(&self) -> &str { "note" }
//!
//!     fn process(&mut self, _args: &DirectiveArgs, _ctx: &mut DirectiveContext<'_>) -> DirectiveOutput {
//!         DirectiveOutput::wrap(r#"<div class="note">"#, "</div>")
//!     }
//! }
//!
//! let renderer = Renderer::new().with_directive(|| NoteDirective);
//! let reader = |path: &str, _: &str, _: bool| {
//!     Err::<LoadedContent, _>(ReadError::not_found(path))
//! };
//!
//! let output = renderer.render("index.md", ":::note:::\nCareful.\n:::note-end:::\n", &reader);
//! assert_eq!(output.html, "<div class=\"note\">\n<p>Careful.</p>\n</div>\n");
//! ```

mod args;
mod context;
mod image;
mod layout;
mod output;
mod parser;

pub use args::DirectiveArgs;
pub use context::DirectiveContext;
pub use image::ImageDirective;
pub use layout::{ColumnDirective, RowDirective};
pub use output::DirectiveOutput;
pub(crate) use parser::{DirectiveLine, parse_directive_line};

/// Handler for a `:::name:::` block directive.
///
/// A fresh handler is created for every render, so handlers may keep state
/// for the document they are rendering.
pub trait BlockDirective: Send {
    /// Directive name matched against `:::name`.
    fn name(&self) -> &str;

    /// Whether this occurrence takes a body closed by `:::name-end:::`.
    ///
    /// Defaults to `true`.
    fn has_body(&self, _args: &DirectiveArgs) -> bool {
        true
    }

    /// Handle the opening line.
    fn process(&mut self, args: &DirectiveArgs, ctx: &mut DirectiveContext<'_>) -> DirectiveOutput;
}
