//! Directive processing context.

use std::borrow::Cow;

use crate::PathRewriter;
use crate::ids::UniqueIds;
use crate::inclusion::FileContext;

/// Context handed to a block directive handler.
///
/// Carries the source location of the directive, the path rewriter for the
/// file the directive was written in, and the document-scoped ID registry.
pub struct DirectiveContext<'a> {
    files: &'a FileContext,
    line: usize,
    has_closing_marker: bool,
    trailing_text: &'a str,
    rewriter: &'a PathRewriter,
    ids: &'a mut UniqueIds,
}

impl<'a> DirectiveContext<'a> {
    pub(crate) fn new(
        files: &'a FileContext,
        line: usize,
        has_closing_marker: bool,
        trailing_text: &'a str,
        rewriter: &'a PathRewriter,
        ids: &'a mut UniqueIds,
    ) -> Self {
        Self {
            files,
            line,
            has_closing_marker,
            trailing_text,
            rewriter,
            ids,
        }
    }

    /// File the directive was written in.
    #[must_use]
    pub fn current_file(&self) -> &str {
        self.files.current_file().unwrap_or_default()
    }

    /// File the render started from.
    #[must_use]
    pub fn root_file(&self) -> &str {
        self.files.root_file().unwrap_or_default()
    }

    /// 1-based line of the directive within the current file.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Whether a matching `:::name-end:::` marker was found.
    ///
    /// Always `false` for handlers that declared no body.
    #[must_use]
    pub fn has_closing_marker(&self) -> bool {
        self.has_closing_marker
    }

    /// Text after the closing colons of the opening line, trimmed.
    #[must_use]
    pub fn trailing_text(&self) -> &str {
        self.trailing_text
    }

    /// Rewrite a link or image target so it stays valid from the root file.
    #[must_use]
    pub fn rewrite_url<'u>(&self, url: &'u str) -> Cow<'u, str> {
        self.rewriter.rewrite(url)
    }

    /// Generate an element ID derived from `seed`, unique within the document.
    pub fn unique_id(&mut self, seed: &str) -> String {
        self.ids.hashed_id(seed)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_location_accessors() {
        let mut files = FileContext::new();
        files.enter("docs/index.md".to_owned());
        files.enter("docs/include/part.md".to_owned());
        let rewriter = PathRewriter::new("docs/include/part.md", "docs/index.md");
        let mut ids = UniqueIds::new();

        let ctx = DirectiveContext::new(&files, 7, true, "tail", &rewriter, &mut ids);

        assert_eq!(ctx.current_file(), "docs/include/part.md");
        assert_eq!(ctx.root_file(), "docs/index.md");
        assert_eq!(ctx.line(), 7);
        assert!(ctx.has_closing_marker());
        assert_eq!(ctx.trailing_text(), "tail");
    }

    #[test]
    fn test_rewrite_url_uses_origin() {
        let mut files = FileContext::new();
        files.enter("r/root.md".to_owned());
        let rewriter = PathRewriter::new("r/b/part.md", "r/root.md");
        let mut ids = UniqueIds::new();

        let ctx = DirectiveContext::new(&files, 1, false, "", &rewriter, &mut ids);

        assert_eq!(ctx.rewrite_url("img/a.png"), "~/r/b/img/a.png");
        assert_eq!(ctx.rewrite_url("https://x.test/a.png"), "https://x.test/a.png");
    }

    #[test]
    fn test_unique_id_deduplicates() {
        let files = FileContext::new();
        let rewriter = PathRewriter::new("a.md", "a.md");
        let mut ids = UniqueIds::new();

        let mut ctx = DirectiveContext::new(&files, 1, false, "", &rewriter, &mut ids);
        let first = ctx.unique_id("seed");
        let second = ctx.unique_id("seed");

        assert_eq!(first.len(), 5);
        assert_ne!(first, second);
    }

    #[test]
    fn test_empty_context_outside_render() {
        let files = FileContext::new();
        let rewriter = PathRewriter::new("", "");
        let mut ids = UniqueIds::new();

        let ctx = DirectiveContext::new(&files, 1, false, "", &rewriter, &mut ids);

        assert_eq!(ctx.current_file(), "");
        assert_eq!(ctx.root_file(), "");
    }
}
