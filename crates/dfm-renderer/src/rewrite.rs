//! Link and image target rewriting for spliced content.

use std::borrow::Cow;

use crate::inclusion::{WORKING_FOLDER_PREFIX, is_external, join, parent_dir};

/// Rewrites relative targets so they stay valid from the root file.
///
/// Content spliced in from a file in another directory would otherwise
/// resolve its relative links against the wrong base. Such targets become
/// `~/` plus the working-folder-relative path of what they point at.
///
/// ```
/// use dfm_renderer::PathRewriter;
///
/// let rewriter = PathRewriter::new("r/b/linkAndRefRoot.md", "r/root.md");
/// assert_eq!(rewriter.rewrite("a.md"), "~/r/b/a.md");
/// assert_eq!(rewriter.rewrite("#anchor"), "#anchor");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRewriter {
    origin_dir: String,
    root_dir: String,
}

impl PathRewriter {
    /// Rewriter for content written in `origin_file` and rendered into `root_file`.
    #[must_use]
    pub fn new(origin_file: &str, root_file: &str) -> Self {
        Self {
            origin_dir: parent_dir(origin_file).to_owned(),
            root_dir: parent_dir(root_file).to_owned(),
        }
    }

    /// Whether every target passes through unchanged.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.origin_dir == self.root_dir
    }

    /// Rewrite a link or image target.
    ///
    /// Fragment-only, working-folder, absolute and external targets pass
    /// through, as does everything when origin and root share a directory.
    /// `#fragment` and `?query` suffixes are preserved.
    #[must_use]
    pub fn rewrite<'a>(&self, target: &'a str) -> Cow<'a, str> {
        if self.is_identity() || !is_rewritable(target) {
            return Cow::Borrowed(target);
        }

        let split = target.find(['#', '?']).unwrap_or(target.len());
        let (path, suffix) = target.split_at(split);
        let resolved = join(&self.origin_dir, path);

        Cow::Owned(format!("{WORKING_FOLDER_PREFIX}{resolved}{suffix}"))
    }
}

fn is_rewritable(target: &str) -> bool {
    !(target.is_empty()
        || target.starts_with(['#', '?', '/'])
        || target.starts_with(WORKING_FOLDER_PREFIX)
        || is_external(target))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_same_directory_is_identity() {
        let rewriter = PathRewriter::new("embed", "root");

        assert!(rewriter.is_identity());
        assert_eq!(rewriter.rewrite("c.md"), "c.md");
    }

    #[test]
    fn test_nested_file_targets() {
        let rewriter = PathRewriter::new("r/b/token.md", "r/a/a.md");

        assert_eq!(rewriter.rewrite("../img/img.jpg"), "~/r/img/img.jpg");
        assert_eq!(rewriter.rewrite("../a/a.md"), "~/r/a/a.md");
        assert_eq!(rewriter.rewrite("invalid.md"), "~/r/b/invalid.md");
        assert_eq!(rewriter.rewrite("../c/d/d.md#anchor"), "~/r/c/d/d.md#anchor");
    }

    #[test]
    fn test_dot_segments_normalized() {
        let rewriter = PathRewriter::new("r/include/a.md", "r/parent_folder/child_folder/root.md");

        assert_eq!(rewriter.rewrite("./media/refb.png"), "~/r/include/media/refb.png");
    }

    #[test]
    fn test_query_preserved() {
        let rewriter = PathRewriter::new("docs/sub/a.md", "docs/index.md");

        assert_eq!(rewriter.rewrite("img.png?w=10"), "~/docs/sub/img.png?w=10");
    }

    #[test]
    fn test_pass_through_targets() {
        let rewriter = PathRewriter::new("r/b/token.md", "r/root.md");

        for target in [
            "#anchor",
            "~/r/a.md",
            "/abs/path.md",
            "https://example.com/a.md",
            "mailto:a@example.com",
            "//cdn.example.com/x.png",
            "",
        ] {
            assert_eq!(rewriter.rewrite(target), target);
        }
    }
}
