//! Include path resolution.
//!
//! Every file identity inside a render is a normalized, working-folder-relative
//! path with forward slashes and no `.` segments (e.g. `r/b/token.md`).

/// Marker for paths rooted at the working folder.
pub const WORKING_FOLDER_PREFIX: &str = "~/";

/// An include path resolved against the file that contains it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Normalized working-folder-relative path, used as the file identity.
    pub path: String,
    /// The path as the author wrote it.
    pub display: String,
}

impl ResolvedPath {
    /// Resolve `raw` as written inside `current_file`.
    ///
    /// `~/x` and `/x` resolve against the working folder; anything else
    /// resolves against the directory of `current_file`.
    ///
    /// ```
    /// use dfm_renderer::ResolvedPath;
    ///
    /// assert_eq!(ResolvedPath::resolve("b/token.md", "r/r.md").path, "r/b/token.md");
    /// assert_eq!(ResolvedPath::resolve("~/r/a.md", "x/y/z.md").path, "r/a.md");
    /// assert_eq!(ResolvedPath::resolve("../c/c.md", "r/a/refc.md").path, "r/c/c.md");
    /// ```
    #[must_use]
    pub fn resolve(raw: &str, current_file: &str) -> Self {
        let path = if let Some(rooted) = raw
            .strip_prefix(WORKING_FOLDER_PREFIX)
            .or_else(|| raw.strip_prefix('/'))
        {
            normalize(rooted)
        } else {
            join(parent_dir(current_file), raw)
        };

        Self {
            path,
            display: raw.to_owned(),
        }
    }
}

/// Normalize a slash-separated path.
///
/// Drops empty and `.` segments and folds `..` into its parent. A `..` that
/// would climb above the working folder is kept, so readers can reject it.
/// Normalizing is idempotent.
#[must_use]
pub fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|last| *last != "..") {
                    segments.pop();
                } else {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Directory part of a file path (`""` for top-level files).
#[must_use]
pub fn parent_dir(file: &str) -> &str {
    file.rsplit_once('/').map_or("", |(dir, _)| dir)
}

/// Join a relative path onto a directory and normalize the result.
#[must_use]
pub(crate) fn join(dir: &str, relative: &str) -> String {
    if dir.is_empty() {
        normalize(relative)
    } else {
        normalize(&format!("{dir}/{relative}"))
    }
}

/// Whether a path points at an external resource (`https:`, `mailto:`, `//host`).
///
/// Single-letter schemes are treated as drive letters, not URLs.
#[must_use]
pub fn is_external(path: &str) -> bool {
    if path.starts_with("//") {
        return true;
    }

    let Some((scheme, _)) = path.split_once(':') else {
        return false;
    };
    scheme.len() > 1
        && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("r/./b//token.md"), "r/b/token.md");
        assert_eq!(normalize("r/b/../a.md"), "r/a.md");
        assert_eq!(normalize("./media/refb.png"), "media/refb.png");
        assert_eq!(normalize("a\\b.md"), "a/b.md");
    }

    #[test]
    fn test_normalize_keeps_escaping_parent() {
        assert_eq!(normalize("../../x.md"), "../../x.md");
        assert_eq!(normalize("r/../../x.md"), "../x.md");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for path in ["r/./a/../b.md", "../x/./y.md", "a//b/c/../../d.md", ""] {
            let once = normalize(path);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_resolve_relative() {
        let resolved = ResolvedPath::resolve("../../include/a.md", "r/parent_folder/child_folder/root.md");

        assert_eq!(resolved.path, "r/include/a.md");
        assert_eq!(resolved.display, "../../include/a.md");
    }

    #[test]
    fn test_resolve_top_level_file() {
        assert_eq!(ResolvedPath::resolve("embed", "root").path, "embed");
        assert_eq!(ResolvedPath::resolve("./inc1.md", "").path, "inc1.md");
    }

    #[test]
    fn test_resolve_working_folder_ignores_current_file() {
        let a = ResolvedPath::resolve("~/r/a.md", "r/root.md");
        let b = ResolvedPath::resolve("~/r/a.md", "r/deep/nested/file.md");
        let c = ResolvedPath::resolve("/r/a.md", "other.md");

        assert_eq!(a.path, "r/a.md");
        assert_eq!(a.path, b.path);
        assert_eq!(a.path, c.path);
    }

    #[test]
    fn test_resolve_already_normalized_is_stable() {
        let first = ResolvedPath::resolve("b/../b/token.md", "r/r.md");
        let second = ResolvedPath::resolve(&format!("~/{}", first.path), "r/r.md");

        assert_eq!(first.path, second.path);
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir("r/b/token.md"), "r/b");
        assert_eq!(parent_dir("root.md"), "");
    }

    #[test]
    fn test_is_external() {
        assert!(is_external("http://microsoft.com/a.md"));
        assert!(is_external("https://example.com"));
        assert!(is_external("mailto:someone@example.com"));
        assert!(is_external("//cdn.example.com/a.md"));
        assert!(!is_external("a.md"));
        assert!(!is_external("~/r/a.md"));
        assert!(!is_external("C:/docs/a.md"));
        assert!(!is_external("a:b/c.md"));
    }
}
