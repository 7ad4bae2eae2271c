//! Files a rendered document depends on.

use std::collections::BTreeSet;

use crate::util::relative_path;

/// Deduplicated set of files loaded through inclusion during one render.
///
/// Paths are working-folder-relative identities. Iteration order is sorted,
/// which keeps output deterministic; callers must not rely on inclusion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct DependencySet {
    paths: BTreeSet<String>,
}

impl DependencySet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a dependency. Returns `false` if it was already present.
    pub fn insert(&mut self, path: impl Into<String>) -> bool {
        self.paths.insert(path.into())
    }

    /// Merge another set into this one.
    pub fn extend(&mut self, other: DependencySet) {
        self.paths.extend(other.paths);
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Iterate working-folder-relative paths.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    /// Dependencies expressed relative to the directory of `root_file`.
    ///
    /// ```
    /// use dfm_renderer::DependencySet;
    ///
    /// let mut deps = DependencySet::new();
    /// deps.insert("r/include/a.md");
    /// assert_eq!(
    ///     deps.relative_to("r/parent_folder/child_folder/root.md"),
    ///     vec!["../../include/a.md"]
    /// );
    /// ```
    #[must_use]
    pub fn relative_to(&self, root_file: &str) -> Vec<String> {
        let mut relative: Vec<String> = self
            .paths
            .iter()
            .map(|path| relative_path(root_file, path))
            .collect();
        relative.sort();
        relative
    }
}

impl<'a> IntoIterator for &'a DependencySet {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

impl FromIterator<String> for DependencySet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_insert_deduplicates() {
        let mut deps = DependencySet::new();

        assert!(deps.insert("r/b/token.md"));
        assert!(!deps.insert("r/b/token.md"));
        assert_eq!(deps.len(), 1);
        assert!(deps.contains("r/b/token.md"));
    }

    #[test]
    fn test_relative_to_root_dir() {
        let deps: DependencySet = [
            "r/b/linkAndRefRoot.md",
            "r/a/refc.md",
            "r/c/c.md",
            "r/link/link2.md",
        ]
        .into_iter()
        .map(str::to_owned)
        .collect();

        assert_eq!(
            deps.relative_to("r/root.md"),
            vec![
                "a/refc.md",
                "b/linkAndRefRoot.md",
                "c/c.md",
                "link/link2.md"
            ]
        );
    }

    #[test]
    fn test_extend_and_iter() {
        let mut deps = DependencySet::new();
        deps.insert("b.md");
        let mut other = DependencySet::new();
        other.insert("a.md");
        other.insert("b.md");
        deps.extend(other);

        assert_eq!(deps.iter().collect::<Vec<_>>(), vec!["a.md", "b.md"]);
    }
}
