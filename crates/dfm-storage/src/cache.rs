//! Opt-in memoizing reader.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::{ContentReader, LoadedContent, ReadError};

/// Memoizes successful reads of an inner reader, keyed by resolved path.
///
/// Failed reads are never cached, so a file that appears later is picked up
/// on the next request. Entries stay until [`invalidate`](Self::invalidate)
/// or [`clear`](Self::clear) is called.
#[derive(Debug)]
pub struct CachingReader<R> {
    inner: R,
    entries: RwLock<HashMap<String, LoadedContent>>,
}

impl<R: ContentReader> CachingReader<R> {
    /// Wrap a reader.
    #[must_use]
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Drop the cached entry for `path`, if any.
    pub fn invalidate(&self, path: &str) {
        if let Ok(mut entries) = self.entries.write()
            && entries.remove(path).is_some()
        {
            tracing::debug!(path = %path, "Invalidated cached content");
        }
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().map_or(0, |entries| entries.len())
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The wrapped reader.
    #[must_use]
    pub fn inner(&self) -> &R {
        &self.inner
    }
}

impl<R: ContentReader> ContentReader for CachingReader<R> {
    fn read(
        &self,
        path: &str,
        relative_to: &str,
        is_include: bool,
    ) -> Result<LoadedContent, ReadError> {
        if let Ok(entries) = self.entries.read()
            && let Some(hit) = entries.get(path)
        {
            tracing::debug!(path = %path, "Content cache hit");
            return Ok(hit.clone());
        }

        let loaded = self.inner.read(path, relative_to, is_include)?;
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(path.to_owned(), loaded.clone());
        }
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;

    use super::*;

    fn counting_reader(
        counter: &AtomicUsize,
    ) -> impl Fn(&str, &str, bool) -> Result<LoadedContent, ReadError> + Send + Sync + '_ {
        move |path: &str, _: &str, _: bool| {
            counter.fetch_add(1, Ordering::SeqCst);
            if path == "a.md" {
                Ok(LoadedContent::new("A", path))
            } else {
                Err(ReadError::not_found(path))
            }
        }
    }

    #[test]
    fn test_second_read_hits_cache() {
        let counter = AtomicUsize::new(0);
        let reader = CachingReader::new(counting_reader(&counter));

        assert_eq!(reader.read("a.md", "x.md", true).unwrap().content, "A");
        assert_eq!(reader.read("a.md", "y.md", true).unwrap().content, "A");

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(reader.len(), 1);
    }

    #[test]
    fn test_errors_not_cached() {
        let counter = AtomicUsize::new(0);
        let reader = CachingReader::new(counting_reader(&counter));

        assert!(reader.read("b.md", "", true).is_err());
        assert!(reader.read("b.md", "", true).is_err());

        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_invalidate_and_clear() {
        let counter = AtomicUsize::new(0);
        let reader = CachingReader::new(counting_reader(&counter));

        reader.read("a.md", "", true).unwrap();
        reader.invalidate("a.md");
        reader.read("a.md", "", true).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 2);

        reader.clear();
        assert!(reader.is_empty());
    }
}
