//! Document-scoped unique identifiers.

use std::collections::{HashMap, HashSet};

use sha2::{Digest, Sha256};

use crate::util::slugify;

/// Length of generated hash IDs, in hex digits.
const HASH_ID_LEN: usize = 5;

/// Hands out element IDs that are unique within one rendered document.
///
/// Heading slugs and generated hash IDs share one namespace, so a heading
/// can never collide with an image description block.
#[derive(Debug, Default)]
pub(crate) struct UniqueIds {
    used: HashSet<String>,
    slug_counts: HashMap<String, usize>,
}

impl UniqueIds {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Slug ID for a heading: `faq`, then `faq-1`, `faq-2`, ...
    pub(crate) fn heading_id(&mut self, text: &str) -> String {
        let mut base = slugify(text);
        if base.is_empty() {
            base.push_str("section");
        }

        let mut n = self.slug_counts.get(&base).copied().unwrap_or_default();
        loop {
            let candidate = match n {
                0 => base.clone(),
                n => format!("{base}-{n}"),
            };
            n += 1;
            if self.used.insert(candidate.clone()) {
                self.slug_counts.insert(base, n);
                return candidate;
            }
        }
    }

    /// Short hash ID derived from `seed`.
    ///
    /// The same seed yields the same ID across renders. On collision the seed
    /// is re-hashed with an increasing counter until an unused ID appears.
    pub(crate) fn hashed_id(&mut self, seed: &str) -> String {
        let mut candidate = short_hash(seed);
        let mut attempt = 0usize;
        while self.used.contains(&candidate) {
            attempt += 1;
            candidate = short_hash(&format!("{seed}#{attempt}"));
        }
        self.used.insert(candidate.clone());
        candidate
    }
}

fn short_hash(seed: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(HASH_ID_LEN);
    digest
}
