//! TF-IDF inverted index over sidebar entries, with an on-disk cache.

use super::tokenize::{hash_term, tokenize_and_stem};
use crate::error::Result;
use crate::model::Category;
use crate::tree::{DocTree, qualify};
use ahash::AHashMap;
use anyhow::Context;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use xxhash_rust::xxh3::xxh3_64;

/// Term hash for fast lookup
type TermHash = u64;

/// Weight of a term occurring in an item name.
const NAME_WEIGHT: f32 = 2.0;
/// Weight of a term occurring in a description.
const DESCRIPTION_WEIGHT: f32 = 1.0;
/// Added to the score of an item whose name equals the whole query.
const EXACT_NAME_BOOST: f32 = 10.0;

/// Extension of cached index files.
const INDEX_EXTENSION: &str = "index";

/// One searchable item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedDoc {
    pub module: String,
    pub category: Category,
    pub name: String,
    pub description: String,
}

impl IndexedDoc {
    pub fn qualified_path(&self) -> String {
        qualify(&self.module, &self.name)
    }
}

/// A ranked search hit.
#[derive(Debug, Clone)]
pub struct SearchMatch {
    pub doc: IndexedDoc,
    pub rank: f32,
}

/// A searchable term index with TF-IDF scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermIndex {
    /// Fingerprint of the tree this index was built from
    fingerprint: u64,
    /// Term hash → (doc index, tf-idf score), sorted by score descending
    terms: HashMap<TermHash, Vec<(u32, f32)>>,
    docs: Vec<IndexedDoc>,
}

impl TermIndex {
    /// Index every entry of a tree.
    pub fn build(tree: &DocTree) -> Self {
        let start = std::time::Instant::now();
        let stemmer = Stemmer::create(Algorithm::English);

        let mut docs = Vec::with_capacity(tree.item_count());
        let mut raw: AHashMap<TermHash, Vec<(u32, f32)>> = AHashMap::new();
        let mut doc_lengths = Vec::with_capacity(tree.item_count());

        for hit in tree.items() {
            let doc_idx = u32::try_from(docs.len()).unwrap_or(u32::MAX);
            let mut counts: AHashMap<TermHash, f32> = AHashMap::new();
            let mut length = 0usize;

            for (text, weight) in [
                (hit.entry.name.as_str(), NAME_WEIGHT),
                (hit.entry.description.as_str(), DESCRIPTION_WEIGHT),
            ] {
                for term in tokenize_and_stem(text, &stemmer) {
                    *counts.entry(hash_term(&term)).or_insert(0.0) += weight;
                    length += 1;
                }
            }

            for (term, tf) in counts {
                raw.entry(term).or_default().push((doc_idx, tf));
            }
            doc_lengths.push(length.max(1));
            docs.push(IndexedDoc {
                module: hit.module.to_string(),
                category: hit.category,
                name: hit.entry.name.clone(),
                description: hit.entry.description.clone(),
            });
        }

        let total_docs = docs.len().max(1) as f32;
        let avg_length = doc_lengths.iter().sum::<usize>() as f32 / doc_lengths.len().max(1) as f32;

        let terms = raw
            .into_iter()
            .map(|(term, postings)| {
                // Smoothed so a term present in every item still scores above zero
                let idf = (1.0 + total_docs / postings.len() as f32).ln();
                let mut scored: Vec<(u32, f32)> = postings
                    .into_iter()
                    .map(|(doc, tf)| {
                        let norm = (doc_lengths[doc as usize] as f32 / avg_length).max(0.5);
                        (doc, (1.0 + (tf / norm).ln().max(0.0)) * idf)
                    })
                    .collect();
                scored.sort_by(|(_, a), (_, b)| b.total_cmp(a));
                (term, scored)
            })
            .collect::<HashMap<_, _>>();

        let index = Self {
            fingerprint: tree.fingerprint(),
            terms,
            docs,
        };

        tracing::info!(
            "Built search index: {} unique terms, {} documents in {:?}",
            index.term_count(),
            index.document_count(),
            start.elapsed()
        );

        index
    }

    /// Rank entries against `query`, optionally restricted to one category.
    ///
    /// Scores of all query terms are summed per item; ties are broken by
    /// qualified path so results are stable.
    pub fn search(&self, query: &str, limit: usize, category: Option<Category>) -> Vec<SearchMatch> {
        let exact = query.trim();
        if exact.is_empty() {
            return Vec::new();
        }

        let stemmer = Stemmer::create(Algorithm::English);
        let mut combined: AHashMap<u32, f32> = AHashMap::new();
        for token in &tokenize_and_stem(exact, &stemmer) {
            if let Some(postings) = self.terms.get(&hash_term(token)) {
                for (doc, score) in postings {
                    *combined.entry(*doc).or_insert(0.0) += score;
                }
            }
        }

        // Names made only of stop words (`if`, `for`, `in`) have no terms
        for (idx, doc) in self.docs.iter().enumerate() {
            if is_exact_match(doc, exact) {
                let idx = u32::try_from(idx).unwrap_or(u32::MAX);
                combined.entry(idx).or_insert(0.0);
            }
        }

        let mut results: Vec<SearchMatch> = combined
            .into_iter()
            .filter_map(|(doc, mut rank)| {
                let doc = self.docs.get(doc as usize)?;
                if category.is_some_and(|c| c != doc.category) {
                    return None;
                }
                if is_exact_match(doc, exact) {
                    rank += EXACT_NAME_BOOST;
                }
                Some(SearchMatch {
                    doc: doc.clone(),
                    rank,
                })
            })
            .collect();

        results.sort_by(|a, b| {
            b.rank
                .total_cmp(&a.rank)
                .then_with(|| a.doc.qualified_path().cmp(&b.doc.qualified_path()))
                .then_with(|| a.doc.category.cmp(&b.doc.category))
        });
        results.truncate(limit);
        results
    }

    pub const fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Get the number of unique terms in the index
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Get the number of documents in the index
    pub fn document_count(&self) -> usize {
        self.docs.len()
    }

    /// Load the cached index for `tree` from `cache_dir`, or build and cache it.
    ///
    /// Cache files are named `<root hash>-<fingerprint>.index`; any other
    /// fingerprint for the same root is stale and gets deleted.
    pub fn load_or_build(tree: &DocTree, cache_dir: &Path) -> Self {
        let path = cache_path(cache_dir, tree);

        if let Some(index) = Self::load(&path, tree.fingerprint()) {
            tracing::debug!(
                "Loaded cached search index from {} ({} terms, {} docs)",
                path.display(),
                index.term_count(),
                index.document_count()
            );
            return index;
        }

        remove_stale(cache_dir, tree);
        let index = Self::build(tree);
        index.store(&path);
        index
    }

    fn load(path: &Path, fingerprint: u64) -> Option<Self> {
        let bytes = std::fs::read(path).ok()?;
        match postcard::from_bytes::<Self>(&bytes) {
            Ok(index) if index.fingerprint == fingerprint => Some(index),
            Ok(_) => {
                tracing::info!("Cached index at {} is stale, rebuilding", path.display());
                None
            }
            Err(e) => {
                tracing::warn!("Failed to deserialize cached index at {}: {}", path.display(), e);
                None
            }
        }
    }

    fn store(&self, path: &Path) {
        match self.try_store(path) {
            Ok(()) => tracing::debug!("Cached search index to {}", path.display()),
            Err(e) => tracing::warn!("Failed to write search index to {}: {}", path.display(), e),
        }
    }

    fn try_store(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let bytes = postcard::to_allocvec(self).context("Failed to serialize search index")?;

        // Write then rename so readers never see a partial file
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}

fn is_exact_match(doc: &IndexedDoc, query: &str) -> bool {
    doc.name.eq_ignore_ascii_case(query)
        || (query.contains("::") && doc.qualified_path().eq_ignore_ascii_case(query))
}

fn root_hash(tree: &DocTree) -> u64 {
    xxh3_64(tree.root().to_string_lossy().as_bytes())
}

/// Where the index for `tree` is cached.
pub fn cache_path(cache_dir: &Path, tree: &DocTree) -> PathBuf {
    cache_dir.join(format!(
        "{:016x}-{:016x}.{}",
        root_hash(tree),
        tree.fingerprint(),
        INDEX_EXTENSION
    ))
}

fn remove_stale(cache_dir: &Path, tree: &DocTree) {
    let Ok(entries) = std::fs::read_dir(cache_dir) else {
        return;
    };
    let prefix = format!("{:016x}-", root_hash(tree));
    let current = cache_path(cache_dir, tree);

    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        let is_ours = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(&prefix) && n.ends_with(INDEX_EXTENSION));
        if is_ours && path != current {
            match std::fs::remove_file(&path) {
                Ok(()) => tracing::debug!("Removed stale index {}", path.display()),
                Err(e) => tracing::warn!("Failed to remove stale index {}: {}", path.display(), e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SidebarEntry, SidebarItems};
    use assert2::{check, let_assert};
    use tempfile::TempDir;

    fn pool_tree() -> DocTree {
        let items: SidebarItems = [
            (Category::Mod, SidebarEntry::new("config", "Pool configuration.")),
            (Category::Struct, SidebarEntry::new("Config", "A struct specifying the runtime configuration of a pool.")),
            (Category::Struct, SidebarEntry::new("GetTimeout", "An error returned by `Pool::get` if it times out without retrieving a connection.")),
            (Category::Struct, SidebarEntry::new("Pool", "A generic connection pool.")),
            (Category::Struct, SidebarEntry::new("PooledConnection", "A smart pointer wrapping a connection.")),
            (Category::Trait, SidebarEntry::new("CustomizeConnection", "A trait which allows for customization of connections.")),
            (Category::Trait, SidebarEntry::new("ManageConnection", "A trait which provides connection-specific functionality.")),
        ]
        .into_iter()
        .collect();
        DocTree::from_modules("/docs", [("r2d2", items)])
    }

    #[test]
    fn test_exact_name_ranks_first() {
        let index = TermIndex::build(&pool_tree());
        let results = index.search("Pool", 5, None);
        let_assert!(Some(first) = results.first());
        check!(first.doc.name == "Pool");
    }

    #[test]
    fn test_stop_word_names_match_exactly() {
        let items: SidebarItems = [
            (Category::Keyword, SidebarEntry::new("for", "Iteration with in, trait implementation with impl, or higher-ranked trait bounds.")),
            (Category::Keyword, SidebarEntry::new("if", "Evaluate a block if a condition holds.")),
            (Category::Fn, SidebarEntry::new("spawn", "Spawns a new thread.")),
        ]
        .into_iter()
        .collect();
        let index = TermIndex::build(&DocTree::from_modules("/doc", [("std", items)]));

        let results = index.search("if", 5, None);
        let_assert!([hit] = results.as_slice());
        check!(hit.doc.name == "if");
        check!(hit.doc.category == Category::Keyword);

        let results = index.search("std::for", 5, None);
        let_assert!([hit] = results.as_slice());
        check!(hit.doc.name == "for");

        check!(index.search("in", 5, None).is_empty());
    }

    #[test]
    fn test_stemmed_match() {
        let index = TermIndex::build(&pool_tree());
        let results = index.search("customizing", 5, None);
        check!(results.iter().any(|r| r.doc.name == "CustomizeConnection"));
    }

    #[test]
    fn test_category_filter() {
        let index = TermIndex::build(&pool_tree());
        let results = index.search("connection", 10, Some(Category::Trait));
        check!(!results.is_empty());
        check!(results.iter().all(|r| r.doc.category == Category::Trait));
    }

    #[test]
    fn test_limit_and_empty_query() {
        let index = TermIndex::build(&pool_tree());
        check!(index.search("connection", 2, None).len() == 2);
        check!(index.search("   ", 10, None).is_empty());
        check!(index.search("nonexistentterm", 10, None).is_empty());
    }

    #[test]
    fn test_ranks_descend() {
        let index = TermIndex::build(&pool_tree());
        let results = index.search("connection pool", 10, None);
        check!(results.windows(2).all(|w| w[0].rank >= w[1].rank));
    }

    #[test]
    fn test_cache_roundtrip_and_staleness() {
        let cache = TempDir::new().unwrap();
        let tree = pool_tree();

        let built = TermIndex::load_or_build(&tree, cache.path());
        let path = cache_path(cache.path(), &tree);
        check!(path.exists());

        let loaded = TermIndex::load_or_build(&tree, cache.path());
        check!(loaded.document_count() == built.document_count());
        check!(loaded.term_count() == built.term_count());

        let changed = DocTree::from_modules("/docs", [("r2d2", SidebarItems::new())]);
        let _ = TermIndex::load_or_build(&changed, cache.path());
        check!(!path.exists());
        check!(cache_path(cache.path(), &changed).exists());
    }
}
