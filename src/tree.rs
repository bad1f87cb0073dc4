//! A documentation directory loaded as a tree of sidebar tables.
//!
//! Every `sidebar-items.js` under the root becomes one module, named by its
//! parent directory relative to the root (`mysql/value` → `mysql::value`).

use crate::error::Result;
use crate::model::{Category, SidebarEntry, SidebarItems};
use crate::parse::parse_sidebar_items;
use crate::validate::{Report, validate};
use ignore::WalkBuilder;
use rapidfuzz::distance::jaro_winkler;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use xxhash_rust::xxh3::Xxh3;

/// File name rustdoc writes next to every module page.
pub const SIDEBAR_FILE: &str = "sidebar-items.js";

/// Display name for the module at the documentation root.
pub const ROOT_MODULE_LABEL: &str = "<root>";

/// A sidebar file that was found but could not be read or parsed.
#[derive(Debug, Clone, Serialize)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub error: String,
}

impl LoadFailure {
    fn new(path: &Path, error: impl std::fmt::Display) -> Self {
        Self {
            path: path.to_path_buf(),
            error: error.to_string(),
        }
    }
}

/// One resolved item: where it lives and what it is.
#[derive(Debug, Clone, Copy)]
pub struct ItemHit<'a> {
    pub module: &'a str,
    pub category: Category,
    pub entry: &'a SidebarEntry,
}

impl ItemHit<'_> {
    /// `module::name`, or just `name` at the root.
    pub fn qualified_path(&self) -> String {
        qualify(self.module, &self.entry.name)
    }
}

/// A fuzzy "did you mean" candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub path: String,
    pub score: f64,
}

/// Item counts for a loaded tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TreeStats {
    pub modules: usize,
    pub items: usize,
    pub per_category: BTreeMap<Category, usize>,
    pub failures: usize,
}

/// All sidebar tables found under a documentation root.
#[derive(Debug, Clone)]
pub struct DocTree {
    root: PathBuf,
    modules: BTreeMap<String, SidebarItems>,
    failures: Vec<LoadFailure>,
    fingerprint: u64,
}

impl DocTree {
    /// Walk `root` and parse every sidebar file below it.
    ///
    /// Files that cannot be read or parsed are recorded in [`DocTree::failures`]
    /// rather than aborting the load.
    pub fn load(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            anyhow::bail!("Documentation root is not a directory: {}", root.display());
        }

        let start = std::time::Instant::now();
        let mut files: Vec<PathBuf> = WalkBuilder::new(root)
            .hidden(false)
            .ignore(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .parents(false)
            .build()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_some_and(|t| t.is_file()))
            .filter(|e| e.file_name() == SIDEBAR_FILE)
            .map(ignore::DirEntry::into_path)
            .collect();

        // Sorted for a deterministic fingerprint
        files.sort();

        let mut hasher = Xxh3::new();
        let mut modules = BTreeMap::new();
        let mut failures = Vec::new();

        for path in files {
            let relative = path.strip_prefix(root).unwrap_or(&path);
            let module = module_path_for(relative);

            let bytes = match std::fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!("Skipping unreadable sidebar file {}: {}", path.display(), e);
                    failures.push(LoadFailure::new(&path, e));
                    continue;
                }
            };

            hasher.update(relative.to_string_lossy().as_bytes());
            hasher.update(&[0]);
            hasher.update(&bytes);

            let parsed = String::from_utf8(bytes)
                .map_err(|e| e.to_string())
                .and_then(|source| parse_sidebar_items(&source).map_err(|e| e.to_string()));
            match parsed {
                Ok(items) => {
                    tracing::trace!("Loaded {} items for module '{}'", items.len(), module);
                    modules.insert(module, items);
                }
                Err(e) => {
                    tracing::warn!("Skipping unparseable sidebar file {}: {}", path.display(), e);
                    failures.push(LoadFailure::new(&path, e));
                }
            }
        }

        let tree = Self {
            root: root.to_path_buf(),
            modules,
            failures,
            fingerprint: hasher.digest(),
        };

        tracing::info!(
            "Loaded documentation tree at {}: {} modules, {} items, {} failures in {:?}",
            root.display(),
            tree.modules.len(),
            tree.item_count(),
            tree.failures.len(),
            start.elapsed()
        );

        Ok(tree)
    }

    /// Build a tree from already-parsed tables.
    pub fn from_modules<I, S>(root: impl Into<PathBuf>, modules: I) -> Self
    where
        I: IntoIterator<Item = (S, SidebarItems)>,
        S: Into<String>,
    {
        let modules: BTreeMap<String, SidebarItems> =
            modules.into_iter().map(|(m, i)| (m.into(), i)).collect();

        let mut hasher = Xxh3::new();
        for (module, items) in &modules {
            hasher.update(module.as_bytes());
            hasher.update(&[0]);
            // Serializing an in-memory table cannot fail.
            hasher.update(&postcard::to_allocvec(items).unwrap_or_default());
        }

        Self {
            root: root.into(),
            modules,
            failures: Vec::new(),
            fingerprint: hasher.digest(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Hash over every file's relative path and contents.
    pub const fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    pub fn failures(&self) -> &[LoadFailure] {
        &self.failures
    }

    /// Module paths, sorted.
    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    pub fn module(&self, path: &str) -> Option<&SidebarItems> {
        self.modules.get(normalize_module(path))
    }

    /// `(module, table)` pairs in module order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SidebarItems)> {
        self.modules.iter().map(|(m, i)| (m.as_str(), i))
    }

    /// Every item in the tree.
    pub fn items(&self) -> impl Iterator<Item = ItemHit<'_>> {
        self.iter().flat_map(|(module, items)| {
            items.entries().map(move |(category, entry)| ItemHit {
                module,
                category,
                entry,
            })
        })
    }

    pub fn item_count(&self) -> usize {
        self.modules.values().map(SidebarItems::len).sum()
    }

    /// Resolve `module::path::Name`.
    ///
    /// A bare name with no module prefix is looked up in every module. A name
    /// present in more than one category yields one hit per category.
    pub fn lookup(&self, path: &str) -> Vec<ItemHit<'_>> {
        let segments: Vec<&str> = path
            .split("::")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        let Some((name, prefix)) = segments.split_last() else {
            return Vec::new();
        };

        if prefix.is_empty() {
            return self.items().filter(|hit| hit.entry.name == *name).collect();
        }

        let module = prefix.join("::");
        match self.modules.get_key_value(module.as_str()) {
            Some((module, items)) => items
                .find(name)
                .into_iter()
                .map(|(category, entry)| ItemHit {
                    module,
                    category,
                    entry,
                })
                .collect(),
            None => Vec::new(),
        }
    }

    /// Fuzzy candidates for a query that did not resolve, best first.
    pub fn suggest(&self, query: &str, limit: usize, threshold: f64) -> Vec<Suggestion> {
        let query = query.trim().to_lowercase();
        let bare_query = !query.contains("::");

        let score = |candidate: &str, name: &str| {
            let full = jaro_winkler::similarity(query.chars(), candidate.to_lowercase().chars());
            if bare_query {
                full.max(jaro_winkler::similarity(query.chars(), name.to_lowercase().chars()))
            } else {
                full
            }
        };

        let item_candidates = self.items().map(|hit| {
            let path = hit.qualified_path();
            let s = score(&path, &hit.entry.name);
            Suggestion { path, score: s }
        });
        let module_candidates = self.modules().filter(|m| !m.is_empty()).map(|module| {
            let last = module.rsplit("::").next().unwrap_or(module);
            Suggestion {
                path: module.to_string(),
                score: score(module, last),
            }
        });

        let mut suggestions: Vec<_> = item_candidates
            .chain(module_candidates)
            .filter(|s| s.score >= threshold)
            .collect();
        suggestions.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.path.cmp(&b.path)));
        suggestions.dedup_by(|a, b| a.path == b.path);
        suggestions.truncate(limit);
        suggestions
    }

    /// Validate every module.
    pub fn validate_all(&self) -> Vec<(&str, Report)> {
        self.iter()
            .map(|(module, items)| (module, validate(items)))
            .collect()
    }

    pub fn stats(&self) -> TreeStats {
        let mut per_category = BTreeMap::new();
        for hit in self.items() {
            *per_category.entry(hit.category).or_insert(0) += 1;
        }
        TreeStats {
            modules: self.modules.len(),
            items: self.item_count(),
            per_category,
            failures: self.failures.len(),
        }
    }
}

/// `mysql/value/sidebar-items.js` → `mysql::value`; a root-level file → `""`.
pub fn module_path_for(relative: &Path) -> String {
    relative
        .parent()
        .map(|dir| {
            dir.components()
                .filter_map(|c| match c {
                    Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("::")
        })
        .unwrap_or_default()
}

/// Join a module path and an item name.
pub fn qualify(module: &str, name: &str) -> String {
    if module.is_empty() {
        name.to_string()
    } else {
        format!("{}::{}", module, name)
    }
}

/// Accept the root label and surrounding `::` as spellings of a module path.
fn normalize_module(path: &str) -> &str {
    let path = path.trim();
    if path == ROOT_MODULE_LABEL {
        ""
    } else {
        path.trim_matches(':')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use rstest::rstest;

    fn sample_tree() -> DocTree {
        let value: SidebarItems = [
            (Category::Enum, SidebarEntry::new("Value", "`Value` enumerates possible values in mysql cells.")),
            (Category::Fn, SidebarEntry::new("from_row", "Will *panic* if could not convert `row` to `T`.")),
            (Category::Trait, SidebarEntry::new("FromRow", "Trait to convert `Vec<Value>` into tuple.")),
        ]
        .into_iter()
        .collect();
        let pool: SidebarItems = [
            (Category::Mod, SidebarEntry::new("config", "Pool configuration.")),
            (Category::Struct, SidebarEntry::new("Pool", "A generic connection pool.")),
            (Category::Struct, SidebarEntry::new("Config", "A struct specifying the runtime configuration of a pool.")),
        ]
        .into_iter()
        .collect();
        DocTree::from_modules("/docs", [("mysql::value", value), ("r2d2", pool)])
    }

    #[rstest]
    #[case("mysql/value/sidebar-items.js", "mysql::value")]
    #[case("r2d2/sidebar-items.js", "r2d2")]
    #[case("sidebar-items.js", "")]
    fn test_module_path_for(#[case] relative: &str, #[case] expected: &str) {
        check!(module_path_for(Path::new(relative)) == expected);
    }

    #[test]
    fn test_lookup_qualified() {
        let tree = sample_tree();
        let hits = tree.lookup("mysql::value::from_row");
        let_assert!([hit] = hits.as_slice());
        check!(hit.category == Category::Fn);
        check!(hit.qualified_path() == "mysql::value::from_row");
    }

    #[test]
    fn test_lookup_bare_name_searches_all_modules() {
        let tree = sample_tree();
        let hits = tree.lookup("Pool");
        let_assert!([hit] = hits.as_slice());
        check!(hit.module == "r2d2");
    }

    #[rstest]
    #[case("mysql::value::Missing")]
    #[case("nope::Pool")]
    #[case("")]
    #[case("::")]
    fn test_lookup_misses(#[case] path: &str) {
        check!(sample_tree().lookup(path).is_empty());
    }

    #[test]
    fn test_suggest_close_names() {
        let tree = sample_tree();
        let suggestions = tree.suggest("from_rows", 3, 0.8);
        let_assert!(Some(first) = suggestions.first());
        check!(first.path == "mysql::value::from_row");
    }

    #[test]
    fn test_suggest_respects_threshold() {
        check!(sample_tree().suggest("zzzzzz", 5, 0.8).is_empty());
    }

    #[test]
    fn test_module_lookup_spellings() {
        let tree = sample_tree();
        check!(tree.module("r2d2").is_some());
        check!(tree.module("::r2d2").is_some());
        check!(tree.module("mysql").is_none());
    }

    #[test]
    fn test_stats() {
        let stats = sample_tree().stats();
        check!(stats.modules == 2);
        check!(stats.items == 6);
        check!(stats.per_category.get(&Category::Struct) == Some(&2));
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let a = sample_tree();
        let b = DocTree::from_modules("/docs", [("r2d2", SidebarItems::new())]);
        check!(a.fingerprint() == sample_tree().fingerprint());
        check!(a.fingerprint() != b.fingerprint());
    }
}
