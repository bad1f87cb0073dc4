//! Shared documentation state for the server.
//!
//! Loaded documentation roots are kept in an LRU cache. Concurrent requests
//! for a root that is still loading await the same shared future instead of
//! walking the directory twice.

use crate::config::Config;
use crate::error::RootError;
use crate::search::TermIndex;
use crate::tree::DocTree;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use lru::LruCache;
use std::borrow::Cow;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// A parsed documentation tree together with its search index.
#[derive(Debug)]
pub struct LoadedDocs {
    pub tree: DocTree,
    pub index: TermIndex,
}

impl LoadedDocs {
    /// Load a tree and obtain its index, consulting the on-disk cache if given.
    pub fn load(root: &Path, cache_dir: Option<&Path>) -> crate::error::Result<Self> {
        let tree = DocTree::load(root)?;
        let index = match cache_dir {
            Some(dir) => TermIndex::load_or_build(&tree, dir),
            None => TermIndex::build(&tree),
        };
        Ok(Self { tree, index })
    }
}

type SharedLoad = Shared<BoxFuture<'static, Result<Arc<LoadedDocs>, RootError>>>;

pub struct DocState {
    config: Config,

    /// LRU cache of loaded roots, keyed by canonical path
    cache: RwLock<LruCache<PathBuf, Arc<LoadedDocs>>>,

    /// Loads in progress (can be awaited by multiple callers)
    in_flight: Mutex<HashMap<PathBuf, SharedLoad>>,

    /// Root used when a request does not name one
    root: RwLock<Option<PathBuf>>,
}

impl std::fmt::Debug for DocState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocState")
            .field("config", &self.config)
            .field("cache_size", &self.cache.try_read().map(|c| c.len()).ok())
            .field("root", &self.root.try_read().map(|r| r.clone()).ok())
            .finish_non_exhaustive()
    }
}

impl DocState {
    pub fn new(config: Config) -> Self {
        let capacity = NonZeroUsize::new(config.cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            config,
            cache: RwLock::new(LruCache::new(capacity)),
            in_flight: Mutex::new(HashMap::new()),
            root: RwLock::new(None),
        }
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The current documentation root, if one is set.
    pub async fn root(&self) -> Option<PathBuf> {
        self.root.read().await.clone()
    }

    /// Validate and select a documentation root.
    ///
    /// Returns the canonical path and whether it differs from the previous root.
    /// Other roots stay cached.
    pub async fn set_root(&self, path: &str) -> Result<(PathBuf, bool), RootError> {
        let expanded = PathBuf::from(expand_tilde(path).as_ref());
        let canonical = tokio::fs::canonicalize(&expanded)
            .await
            .map_err(|_| RootError::NotFound(expanded.clone()))?;

        if !canonical.is_dir() {
            return Err(RootError::NotADirectory(canonical));
        }

        let mut root = self.root.write().await;
        let changed = root.as_deref() != Some(canonical.as_path());
        *root = Some(canonical.clone());

        if changed {
            tracing::info!("Documentation root set to {}", canonical.display());
        }
        Ok((canonical, changed))
    }

    /// Docs for the current root.
    pub async fn docs(&self) -> Result<Arc<LoadedDocs>, RootError> {
        let root = self.root().await.ok_or(RootError::NotConfigured)?;
        self.docs_for(&root).await
    }

    /// Docs for a specific canonical root, loading them if needed.
    pub async fn docs_for(&self, root: &Path) -> Result<Arc<LoadedDocs>, RootError> {
        {
            let mut cache = self.cache.write().await;
            if let Some(docs) = cache.get(root) {
                tracing::debug!("Cache hit for {}", root.display());
                return Ok(docs.clone());
            }
        }

        let future = {
            let mut in_flight = self.in_flight.lock().await;

            // A load may have finished between the cache check and taking this lock
            if let Some(docs) = self.cache.read().await.peek(root) {
                return Ok(docs.clone());
            }

            if let Some(future) = in_flight.get(root) {
                tracing::debug!("Awaiting in-flight load for {}", root.display());
                future.clone()
            } else {
                let future = self.load_future(root.to_path_buf());
                in_flight.insert(root.to_path_buf(), future.clone());
                future
            }
        };

        let result = future.await;

        // Cached before the in-flight entry is removed; see the re-check above
        if let Ok(ref docs) = result {
            self.cache.write().await.put(root.to_path_buf(), docs.clone());
        }
        self.in_flight.lock().await.remove(root);

        result
    }

    fn load_future(&self, root: PathBuf) -> SharedLoad {
        let cache_dir = self
            .config
            .use_cache
            .then(|| self.config.cache_dir.clone());

        let future: BoxFuture<'static, Result<Arc<LoadedDocs>, RootError>> = Box::pin(async move {
            tracing::info!("Loading documentation from {}", root.display());
            let task_root = root.clone();
            let loaded = tokio::task::spawn_blocking(move || {
                LoadedDocs::load(&task_root, cache_dir.as_deref())
            })
            .await;

            match loaded {
                Ok(Ok(docs)) => Ok(Arc::new(docs)),
                Ok(Err(e)) => Err(RootError::LoadFailed {
                    root,
                    error: format!("{:#}", e),
                }),
                Err(e) => Err(RootError::LoadFailed {
                    root,
                    error: format!("loading task failed: {}", e),
                }),
            }
        });

        future.shared()
    }

    /// Drop a root from the cache so the next request reloads it.
    pub async fn invalidate(&self, root: &Path) {
        self.cache.write().await.pop(root);
    }

    pub async fn is_cached(&self, root: &Path) -> bool {
        self.cache.read().await.contains(root)
    }
}

/// Expands tilde (`~`) in a path to the user's home directory.
///
/// - `~/foo` becomes `/home/user/foo`
/// - `~` becomes `/home/user`
/// - Other paths are returned unchanged
pub fn expand_tilde(path: &str) -> Cow<'_, str> {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return Cow::Owned(home.join(stripped).display().to_string());
        }
    } else if path == "~"
        && let Some(home) = dirs::home_dir()
    {
        return Cow::Owned(home.display().to_string());
    }
    Cow::Borrowed(path)
}
