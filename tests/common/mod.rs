//! Shared test fixtures for integration tests.
//!
//! Each test gets its own temporary documentation root populated with real
//! `sidebar-items.js` files, and its own `DocState` with an empty in-memory
//! cache and a private on-disk index directory.
//!
//! # Available Fixtures
//!
//! - `isolated_docs`: three well-formed modules (`mysql::value`, `r2d2`, `r2d2::config`)
//! - `faulty_docs`: the same plus one table with validation errors and one unparseable file
//!
//! Fixtures do not select the root; call [`IsolatedDocs::select_root`] first.

use rstest::fixture;
use sidebar_index::{Config, DocState};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// `mysql::value`, legacy envelope, as generated by an older rustdoc.
pub const MYSQL_VALUE: &str = r#"initSidebarItems({"enum":[["Value","`Value` enumerates possible values in mysql cells. Also `Value` used to fill prepared statements."]],"fn":[["from_row","Will *panic* if could not convert `row` to `T`."],["from_row_opt","Will return `Err(row)` if could not convert `row` to `T`"],["from_value","Will panic if could not convert `v` to `T`"],["from_value_opt","Will return `Err(v)` if could not convert `v` to `T`"]],"struct":[["SignedDuration","A way to store negativeness of mysql's time. `.0 == true` means negative."]],"trait":[["FromRow","Trait to convert `Vec<Value>` into tuple of `FromValue` implementors up to arity 12."],["FromValue","Implement this trait to convert value to something."],["IntoValue","Implement this trait if you want to convert something to `Value`."],["ToRow",""],["ToValue",""]]});"#;

/// `r2d2`, legacy envelope.
pub const R2D2: &str = r#"initSidebarItems({"mod":[["config","Pool configuration."]],"struct":[["Config","A struct specifying the runtime configuration of a pool."],["GetTimeout","An error returned by `Pool::get` if it times out without retrieving a connection."],["InitializationError","An error returned by `Pool::new` if it fails to initialize connections."],["LoggingErrorHandler","A `HandleError` implementation which logs at the error level."],["NopConnectionCustomizer","A `CustomizeConnection` which does nothing."],["NopErrorHandler","A `HandleError` implementation which does nothing."],["Pool","A generic connection pool."],["PooledConnection","A smart pointer wrapping a connection."]],"trait":[["CustomizeConnection","A trait which allows for customization of connections."],["HandleError","A trait which handles errors reported by the `ManageConnection`."],["ManageConnection","A trait which provides connection-specific functionality."]]});"#;

/// `r2d2::config`, newer names-only envelope.
pub const R2D2_CONFIG: &str = r#"window.SIDEBAR_ITEMS = {"struct":["Builder","Config"]};"#;

/// A table with a duplicate, a non-identifier name and an empty category.
pub const FAULTY: &str = r#"initSidebarItems({"struct":[["Pool","first"],["Pool","second"],["not an ident","spaces"]],"enum":[]});"#;

/// Truncated output that cannot be parsed.
pub const BROKEN: &str = r#"initSidebarItems({"struct":[["Pool""#;

/// A temporary directory that is removed when dropped.
#[allow(dead_code)] // Methods used across different integration test crates
pub struct TempWorkspace {
    _temp: TempDir,
    root: PathBuf,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl TempWorkspace {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().to_path_buf();
        Self { _temp: temp, root }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Write `content` to `relative`, creating parent directories.
    pub fn create_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Path string suitable for `set_root` and `set_doc_root`.
    pub fn display(&self) -> String {
        self.root.display().to_string()
    }
}

/// A documentation root, an index cache directory and a `DocState` using it.
#[allow(dead_code)]
pub struct IsolatedDocs {
    pub docs: TempWorkspace,
    pub cache: TempWorkspace,
    pub state: Arc<DocState>,
}

#[allow(dead_code)]
impl IsolatedDocs {
    fn new(docs: TempWorkspace) -> Self {
        let cache = TempWorkspace::new();
        let state = Arc::new(DocState::new(config_for(cache.path())));
        Self { docs, cache, state }
    }

    /// Point the state at this fixture's documentation root.
    pub async fn select_root(&self) -> PathBuf {
        let (root, _) = self
            .state
            .set_root(&self.docs.display())
            .await
            .expect("Failed to set documentation root");
        root
    }

    /// A state sharing this fixture's on-disk cache but with an empty memory cache.
    pub fn fresh_state(&self) -> Arc<DocState> {
        Arc::new(DocState::new(config_for(self.cache.path())))
    }

    /// Search index files currently in the cache directory.
    pub fn index_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(self.cache.path())
            .expect("Failed to read cache directory")
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|e| e == "index"))
            .collect();
        files.sort();
        files
    }
}

fn config_for(cache_dir: &Path) -> Config {
    Config {
        cache_dir: cache_dir.to_path_buf(),
        ..Config::default()
    }
}

/// Write the standard set of sidebar files into `workspace`.
pub fn populate(workspace: &TempWorkspace) {
    workspace.create_file("mysql/value/sidebar-items.js", MYSQL_VALUE);
    workspace.create_file("r2d2/sidebar-items.js", R2D2);
    workspace.create_file("r2d2/config/sidebar-items.js", R2D2_CONFIG);
    // Not a sidebar file; must be ignored
    workspace.create_file("r2d2/struct.Pool.html", "<html></html>");
}

/// Well-formed documentation for three modules.
#[fixture]
pub fn isolated_docs() -> IsolatedDocs {
    let docs = TempWorkspace::new();
    populate(&docs);
    IsolatedDocs::new(docs)
}

/// [`isolated_docs`] plus one faulty and one unparseable sidebar file.
#[fixture]
pub fn faulty_docs() -> IsolatedDocs {
    let docs = TempWorkspace::new();
    populate(&docs);
    docs.create_file("faulty/sidebar-items.js", FAULTY);
    docs.create_file("broken/sidebar-items.js", BROKEN);
    IsolatedDocs::new(docs)
}
