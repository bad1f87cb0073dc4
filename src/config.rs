//! Runtime configuration.
//!
//! Values are layered: built-in defaults, then a TOML file, then environment
//! variables. Command-line flags are applied on top by the binary.

use crate::error::Result;
use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Name of the per-project config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "sidebar-index.toml";

/// Overrides `doc_root`.
pub const ENV_ROOT: &str = "SIDEBAR_INDEX_ROOT";
/// Overrides `cache_dir`.
pub const ENV_CACHE_DIR: &str = "SIDEBAR_INDEX_CACHE_DIR";

const APP_DIR: &str = "sidebar-index";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Documentation directory to serve when none is set explicitly
    pub doc_root: Option<PathBuf>,
    /// Where search indices are cached
    pub cache_dir: PathBuf,
    /// Number of loaded documentation roots kept in memory
    pub cache_capacity: usize,
    /// Default number of search results
    pub search_limit: usize,
    /// Minimum Jaro-Winkler similarity for "did you mean" suggestions
    pub suggestion_threshold: f64,
    /// Persist search indices to `cache_dir`
    pub use_cache: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            doc_root: None,
            cache_dir: default_cache_dir(),
            cache_capacity: 16,
            search_limit: 10,
            suggestion_threshold: 0.8,
            use_cache: true,
        }
    }
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
}

impl Config {
    /// Load configuration.
    ///
    /// With `explicit`, that file must exist. Otherwise `./sidebar-index.toml`
    /// and then `<config dir>/sidebar-index/config.toml` are tried, and
    /// defaults are used if neither exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::discover() {
                Some(path) => Self::from_file(&path)?,
                None => {
                    tracing::debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Some(local);
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join("config.toml"))
            .filter(|path| path.is_file())
    }

    /// Apply environment overrides through `lookup` so tests need not touch the process env.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(root) = lookup(ENV_ROOT).filter(|v| !v.is_empty()) {
            self.doc_root = Some(PathBuf::from(root));
        }
        if let Some(dir) = lookup(ENV_CACHE_DIR).filter(|v| !v.is_empty()) {
            self.cache_dir = PathBuf::from(dir);
        }
    }

    fn validate(&self) -> Result<()> {
        if self.cache_capacity == 0 {
            anyhow::bail!("cache_capacity must be at least 1");
        }
        if self.search_limit == 0 {
            anyhow::bail!("search_limit must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.suggestion_threshold) {
            anyhow::bail!(
                "suggestion_threshold must be between 0 and 1, got {}",
                self.suggestion_threshold
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        check!(config.doc_root.is_none());
        check!(config.cache_capacity == 16);
        check!(config.search_limit == 10);
        check!(config.use_cache);
        check!(config.cache_dir.ends_with(APP_DIR));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let_assert!(Ok(config) = Config::from_toml("doc_root = \"/srv/doc\"\nsearch_limit = 25\n"));
        check!(config.doc_root == Some(PathBuf::from("/srv/doc")));
        check!(config.search_limit == 25);
        check!(config.cache_capacity == 16);
    }

    #[test]
    fn test_unknown_key_rejected() {
        check!(Config::from_toml("doc_rot = \"/srv/doc\"").is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config::from_toml("doc_root = \"/from/file\"").unwrap();
        let env: HashMap<&str, &str> =
            [(ENV_ROOT, "/from/env"), (ENV_CACHE_DIR, "/tmp/idx")].into();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));
        check!(config.doc_root == Some(PathBuf::from("/from/env")));
        check!(config.cache_dir == PathBuf::from("/tmp/idx"));
    }

    #[test]
    fn test_empty_env_ignored() {
        let mut config = Config::from_toml("doc_root = \"/from/file\"").unwrap();
        config.apply_env(|_| Some(String::new()));
        check!(config.doc_root == Some(PathBuf::from("/from/file")));
    }

    #[test]
    fn test_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "cache_capacity = 4\nuse_cache = false\n").unwrap();

        let_assert!(Ok(config) = Config::from_file(&path));
        check!(config.cache_capacity == 4);
        check!(!config.use_cache);
    }

    #[test]
    fn test_missing_explicit_file_errors() {
        let_assert!(Err(err) = Config::load(Some(Path::new("/definitely/not/here.toml"))));
        check!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_validation() {
        let config = Config {
            suggestion_threshold: 1.5,
            ..Config::default()
        };
        check!(config.validate().is_err());
        check!(Config::default().validate().is_ok());
    }
}
