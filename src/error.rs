//! Error handling types and utilities.

use std::path::PathBuf;

pub use crate::parse::ParseError;

/// A specialized Result type for sidebar-index operations.
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` methods throughout the codebase.
pub type Result<T> = anyhow::Result<T>;

/// Error returned when a documentation root cannot be used.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RootError {
    #[error("No documentation root configured. Use set_doc_root or pass --root.")]
    NotConfigured,
    #[error("Documentation root does not exist: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Documentation root is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("Failed to load documentation at {}: {error}", .root.display())]
    LoadFailed { root: PathBuf, error: String },
}
