//! Full-text search over sidebar entries.
//!
//! Names and descriptions are tokenized, stemmed and scored with TF-IDF.
//! Built indices are cached on disk keyed by the documentation fingerprint.

pub(crate) mod index;
pub(crate) mod tokenize;

pub use index::{IndexedDoc, SearchMatch, TermIndex, cache_path};
