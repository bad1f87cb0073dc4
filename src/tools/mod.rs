//! MCP tool handlers. Each takes the shared [`DocState`](crate::state::DocState)
//! and a request, and returns formatted text.

pub mod list_items;
pub mod list_modules;
pub mod lookup_item;
pub mod search;
pub mod set_doc_root;
pub mod validate;

pub use list_items::*;
pub use list_modules::*;
pub use lookup_item::*;
pub use search::*;
pub use set_doc_root::*;
pub use validate::*;
