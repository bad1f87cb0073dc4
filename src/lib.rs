pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod parse;
pub mod render;
pub mod search;
pub mod server;
pub mod state;
pub mod tools;
pub mod tracing;
pub mod tree;
pub mod validate;

pub use config::Config;
pub use model::{Category, SidebarEntry, SidebarItems};
pub use parse::{parse_sidebar_items, parse_sidebar_items_multi};
pub use render::{DetailLevel, Envelope, render_sidebar_items};
pub use search::TermIndex;
pub use state::DocState;
pub use tree::DocTree;
pub use validate::{Report, Violation, validate};
