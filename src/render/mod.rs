//! Rendering sidebar tables back to `sidebar-items.js` and to readable text.

mod text;

use crate::model::SidebarItems;
use rmcp::schemars;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

pub use text::{
    render_hits, render_module, render_modules, render_report, render_search, render_suggestions,
};

/// DetailLevel level for text output.
///
/// DO NOT add doc comments to individual variants - this causes schemars to generate
/// `oneOf` schemas instead of simple `enum` arrays, breaking MCP client enum handling.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    schemars::JsonSchema,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    Low,
    #[default]
    Medium,
    High,
}

/// JavaScript wrapper written around the sidebar object.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Envelope {
    /// `initSidebarItems({...});` with `[name, description]` pairs.
    #[default]
    Legacy,
    /// `window.SIDEBAR_ITEMS = {...};` with names only.
    Window,
}

/// Emit a sidebar file. Categories come out in display order and entries in stored order.
pub fn render_sidebar_items(items: &SidebarItems, envelope: Envelope) -> String {
    let mut out = String::new();
    out.push_str(match envelope {
        Envelope::Legacy => "initSidebarItems(",
        Envelope::Window => "window.SIDEBAR_ITEMS = ",
    });

    out.push('{');
    for (i, (category, entries)) in items.sections().enumerate() {
        if i > 0 {
            out.push(',');
        }
        let _ = write!(out, "{}:[", json_string(category.key()));
        for (j, entry) in entries.iter().enumerate() {
            if j > 0 {
                out.push(',');
            }
            match envelope {
                Envelope::Legacy => {
                    let _ = write!(
                        out,
                        "[{},{}]",
                        json_string(&entry.name),
                        json_string(&entry.description)
                    );
                }
                Envelope::Window => out.push_str(&json_string(&entry.name)),
            }
        }
        out.push(']');
    }
    out.push('}');

    out.push_str(match envelope {
        Envelope::Legacy => ");",
        Envelope::Window => ";",
    });
    out
}

fn json_string(s: &str) -> String {
    // Serializing a str cannot fail.
    serde_json::to_string(s).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, SidebarEntry};
    use crate::parse::parse_sidebar_items;
    use assert2::{check, let_assert};

    fn pool_items() -> SidebarItems {
        [
            (Category::Trait, SidebarEntry::new("HandleError", "A trait which handles errors reported by the `ManageConnection`.")),
            (Category::Mod, SidebarEntry::new("config", "Pool configuration.")),
            (Category::Struct, SidebarEntry::new("Pool", "A generic connection pool.")),
            (Category::Struct, SidebarEntry::new("Config", "A struct with a \"quoted\" word.")),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_legacy_output_is_deterministic() {
        let rendered = render_sidebar_items(&pool_items(), Envelope::Legacy);
        check!(rendered.starts_with(r#"initSidebarItems({"mod":[["config","Pool configuration."]],"struct":[["Pool""#));
        check!(rendered.contains(r#"\"quoted\""#));
        check!(rendered.ends_with("]]});"));
    }

    #[test]
    fn test_legacy_output_parses_back() {
        let items = pool_items();
        let_assert!(Ok(parsed) = parse_sidebar_items(&render_sidebar_items(&items, Envelope::Legacy)));
        check!(parsed == items);
    }

    #[test]
    fn test_window_output_drops_descriptions() {
        let rendered = render_sidebar_items(&pool_items(), Envelope::Window);
        check!(rendered == r#"window.SIDEBAR_ITEMS = {"mod":["config"],"struct":["Pool","Config"],"trait":["HandleError"]};"#);

        let_assert!(Ok(parsed) = parse_sidebar_items(&rendered));
        check!(parsed.len() == 4);
        check!(parsed.entries().all(|(_, e)| e.description.is_empty()));
    }

    #[test]
    fn test_empty_table() {
        check!(render_sidebar_items(&SidebarItems::new(), Envelope::Legacy) == "initSidebarItems({});");
    }
}
