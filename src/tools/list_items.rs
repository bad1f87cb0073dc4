use crate::error::Result;
use crate::model::{Category, SidebarItems};
use crate::render::{DetailLevel, render_module};
use crate::state::DocState;
use anyhow::anyhow;
use rmcp::schemars;
use serde::Deserialize;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListItemsRequest {
    /// Module path such as `mysql::value`; use `<root>` for the top level
    pub module: String,
    /// Only list items of this category
    #[serde(default)]
    pub category: Option<Category>,
    /// Detail level: low (names), medium (+ first sentence), high (+ full description)
    #[serde(default)]
    pub detail_level: DetailLevel,
}

/// Show one module's sidebar.
pub async fn handle_list_items(state: &DocState, request: ListItemsRequest) -> Result<String> {
    let docs = state.docs().await?;
    let threshold = state.config().suggestion_threshold;

    let Some(items) = docs.tree.module(&request.module) else {
        let suggestions: Vec<String> = docs
            .tree
            .suggest(&request.module, 5, threshold)
            .into_iter()
            .filter(|s| docs.tree.module(&s.path).is_some())
            .map(|s| format!("`{}`", s.path))
            .collect();
        return Err(if suggestions.is_empty() {
            anyhow!("Module '{}' not found", request.module)
        } else {
            anyhow!(
                "Module '{}' not found. Did you mean: {}?",
                request.module,
                suggestions.join(", ")
            )
        });
    };

    let output = match request.category {
        Some(category) => {
            let filtered: SidebarItems = items
                .get(category)
                .unwrap_or_default()
                .iter()
                .map(|entry| (category, entry.clone()))
                .collect();
            if filtered.is_empty() {
                return Ok(format!(
                    "Module `{}` has no {}.\n",
                    request.module,
                    category.label().to_lowercase()
                ));
            }
            render_module(&request.module, &filtered, request.detail_level)
        }
        None => render_module(&request.module, items, request.detail_level),
    };

    Ok(output)
}
