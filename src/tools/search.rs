//! TF-IDF search handler for finding sidebar entries.

use crate::error::Result;
use crate::model::Category;
use crate::render::render_search;
use crate::state::DocState;
use rmcp::schemars;
use serde::Deserialize;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchRequest {
    /// Search query term
    pub query: String,
    /// Only return items of this category
    #[serde(default)]
    pub category: Option<Category>,
    /// Maximum number of results to return (default from configuration)
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Search names and descriptions under the current root.
pub async fn handle_search(state: &DocState, request: SearchRequest) -> Result<String> {
    let docs = state.docs().await?;
    let limit = request.limit.unwrap_or(state.config().search_limit);
    let results = docs.index.search(&request.query, limit, request.category);
    Ok(render_search(&results, &request.query))
}
