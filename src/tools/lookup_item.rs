use crate::error::Result;
use crate::render::{DetailLevel, render_hits, render_module, render_suggestions};
use crate::state::DocState;
use rmcp::schemars;
use serde::Deserialize;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LookupItemRequest {
    /// Item path such as `r2d2::Pool`, or a bare name such as `Pool`
    pub path: String,
    /// Detail level: low (names), medium (+ first sentence), high (+ full description)
    #[serde(default = "default_detail_level")]
    pub detail_level: DetailLevel,
}

const fn default_detail_level() -> DetailLevel {
    DetailLevel::High
}

/// Resolve an item path. Falls back to a module listing when the path names
/// a module, and to fuzzy suggestions when nothing matches.
pub async fn handle_lookup_item(state: &DocState, request: LookupItemRequest) -> Result<String> {
    let docs = state.docs().await?;
    let hits = docs.tree.lookup(&request.path);

    if !hits.is_empty() {
        return Ok(render_hits(&hits, request.detail_level));
    }

    if let Some(items) = docs.tree.module(&request.path) {
        return Ok(render_module(&request.path, items, request.detail_level));
    }

    let config = state.config();
    let suggestions = docs
        .tree
        .suggest(&request.path, 5, config.suggestion_threshold);
    Ok(render_suggestions(&request.path, &suggestions))
}
