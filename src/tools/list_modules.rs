use crate::error::Result;
use crate::render::render_modules;
use crate::state::DocState;
use rmcp::schemars;
use serde::Deserialize;

/// Parameters for list_modules tool
#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ListModulesRequest {}

/// List every module under the current root with per-category counts.
pub async fn handle_list_modules(state: &DocState, _request: ListModulesRequest) -> Result<String> {
    let docs = state.docs().await?;
    Ok(render_modules(&docs.tree))
}
