use crate::error::Result;
use crate::render::render_report;
use crate::state::DocState;
use crate::validate::validate;
use anyhow::anyhow;
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ValidateRequest {
    /// Module to check. If omitted, every module is checked.
    #[serde(default)]
    pub module: Option<String>,
}

/// Check sidebar tables for empty, duplicate and malformed names.
pub async fn handle_validate(state: &DocState, request: ValidateRequest) -> Result<String> {
    let docs = state.docs().await?;

    let mut output = match &request.module {
        Some(module) => {
            let items = docs
                .tree
                .module(module)
                .ok_or_else(|| anyhow!("Module '{}' not found", module))?;
            let report = validate(items);
            render_report([(module.as_str(), &report)])
        }
        None => {
            let reports = docs.tree.validate_all();
            render_report(reports.iter().map(|(m, r)| (*m, r)))
        }
    };

    if request.module.is_none() && !docs.tree.failures().is_empty() {
        let _ = writeln!(output, "\nUnparseable files ({}):", docs.tree.failures().len());
        for failure in docs.tree.failures() {
            let _ = writeln!(output, "  • {}: {}", failure.path.display(), failure.error);
        }
    }

    Ok(output)
}
