use crate::error::Result;
use crate::state::DocState;
use crate::tree::TreeStats;
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;
use std::path::Path;

/// Parameters for set_doc_root tool
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetDocRootRequest {
    /// Path to a generated documentation directory (e.g. target/doc)
    pub path: String,
}

/// Select a documentation root and load it, reporting what was found.
pub async fn handle_set_doc_root(state: &DocState, request: SetDocRootRequest) -> Result<String> {
    let (root, changed) = state.set_root(&request.path).await?;
    let docs = state.docs_for(&root).await?;
    Ok(format_response(&root, changed, &docs.tree.stats()))
}

/// Format a user-friendly response showing the loaded root.
pub fn format_response(root: &Path, changed: bool, stats: &TreeStats) -> String {
    let mut response = if changed {
        format!("Documentation root set: {}\n\n", root.display())
    } else {
        format!("Documentation root unchanged: {}\n\n", root.display())
    };

    let _ = writeln!(
        response,
        "{} modules, {} items",
        stats.modules, stats.items
    );
    for (category, count) in &stats.per_category {
        let _ = writeln!(response, "  - {}: {}", category.label(), count);
    }
    if stats.failures > 0 {
        let _ = writeln!(
            response,
            "\n{} sidebar file(s) could not be parsed; run validate or list_modules for details.",
            stats.failures
        );
    }
    if stats.modules == 0 {
        response.push_str("\nNo sidebar-items.js files were found under this directory.\n");
    }

    response
}
