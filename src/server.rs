//! MCP server exposing the sidebar index as tools.

use crate::state::DocState;
use crate::tools::{
    ListItemsRequest, ListModulesRequest, LookupItemRequest, SearchRequest, SetDocRootRequest,
    ValidateRequest, handle_list_items, handle_list_modules, handle_lookup_item, handle_search,
    handle_set_doc_root, handle_validate,
};
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars::{self, JsonSchema, generate::SchemaSettings},
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

/// MCP Server for documentation sidebar queries
#[derive(Clone)]
pub struct SidebarServer {
    /// Shared documentation state (cache, current root)
    state: Arc<DocState>,

    /// Tool router for handling MCP tool calls
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for SidebarServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SidebarServer")
            .field("state", &self.state)
            .finish()
    }
}

#[tool_router]
impl SidebarServer {
    pub fn new(state: Arc<DocState>) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Set the documentation directory to query (for example a crate's target/doc). Every sidebar-items.js below it is loaded and indexed."
    )]
    async fn set_doc_root(
        &self,
        Parameters(request): Parameters<SetDocRootRequest>,
    ) -> std::result::Result<String, String> {
        handle_set_doc_root(&self.state, request)
            .await
            .map_err(|e| format!("Failed to set documentation root: {:#}", e))
    }

    #[tool(
        description = "List all documented modules with item counts per category, plus any sidebar files that failed to parse."
    )]
    async fn list_modules(
        &self,
        Parameters(request): Parameters<ListModulesRequest>,
    ) -> std::result::Result<String, String> {
        handle_list_modules(&self.state, request)
            .await
            .map_err(|e| e.to_string())
    }

    #[tool(
        description = "List the items in one module's sidebar, grouped by category (mod, struct, enum, trait, fn, ...), with their one-line descriptions.",
        input_schema = inline_schema_for_type::<ListItemsRequest>()
    )]
    async fn list_items(
        &self,
        Parameters(request): Parameters<ListItemsRequest>,
    ) -> std::result::Result<String, String> {
        handle_list_items(&self.state, request)
            .await
            .map_err(|e| e.to_string())
    }

    #[tool(
        description = "Look up an item by path ('r2d2::Pool') or bare name ('Pool'). Returns its category and description, or fuzzy suggestions when nothing matches.",
        input_schema = inline_schema_for_type::<LookupItemRequest>()
    )]
    async fn lookup_item(
        &self,
        Parameters(request): Parameters<LookupItemRequest>,
    ) -> std::result::Result<String, String> {
        handle_lookup_item(&self.state, request)
            .await
            .map_err(|e| e.to_string())
    }

    #[tool(
        description = "Full-text search over item names and descriptions using TF-IDF with stemming. Optionally restricted to one category.",
        input_schema = inline_schema_for_type::<SearchRequest>()
    )]
    async fn search(
        &self,
        Parameters(request): Parameters<SearchRequest>,
    ) -> std::result::Result<String, String> {
        handle_search(&self.state, request)
            .await
            .map_err(|e| e.to_string())
    }

    #[tool(
        description = "Check sidebar tables for empty names, duplicate names within a category and names that are not valid identifiers."
    )]
    async fn validate(
        &self,
        Parameters(request): Parameters<ValidateRequest>,
    ) -> std::result::Result<String, String> {
        handle_validate(&self.state, request)
            .await
            .map_err(|e| e.to_string())
    }
}

#[tool_handler]
impl ServerHandler for SidebarServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::V_2024_11_05)
            .with_server_info(Implementation::from_build_env())
            .with_instructions(
                "sidebar-index: browse and search rustdoc sidebar indices (sidebar-items.js). \
                 Start with set_doc_root unless a root was configured at startup, then use \
                 list_modules, list_items, lookup_item, search or validate."
                    .to_string(),
            )
    }
}

/// Generate an inline JSON schema for MCP tools
///
/// Unlike rmcp's default `schema_for_type()`, this function sets `inline_subschemas = true`
/// to generate inline enum definitions instead of $ref patterns. This ensures MCP Inspector
/// displays enums as dropdown widgets rather than raw JSON input fields.
pub fn inline_schema_for_type<T: JsonSchema>() -> Arc<JsonObject> {
    let mut settings = SchemaSettings::draft07();
    settings.transforms = vec![Box::new(schemars::transform::AddNullable::default())];
    settings.inline_subschemas = true;

    let generator = settings.into_generator();
    let schema = generator.into_root_schema_for::<T>();
    let object = serde_json::to_value(schema).expect("failed to serialize schema");

    let json_object = match object {
        serde_json::Value::Object(object) => object,
        _ => panic!("Schema serialization produced non-object value"),
    };

    Arc::new(json_object)
}
