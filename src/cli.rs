//! Command-line interface.

use crate::config::Config;
use crate::error::Result;
use crate::model::Category;
use crate::parse::parse_sidebar_items;
use crate::render::{DetailLevel, Envelope, render_sidebar_items};
use crate::server::SidebarServer;
use crate::state::DocState;
use crate::tools::{
    ListItemsRequest, ListModulesRequest, LookupItemRequest, SearchRequest, ValidateRequest,
    handle_list_items, handle_list_modules, handle_lookup_item, handle_search, handle_validate,
};
use crate::tracing::LogFormat;
use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use rmcp::{ServiceExt, transport::stdio};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "sidebar-index", version)]
#[command(about = "Browse, search and validate rustdoc sidebar indices", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./sidebar-index.toml, then the user config dir)
    #[arg(long, global = true, env = "SIDEBAR_INDEX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Documentation directory; overrides the configured doc_root
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// Do not read or write the on-disk search index cache
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Log line format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Serve the MCP protocol over stdio
    Serve,
    /// List documented modules
    Modules,
    /// List the items of one module
    Items {
        module: String,
        #[arg(short, long)]
        category: Option<Category>,
        #[arg(short, long, value_enum, default_value_t = DetailLevel::Medium)]
        detail: DetailLevel,
    },
    /// Look up an item by path or bare name
    Lookup {
        path: String,
        #[arg(short, long, value_enum, default_value_t = DetailLevel::High)]
        detail: DetailLevel,
    },
    /// Full-text search over names and descriptions
    Search {
        query: String,
        #[arg(short, long)]
        category: Option<Category>,
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Check every sidebar file; exits non-zero on errors
    Validate {
        /// Only check this module
        module: Option<String>,
    },
    /// Re-emit a single sidebar file in the chosen envelope
    Render {
        file: PathBuf,
        #[arg(short, long, value_enum, default_value_t = Envelope::Legacy)]
        envelope: Envelope,
        /// Write here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    /// Log level implied by `-v` flags.
    pub const fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::INFO,
            1 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }

    /// Load configuration and apply command-line overrides.
    pub fn resolve_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        self.apply_overrides(&mut config);
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut Config) {
        if let Some(root) = &self.root {
            config.doc_root = Some(root.clone());
        }
        if self.no_cache {
            config.use_cache = false;
        }
    }
}

/// Execute a parsed command line.
pub async fn run(cli: Cli) -> Result<ExitCode> {
    // Rendering a single file needs neither configuration nor a root
    if let Commands::Render {
        file,
        envelope,
        output,
    } = &cli.command
    {
        render_file(file, *envelope, output.as_deref())?;
        return Ok(ExitCode::SUCCESS);
    }

    let config = cli.resolve_config()?;
    let configured_root = config.doc_root.clone();
    let state = Arc::new(DocState::new(config));

    if let Some(root) = &configured_root {
        let root = root.display().to_string();
        match state.set_root(&root).await {
            Ok(_) => {}
            Err(e) if matches!(cli.command, Commands::Serve) => {
                tracing::warn!("Ignoring configured documentation root: {}", e);
            }
            Err(e) => return Err(e.into()),
        }
    }

    let output = match cli.command {
        Commands::Serve => {
            serve(state).await?;
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Validate { module } => return validate(&state, module).await,
        Commands::Modules => handle_list_modules(&state, ListModulesRequest {}).await?,
        Commands::Items {
            module,
            category,
            detail,
        } => {
            handle_list_items(
                &state,
                ListItemsRequest {
                    module,
                    category,
                    detail_level: detail,
                },
            )
            .await?
        }
        Commands::Lookup { path, detail } => {
            handle_lookup_item(
                &state,
                LookupItemRequest {
                    path,
                    detail_level: detail,
                },
            )
            .await?
        }
        Commands::Search {
            query,
            category,
            limit,
        } => {
            handle_search(
                &state,
                SearchRequest {
                    query,
                    category,
                    limit,
                },
            )
            .await?
        }
        Commands::Render { .. } => unreachable!("handled before configuration is loaded"),
    };

    print!("{}", output);
    Ok(ExitCode::SUCCESS)
}

async fn serve(state: Arc<DocState>) -> Result<()> {
    tracing::info!("Starting sidebar-index MCP server");

    let server = SidebarServer::new(state);
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("Error serving MCP server: {:?}", e);
    })?;

    service.waiting().await?;
    Ok(())
}

async fn validate(state: &DocState, module: Option<String>) -> Result<ExitCode> {
    let output = handle_validate(
        state,
        ValidateRequest {
            module: module.clone(),
        },
    )
    .await?;
    print!("{}", output);

    // Already cached by the handler above
    let docs = state.docs().await?;
    let failed = match module.as_deref() {
        Some(module) => docs
            .tree
            .module(module)
            .is_some_and(|items| !crate::validate::validate(items).is_ok()),
        None => {
            !docs.tree.failures().is_empty()
                || docs.tree.validate_all().iter().any(|(_, r)| !r.is_ok())
        }
    };

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn render_file(file: &Path, envelope: Envelope, output: Option<&Path>) -> Result<()> {
    let source = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let items = parse_sidebar_items(&source)
        .with_context(|| format!("Failed to parse {}", file.display()))?;
    let rendered = render_sidebar_items(&items, envelope);

    match output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{}", rendered),
    }
    Ok(())
}
