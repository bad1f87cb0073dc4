use clap::Parser;
use sidebar_index::cli::{Cli, run};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Logs go to stderr to avoid interfering with MCP protocol on stdout
    sidebar_index::tracing::init(cli.log_format, cli.log_level());

    run(cli).await
}
