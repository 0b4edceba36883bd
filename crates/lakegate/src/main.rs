//! Lakegate launcher.
//!
//! `lakegate serve` runs the MCP server on stdio against the workspace named
//! by DATABRICKS_HOST / DATABRICKS_TOKEN. The other subcommands are local
//! utilities that never touch the network.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lakegate_client::{ApiClient, Config};
use lakegate_mcp::{McpServer, McpServerConfig, ToolContext, ToolRegistry};
use tracing::info;

mod logging;

#[derive(Parser, Debug)]
#[command(name = "lakegate", about = "MCP server for the Databricks REST API")]
struct Cli {
    /// Enable verbose logging (info/debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the MCP server on stdio
    Serve {
        /// Maximum serialized tool-response size in bytes
        #[arg(long, default_value_t = 1024 * 1024)]
        max_response_bytes: usize,
    },

    /// List the registered tools
    Tools {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { max_response_bytes } => {
            logging::init_logging(cli.verbose)?;
            serve(max_response_bytes)
        }
        Commands::Tools { json } => list_tools(json),
        Commands::Version => {
            println!("lakegate {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn serve(max_response_bytes: usize) -> Result<()> {
    let config = Config::from_env().context("Failed to load workspace configuration")?;
    info!("Connecting to workspace: {}", config.host);

    let api = ApiClient::new(config).context("Failed to build API client")?;
    let ctx = ToolContext::new(api);

    let server_config = McpServerConfig {
        max_response_bytes,
        ..Default::default()
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    runtime.block_on(async {
        let mut server = McpServer::new(server_config, ctx);
        server.run().await.context("MCP server failed")
    })
}

fn list_tools(json: bool) -> Result<()> {
    let registry = ToolRegistry::new();
    let definitions = registry.list_tools();

    if json {
        println!("{}", serde_json::to_string_pretty(&definitions)?);
        return Ok(());
    }

    let width = definitions
        .iter()
        .map(|d| d.name.len())
        .max()
        .unwrap_or(0);

    for definition in &definitions {
        println!("{:width$}  {}", definition.name, definition.description);
    }
    println!("\n{} tools", definitions.len());

    Ok(())
}
