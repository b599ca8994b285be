use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use weather_agent_gateway::{AppState, McpState, ServerConfig, routes};

/// Weather agent gateway - voice calls wired to a weather lookup tool
#[derive(Parser, Debug)]
#[command(name = "weather-agent-gateway")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the standalone MCP tool server instead of the call gateway
    Mcp,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (must be done before config loading)
    let _ = dotenvy::dotenv();

    // Initialize tracing; LOGLEVEL follows the platform convention
    let filter = EnvFilter::try_from_env("LOGLEVEL").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = ServerConfig::from_env().map_err(|e| anyhow!(e.to_string()))?;

    match cli.command {
        Some(Commands::Mcp) => run_mcp_server(config).await,
        None => run_gateway(config).await,
    }
}

/// Serve the call-handler gateway.
async fn run_gateway(config: ServerConfig) -> anyhow::Result<()> {
    let address = config.address();
    if config.google_api_key.is_none() {
        tracing::warn!("GOOGLE_API_KEY not set; incoming calls will be hung up");
    }

    let state = Arc::new(AppState::new(config).map_err(|e| anyhow!(e.to_string()))?);
    let app = routes::call::create_call_router().with_state(state);

    let socket_addr: SocketAddr = address
        .parse()
        .map_err(|e| anyhow!("Invalid server address '{}': {}", address, e))?;
    info!("Gateway listening on http://{socket_addr}");

    let listener = TcpListener::bind(&socket_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Serve the standalone MCP tool server.
async fn run_mcp_server(config: ServerConfig) -> anyhow::Result<()> {
    let address = config.mcp_address();

    let state = Arc::new(McpState::new(&config).map_err(|e| anyhow!(e.to_string()))?);
    let app = routes::mcp::create_mcp_router().with_state(state);

    let socket_addr: SocketAddr = address
        .parse()
        .map_err(|e| anyhow!("Invalid server address '{}': {}", address, e))?;
    info!("MCP tool server listening on http://{socket_addr}");

    let listener = TcpListener::bind(&socket_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
