//! Shared application state for the two server processes.

use dashmap::DashMap;
use tokio::sync::mpsc;

use crate::config::ServerConfig;
use crate::core::weather::{WeatherClient, WeatherError};
use crate::mcp::protocol::JsonRpcResponse;
use crate::mcp::server::McpServer;
use crate::mcp::tools::GetWeatherTool;

/// State for the call-handler gateway.
pub struct AppState {
    pub config: ServerConfig,
    pub weather: WeatherClient,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Result<Self, WeatherError> {
        let weather = WeatherClient::new(config.weather.clone())?;
        Ok(Self { config, weather })
    }
}

/// State for the MCP tool server.
///
/// Transports are keyed by session id so concurrent clients each get their
/// own stream; a new connection never displaces an existing one.
pub struct McpState {
    pub server: McpServer,
    pub sessions: DashMap<String, mpsc::Sender<JsonRpcResponse>>,
}

impl McpState {
    pub fn new(config: &ServerConfig) -> Result<Self, WeatherError> {
        let weather = WeatherClient::new(config.weather.clone())?;
        let server = McpServer::new().with_tool(GetWeatherTool::new(weather));
        Ok(Self {
            server,
            sessions: DashMap::new(),
        })
    }
}
