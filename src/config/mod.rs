//! Configuration module for the weather agent gateway.
//!
//! Configuration is sourced from the process environment, with `.env` files
//! loaded by the binary before this module runs. Priority: ENV vars > .env
//! values > defaults.
//!
//! # Example
//! ```rust,no_run
//! use weather_agent_gateway::config::ServerConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::from_env()?;
//! println!("Gateway listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::env;

use url::Url;

use crate::core::weather::WeatherConfig;

/// Default gateway listen port.
const DEFAULT_PORT: u16 = 3000;

/// Default MCP tool server listen port.
const DEFAULT_MCP_PORT: u16 = 3001;

/// Default bind address.
const DEFAULT_HOST: &str = "0.0.0.0";

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },

    #[error("invalid MCP_SERVER_URL '{value}': {source}")]
    InvalidMcpUrl {
        value: String,
        source: url::ParseError,
    },
}

/// Server configuration
///
/// Contains everything both processes need to run:
/// - Bind address and ports for the gateway and the MCP tool server
/// - The Gemini credential used when configuring live call sessions
/// - The optional remote tool server URL (selects remote-tool mode)
/// - Weather API endpoints (overridable so tests can point at mocks)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Gemini API key. Absence is not a startup error: calls are answered
    /// and immediately hung up when no credential is configured.
    pub google_api_key: Option<String>,

    /// Remote MCP tool server URL. When set, live sessions are configured
    /// with `mcpServers` instead of an inline tool schema.
    pub mcp_server_url: Option<Url>,

    /// Listen port for the `mcp` subcommand.
    pub mcp_server_port: u16,

    /// Weather API endpoints and timeout.
    pub weather: WeatherConfig,
}

/// Zeroize the Gemini credential when the config is dropped.
impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        if let Some(ref mut key) = self.google_api_key {
            key.zeroize();
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = parse_port("PORT", DEFAULT_PORT)?;
        let mcp_server_port = parse_port("MCP_SERVER_PORT", DEFAULT_MCP_PORT)?;

        let google_api_key = non_empty_var("GOOGLE_API_KEY");

        let mcp_server_url = match non_empty_var("MCP_SERVER_URL") {
            Some(raw) => Some(Url::parse(&raw).map_err(|source| ConfigError::InvalidMcpUrl {
                value: raw,
                source,
            })?),
            None => None,
        };

        let mut weather = WeatherConfig::default();
        if let Some(url) = non_empty_var("WEATHER_GEOCODING_URL") {
            weather.geocoding_url = url;
        }
        if let Some(url) = non_empty_var("WEATHER_FORECAST_URL") {
            weather.forecast_url = url;
        }

        Ok(Self {
            host,
            port,
            google_api_key,
            mcp_server_url,
            mcp_server_port,
            weather,
        })
    }

    /// Gateway bind address as `host:port`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Tool server bind address as `host:mcp_server_port`.
    pub fn mcp_address(&self) -> String {
        format!("{}:{}", self.host, self.mcp_server_port)
    }
}

/// Read an env var, treating unset and empty identically.
fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_port(name: &str, default: u16) -> Result<u16, ConfigError> {
    match non_empty_var(name) {
        Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            name: name.to_string(),
            value: raw,
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for name in [
            "HOST",
            "PORT",
            "GOOGLE_API_KEY",
            "MCP_SERVER_URL",
            "MCP_SERVER_PORT",
            "WEATHER_GEOCODING_URL",
            "WEATHER_FORECAST_URL",
        ] {
            unsafe { env::remove_var(name) };
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.mcp_server_port, 3001);
        assert!(config.google_api_key.is_none());
        assert!(config.mcp_server_url.is_none());
        assert_eq!(config.address(), "0.0.0.0:3000");
        assert_eq!(config.mcp_address(), "0.0.0.0:3001");
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        unsafe {
            env::set_var("HOST", "127.0.0.1");
            env::set_var("PORT", "8080");
            env::set_var("MCP_SERVER_PORT", "9090");
            env::set_var("GOOGLE_API_KEY", "test-key");
            env::set_var("MCP_SERVER_URL", "http://localhost:9090/sse");
        }

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.address(), "127.0.0.1:8080");
        assert_eq!(config.mcp_server_port, 9090);
        assert_eq!(config.google_api_key.as_deref(), Some("test-key"));
        assert_eq!(
            config.mcp_server_url.as_ref().map(Url::as_str),
            Some("http://localhost:9090/sse")
        );

        clear_env();
    }

    #[test]
    #[serial]
    fn test_empty_values_fall_back_to_defaults() {
        clear_env();
        unsafe {
            env::set_var("GOOGLE_API_KEY", "");
            env::set_var("PORT", "");
        }

        let config = ServerConfig::from_env().unwrap();
        assert!(config.google_api_key.is_none());
        assert_eq!(config.port, 3000);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_port_rejected() {
        clear_env();
        unsafe { env::set_var("PORT", "not-a-port") };

        let err = ServerConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_mcp_url_rejected() {
        clear_env();
        unsafe { env::set_var("MCP_SERVER_URL", "not a url") };

        let err = ServerConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidMcpUrl { .. }));

        clear_env();
    }
}
