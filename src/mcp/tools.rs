//! Remotely invokable tools.
//!
//! The server registers implementations of [`Tool`]; today that is the single
//! weather lookup. Tool failures that should reach the model as text are
//! returned as an output with `is_error` set rather than a protocol error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::core::weather::{TemperatureScale, WeatherClient};
use crate::mcp::protocol::JsonRpcError;

/// Name of the weather tool as invoked by clients.
pub const GET_WEATHER_TOOL: &str = "get_weather";

/// A tool the MCP server can list and execute.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name used for invocation.
    fn name(&self) -> &str;

    /// Description shown to the model.
    fn description(&self) -> &str;

    /// JSON-Schema object describing the arguments.
    fn input_schema(&self) -> Value;

    /// Execute with the given arguments.
    ///
    /// `Err` is reserved for protocol-level problems (bad arguments);
    /// domain failures should come back as an error-flagged [`ToolOutput`].
    async fn call(&self, arguments: Value) -> Result<ToolOutput, JsonRpcError>;
}

/// Result of a tool invocation: content blocks plus an error flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub content: Vec<ContentBlock>,
    #[serde(rename = "isError", default)]
    pub is_error: bool,
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text { text: text.into() }],
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text {
                text: message.into(),
            }],
            is_error: true,
        }
    }
}

/// One block of tool output content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
}

/// Arguments accepted by [`GetWeatherTool`].
#[derive(Debug, Clone, Deserialize)]
struct GetWeatherArgs {
    location: String,
}

/// The weather lookup exposed as a remote tool.
///
/// The unit scale is fixed to celsius here; callers that want fahrenheit use
/// the inline tool schema on the call-handler side instead.
pub struct GetWeatherTool {
    weather: WeatherClient,
}

impl GetWeatherTool {
    pub fn new(weather: WeatherClient) -> Self {
        Self { weather }
    }
}

#[async_trait]
impl Tool for GetWeatherTool {
    fn name(&self) -> &str {
        GET_WEATHER_TOOL
    }

    fn description(&self) -> &str {
        "Get weather data for a location"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "Location to get weather data for"
                }
            },
            "required": ["location"]
        })
    }

    async fn call(&self, arguments: Value) -> Result<ToolOutput, JsonRpcError> {
        let args: GetWeatherArgs = serde_json::from_value(arguments)
            .map_err(|e| JsonRpcError::invalid_params(format!("invalid arguments: {e}")))?;

        info!(location = args.location, "getting weather for location");
        match self
            .weather
            .get_weather(&args.location, TemperatureScale::Celsius)
            .await
        {
            Ok(weather) => Ok(ToolOutput::text(format!(
                "The current temperature in {} is {} {} wind is {} {}.",
                args.location,
                weather.current.temperature_2m,
                weather.current_units.temperature_2m,
                weather.current.wind_speed_10m,
                weather.current_units.wind_speed_10m,
            ))),
            Err(e) => {
                warn!(location = args.location, "weather lookup failed: {e}");
                Ok(ToolOutput::error(format!(
                    "Failed to get the weather for {}. Please try again later.",
                    args.location
                )))
            }
        }
    }
}
