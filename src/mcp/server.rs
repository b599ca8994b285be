//! MCP server dispatch.
//!
//! Transport-agnostic: the SSE handlers feed parsed requests in and push any
//! responses back to the originating stream.

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, PROTOCOL_VERSION, methods};
use super::tools::Tool;

/// Server name advertised during `initialize`.
const SERVER_NAME: &str = "weather";

/// Server version advertised during `initialize`.
const SERVER_VERSION: &str = "1.0.0";

/// Parameters of a `tools/call` request.
#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// The MCP server and its registered tools.
pub struct McpServer {
    tools: Vec<Box<dyn Tool>>,
}

impl McpServer {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool. Later registrations with the same name shadow
    /// earlier ones in `tools/call` lookup order.
    pub fn with_tool(mut self, tool: impl Tool + 'static) -> Self {
        self.tools.push(Box::new(tool));
        self
    }

    /// Handle one request, returning `None` for notifications.
    pub async fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        debug!(method = request.method, "mcp request");

        if request.is_notification() {
            if request.method != methods::INITIALIZED {
                warn!(method = request.method, "ignoring unknown notification");
            }
            return None;
        }

        let id = request.id.clone();
        let response = match request.method.as_str() {
            methods::INITIALIZE => JsonRpcResponse::success(id, self.initialize_result()),
            methods::PING => JsonRpcResponse::success(id, json!({})),
            methods::TOOLS_LIST => JsonRpcResponse::success(id, self.tools_list_result()),
            methods::TOOLS_CALL => match self.call_tool(request.params).await {
                Ok(result) => JsonRpcResponse::success(id, result),
                Err(error) => JsonRpcResponse::error(id, error),
            },
            other => JsonRpcResponse::error(id, JsonRpcError::method_not_found(other)),
        };
        Some(response)
    }

    fn initialize_result(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": { "name": SERVER_NAME, "version": SERVER_VERSION }
        })
    }

    fn tools_list_result(&self) -> Value {
        let tools: Vec<Value> = self
            .tools
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name(),
                    "description": tool.description(),
                    "inputSchema": tool.input_schema(),
                })
            })
            .collect();
        json!({ "tools": tools })
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: ToolCallParams = match params {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| JsonRpcError::invalid_params(format!("invalid params: {e}")))?,
            None => return Err(JsonRpcError::invalid_params("missing params")),
        };

        let tool = self
            .tools
            .iter()
            .find(|tool| tool.name() == params.name)
            .ok_or_else(|| {
                JsonRpcError::invalid_params(format!("unknown tool: {}", params.name))
            })?;

        let output = tool.call(params.arguments).await?;
        serde_json::to_value(output).map_err(|e| JsonRpcError::internal(e.to_string()))
    }
}

impl Default for McpServer {
    fn default() -> Self {
        Self::new()
    }
}
