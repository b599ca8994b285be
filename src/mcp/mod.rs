//! MCP (Model Context Protocol) tool server.
//!
//! Exposes the weather lookup as a remotely invokable tool so multiple model
//! sessions can share one implementation instead of declaring it inline.
//! JSON-RPC 2.0 envelopes travel over an SSE transport (see
//! `handlers::mcp`).

pub mod protocol;
pub mod server;
pub mod tools;

pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId};
pub use server::McpServer;
pub use tools::{ContentBlock, GetWeatherTool, Tool, ToolOutput};
