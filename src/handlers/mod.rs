pub mod call;
pub mod mcp;
