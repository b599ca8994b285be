//! Call handler for the voice platform's WebSocket control protocol.
//!
//! The voice platform opens one WebSocket per call and delivers lifecycle
//! and hook events as JSON frames; the gateway answers with queued
//! call-control verbs (`answer`, `pause`, `llm`, `say`, `hangup`) and tool
//! output commands.

mod handler;
mod messages;
mod session;

pub use handler::call_handler;
pub use messages::{
    FunctionCall, FunctionDeclaration, FunctionResponse, InboundMessage, LlmConfig,
    OutboundMessage, ToolCallEvent, ToolOutputPayload, ToolResponse, Verb, WeatherQuery,
};
pub use session::{Session, SessionClosed};
